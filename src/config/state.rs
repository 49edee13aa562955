// Application state module
// Everything a request handler needs, constructed once at startup

use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;

use super::types::Config;
use crate::article::seed::{self, SeedError};
use crate::article::ArticleRepository;
use crate::session::SessionStore;
use crate::upload::{FormLimits, UploadStore};
use crate::view::ViewRenderer;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to load initial articles: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to compile templates: {0}")]
    Templates(#[from] tera::Error),

    #[error("failed to prepare uploads directory: {0}")]
    Uploads(#[from] std::io::Error),
}

/// Application state
///
/// The repository is the only mutable domain state. A single `RwLock`
/// serializes writers, which is all the mutual exclusion it needs.
pub struct AppState {
    pub config: Config,
    pub articles: RwLock<ArticleRepository>,
    pub sessions: SessionStore,
    pub uploads: UploadStore,
    pub views: ViewRenderer,
}

impl AppState {
    /// Create `AppState` with the repository seeded per `articles` config
    pub fn new(config: Config) -> Result<Self, StateError> {
        let repository = seed::load(&config.articles)?;
        Self::with_repository(config, repository)
    }

    /// Create `AppState` around an existing repository
    pub fn with_repository(
        config: Config,
        repository: ArticleRepository,
    ) -> Result<Self, StateError> {
        let uploads = UploadStore::new(&config.storage.uploads_dir);
        uploads.ensure_dir()?;

        Ok(Self {
            sessions: SessionStore::new(Duration::from_secs(config.session.max_age_secs)),
            views: ViewRenderer::new()?,
            articles: RwLock::new(repository),
            uploads,
            config,
        })
    }

    pub const fn form_limits(&self) -> FormLimits {
        FormLimits {
            max_upload_size: self.config.storage.max_upload_size,
        }
    }
}
