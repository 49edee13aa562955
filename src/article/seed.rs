//! Initial articles
//!
//! The repository starts from a TOML document: the sample set compiled into
//! the binary, a file named by `articles.seed_file`, or nothing at all when
//! `articles.seed` is off.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use super::{Article, ArticleError, ArticleFields, ArticleRepository};
use crate::config::ArticlesConfig;

/// Sample articles shipped with the binary
pub const EMBEDDED_SEED: &str = include_str!("../../seed/articles.toml");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid seed article {id}: {source}")]
    Invalid {
        id: u64,
        #[source]
        source: ArticleError,
    },

    #[error("invalid seed set: {0}")]
    Conflict(#[from] ArticleError),
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    articles: Vec<SeedArticle>,
}

#[derive(Debug, Deserialize)]
struct SeedArticle {
    id: u64,
    title: String,
    brief: String,
    article: String,
    #[serde(default)]
    image_url: Option<String>,
}

/// Build the startup repository according to `config`
pub fn load(config: &ArticlesConfig) -> Result<ArticleRepository, SeedError> {
    if !config.seed {
        return Ok(ArticleRepository::new());
    }

    match &config.seed_file {
        Some(path) => {
            let document = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
                path: path.clone(),
                source,
            })?;
            from_toml(&document)
        }
        None => from_toml(EMBEDDED_SEED),
    }
}

/// Parse a seed document; every entry is validated like a create
pub fn from_toml(document: &str) -> Result<ArticleRepository, SeedError> {
    let file: SeedFile = toml::from_str(document)?;
    let created_at = Utc::now();

    let articles = file
        .articles
        .into_iter()
        .map(|seed| {
            let input = ArticleFields::new(seed.title, seed.brief, seed.article)
                .validate()
                .map_err(|source| SeedError::Invalid { id: seed.id, source })?;
            Ok(Article {
                id: seed.id,
                title: input.title,
                brief: input.brief,
                article: input.article,
                image_url: seed.image_url,
                created_at,
                updated_at: None,
            })
        })
        .collect::<Result<Vec<_>, SeedError>>()?;

    Ok(ArticleRepository::from_articles(articles)?)
}
