//! Page rendering
//!
//! Tera templates compiled into the binary and the view model they read.

use serde::Serialize;
use tera::{Context, Tera};

use crate::article::Article;
use crate::session::FlashMessages;

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("compose.html", include_str!("../../templates/compose.html")),
    ("about.html", include_str!("../../templates/about.html")),
    ("article.html", include_str!("../../templates/article.html")),
    ("edit.html", include_str!("../../templates/edit.html")),
];

/// Pages the router can render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Compose,
    About,
    Article,
    Edit,
}

impl Page {
    pub const fn template(self) -> &'static str {
        match self {
            Self::Index => "index.html",
            Self::Compose => "compose.html",
            Self::About => "about.html",
            Self::Article => "article.html",
            Self::Edit => "edit.html",
        }
    }
}

/// Everything a page template can read
///
/// Absent values are serialized as `null` so templates can test them.
#[derive(Debug, Serialize)]
pub struct ViewModel<'a> {
    pub title: &'a str,
    pub articles: Option<&'a [Article]>,
    pub article: Option<&'a Article>,
    #[serde(flatten)]
    pub flash: FlashMessages,
}

impl<'a> ViewModel<'a> {
    pub fn new(title: &'a str, flash: FlashMessages) -> Self {
        Self {
            title,
            articles: None,
            article: None,
            flash,
        }
    }

    #[must_use]
    pub fn with_articles(mut self, articles: &'a [Article]) -> Self {
        self.articles = Some(articles);
        self
    }

    #[must_use]
    pub fn with_article(mut self, article: &'a Article) -> Self {
        self.article = Some(article);
        self
    }
}

pub struct ViewRenderer {
    tera: Tera,
}

impl std::fmt::Debug for ViewRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRenderer").finish_non_exhaustive()
    }
}

impl ViewRenderer {
    /// Compile the embedded templates
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    pub fn render(&self, page: Page, model: &ViewModel<'_>) -> Result<String, tera::Error> {
        let context = Context::from_serialize(model)?;
        self.tera.render(page.template(), &context)
    }
}
