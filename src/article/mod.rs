//! Article domain
//!
//! Holds the article record, the explicit input schema for write requests,
//! the in-memory repository and the seed loader used at startup.

mod model;
mod repository;
pub mod seed;

pub use model::{Article, ArticleFields, ArticleInput};
pub use repository::ArticleRepository;

use thiserror::Error;

/// Failures of repository operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArticleError {
    /// One or more required text fields were missing or blank
    #[error("Title, brief, and article are required.")]
    Validation { blank: Vec<&'static str> },

    /// No article carries the requested id
    #[error("Article not found")]
    NotFound { id: u64 },

    /// The id in the request path is not a number, so it can never match
    #[error("Article not found")]
    MalformedId { raw: String },

    /// Two initial articles share an id
    #[error("duplicate article id {id}")]
    DuplicateId { id: u64 },
}

/// Parse an id taken from a request path
pub fn parse_id(raw: &str) -> Result<u64, ArticleError> {
    raw.parse().map_err(|_| ArticleError::MalformedId {
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Ok(42));
        assert_eq!(
            parse_id("abc"),
            Err(ArticleError::MalformedId {
                raw: "abc".to_string()
            })
        );
        assert!(parse_id("-1").is_err());
        assert!(parse_id("").is_err());
    }
}
