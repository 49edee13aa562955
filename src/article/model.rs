// Article record and write-request schema

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ArticleError;

/// A stored article
///
/// Serialized with camelCase names, which is the shape the templates read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub brief: String,
    pub article: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Text fields of a write request exactly as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: Option<String>,
    pub brief: Option<String>,
    pub article: Option<String>,
}

/// Trimmed, non-blank text ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleInput {
    pub title: String,
    pub brief: String,
    pub article: String,
}

impl ArticleFields {
    pub fn new(
        title: impl Into<String>,
        brief: impl Into<String>,
        article: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            brief: Some(brief.into()),
            article: Some(article.into()),
        }
    }

    /// Assign a named form field; unknown names are ignored
    ///
    /// Returns whether the name was one of the article fields.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "brief" => &mut self.brief,
            "article" => &mut self.article,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Trim every field and reject the input if any of them ends up empty
    pub fn validate(&self) -> Result<ArticleInput, ArticleError> {
        let mut blank = Vec::new();
        let title = required(self.title.as_deref(), "title", &mut blank);
        let brief = required(self.brief.as_deref(), "brief", &mut blank);
        let article = required(self.article.as_deref(), "article", &mut blank);

        if !blank.is_empty() {
            return Err(ArticleError::Validation { blank });
        }

        Ok(ArticleInput {
            title,
            brief,
            article,
        })
    }
}

fn required(value: Option<&str>, name: &'static str, blank: &mut Vec<&'static str>) -> String {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        blank.push(name);
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims() {
        let fields = ArticleFields::new("  Title ", "\tBrief\n", " Body ");
        let input = fields.validate().unwrap();
        assert_eq!(input.title, "Title");
        assert_eq!(input.brief, "Brief");
        assert_eq!(input.article, "Body");
    }

    #[test]
    fn test_validate_names_blank_fields() {
        let fields = ArticleFields {
            title: Some("   ".to_string()),
            brief: Some("ok".to_string()),
            article: None,
        };
        assert_eq!(
            fields.validate(),
            Err(ArticleError::Validation {
                blank: vec!["title", "article"]
            })
        );
    }

    #[test]
    fn test_set_known_and_unknown_fields() {
        let mut fields = ArticleFields::default();
        assert!(fields.set("title", "T".to_string()));
        assert!(fields.set("brief", "B".to_string()));
        assert!(!fields.set("author", "nobody".to_string()));
        assert_eq!(fields.title.as_deref(), Some("T"));
        assert_eq!(fields.brief.as_deref(), Some("B"));
        assert!(fields.article.is_none());
    }

    #[test]
    fn test_serializes_camel_case() {
        let article = Article {
            id: 7,
            title: "T".to_string(),
            brief: "B".to_string(),
            article: "A".to_string(),
            image_url: Some("/uploads/1_x.png".to_string()),
            created_at: Utc::now(),
            updated_at: None,
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["imageUrl"], "/uploads/1_x.png");
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_null());
    }
}
