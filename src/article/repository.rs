// In-memory article repository
// Owns the ordered collection and the id counter for the lifetime of the process

use std::collections::HashSet;

use chrono::Utc;

use super::{Article, ArticleError, ArticleFields};

/// Ordered, in-memory collection of articles
///
/// Ids are handed out from a counter that only moves forward, so an id freed
/// by a delete is never given to a later article.
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    articles: Vec<Article>,
    next_id: u64,
}

impl ArticleRepository {
    /// Empty repository; the first article gets id 1
    pub const fn new() -> Self {
        Self {
            articles: Vec::new(),
            next_id: 1,
        }
    }

    /// Repository holding `articles` in the given order
    ///
    /// The counter starts one past the highest id present.
    pub fn from_articles(articles: Vec<Article>) -> Result<Self, ArticleError> {
        let mut seen = HashSet::with_capacity(articles.len());
        for article in &articles {
            if !seen.insert(article.id) {
                return Err(ArticleError::DuplicateId { id: article.id });
            }
        }

        let next_id = articles.iter().map(|a| a.id).max().map_or(1, |max| max + 1);
        Ok(Self { articles, next_id })
    }

    pub fn list(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Id the next created article will receive
    pub const fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn get(&self, id: u64) -> Result<&Article, ArticleError> {
        self.articles
            .iter()
            .find(|a| a.id == id)
            .ok_or(ArticleError::NotFound { id })
    }

    /// Validate `fields` and append a new article
    pub fn create(
        &mut self,
        fields: &ArticleFields,
        image_url: Option<String>,
    ) -> Result<Article, ArticleError> {
        let input = fields.validate()?;

        let article = Article {
            id: self.next_id,
            title: input.title,
            brief: input.brief,
            article: input.article,
            image_url,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.next_id += 1;
        self.articles.push(article.clone());

        Ok(article)
    }

    /// Overwrite the text of an existing article
    ///
    /// The image is only replaced when `image_url` is `Some`.
    pub fn update(
        &mut self,
        id: u64,
        fields: &ArticleFields,
        image_url: Option<String>,
    ) -> Result<Article, ArticleError> {
        let index = self.position(id)?;
        let input = fields.validate()?;

        let article = &mut self.articles[index];
        article.title = input.title;
        article.brief = input.brief;
        article.article = input.article;
        if image_url.is_some() {
            article.image_url = image_url;
        }
        article.updated_at = Some(Utc::now());

        Ok(article.clone())
    }

    /// Remove an article, keeping the order of the rest
    pub fn delete(&mut self, id: u64) -> Result<Article, ArticleError> {
        let index = self.position(id)?;
        Ok(self.articles.remove(index))
    }

    fn position(&self, id: u64) -> Result<usize, ArticleError> {
        self.articles
            .iter()
            .position(|a| a.id == id)
            .ok_or(ArticleError::NotFound { id })
    }
}

impl Default for ArticleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::seed;

    fn fields(title: &str) -> ArticleFields {
        ArticleFields::new(title, "brief", "body")
    }

    fn seeded() -> ArticleRepository {
        seed::from_toml(seed::EMBEDDED_SEED).unwrap()
    }

    #[test]
    fn test_create_then_get() {
        let mut repo = ArticleRepository::new();
        let created = repo.create(&fields("First"), None).unwrap();

        assert_eq!(created.id, 1);
        let stored = repo.get(created.id).unwrap();
        assert_eq!(stored.title, "First");
        assert!(stored.updated_at.is_none());
        assert!(stored.created_at <= Utc::now());
    }

    #[test]
    fn test_create_rejects_blank_title() {
        let mut repo = seeded();
        let before = repo.len();

        let err = repo.create(&fields("   "), None).unwrap_err();

        assert_eq!(
            err,
            ArticleError::Validation {
                blank: vec!["title"]
            }
        );
        assert_eq!(repo.len(), before);
        assert_eq!(repo.next_id(), 4);
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut repo = seeded();

        let a = repo.create(&fields("A"), None).unwrap();
        assert_eq!(a.id, 4);
        repo.delete(a.id).unwrap();

        let b = repo.create(&fields("B"), None).unwrap();
        assert_eq!(b.id, 5);
    }

    #[test]
    fn test_update_without_image_keeps_image() {
        let mut repo = ArticleRepository::new();
        let created = repo
            .create(&fields("Old"), Some("/uploads/1_old.png".to_string()))
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));

        let updated = repo
            .update(created.id, &ArticleFields::new("New", "b2", "a2"), None)
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.brief, "b2");
        assert_eq!(updated.article, "a2");
        assert_eq!(updated.image_url.as_deref(), Some("/uploads/1_old.png"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at.unwrap() > created.created_at);
    }

    #[test]
    fn test_update_replaces_image_when_given() {
        let mut repo = ArticleRepository::new();
        let created = repo
            .create(&fields("T"), Some("/uploads/1_a.png".to_string()))
            .unwrap();

        let updated = repo
            .update(created.id, &fields("T"), Some("/uploads/2_b.png".to_string()))
            .unwrap();

        assert_eq!(updated.image_url.as_deref(), Some("/uploads/2_b.png"));
    }

    #[test]
    fn test_update_reports_missing_before_blank_fields() {
        let mut repo = ArticleRepository::new();
        let err = repo.update(99, &fields(""), None).unwrap_err();
        assert_eq!(err, ArticleError::NotFound { id: 99 });
    }

    #[test]
    fn test_update_blank_leaves_article_untouched() {
        let mut repo = seeded();
        let before = repo.get(2).unwrap().clone();

        let err = repo.update(2, &fields(" "), None).unwrap_err();

        assert!(matches!(err, ArticleError::Validation { .. }));
        assert_eq!(repo.get(2).unwrap(), &before);
    }

    #[test]
    fn test_delete_missing_leaves_collection_unchanged() {
        let mut repo = seeded();
        let before = repo.list().to_vec();

        let err = repo.delete(42).unwrap_err();

        assert_eq!(err, ArticleError::NotFound { id: 42 });
        assert_eq!(repo.list(), before.as_slice());
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut repo = seeded();
        let removed = repo.delete(2).unwrap();

        assert_eq!(removed.id, 2);
        let ids: Vec<u64> = repo.list().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_from_articles_rejects_duplicates() {
        let mut repo = ArticleRepository::new();
        let article = repo.create(&fields("Dup"), None).unwrap();

        let err = ArticleRepository::from_articles(vec![article.clone(), article]).unwrap_err();
        assert_eq!(err, ArticleError::DuplicateId { id: 1 });
    }

    #[test]
    fn test_from_articles_counter_follows_max_id() {
        let mut repo = ArticleRepository::new();
        let mut article = repo.create(&fields("Far"), None).unwrap();
        article.id = 10;

        let repo = ArticleRepository::from_articles(vec![article]).unwrap();
        assert_eq!(repo.next_id(), 11);
        assert_eq!(ArticleRepository::new().next_id(), 1);
    }
}
