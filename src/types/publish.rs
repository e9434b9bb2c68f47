//! Blog publishing types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rendered report ready to publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub title: String,
    /// Markdown body.
    pub content: String,
    pub tags: Vec<String>,
    pub canonical_url: Option<String>,
    /// Publish publicly rather than as a draft.
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    /// Create a public post with no canonical URL.
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags,
            canonical_url: None,
            published: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_canonical_url(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = Some(url.into());
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.published = false;
        self
    }

    /// First `max` tags, for platforms that cap the tag count.
    pub fn limited_tags(&self, max: usize) -> &[String] {
        &self.tags[..self.tags.len().min(max)]
    }
}

/// Outcome of publishing to one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub platform: String,
    pub success: bool,
    pub url: Option<String>,
    pub id: Option<String>,
    pub error: Option<String>,
}

impl PublishResult {
    pub fn published(platform: &str, id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            success: true,
            url: Some(url.into()),
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn failed(platform: &str, error: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            success: false,
            url: None,
            id: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blog_post_creation() {
        let post = BlogPost::new("Test Post", "# Test Content", vec!["test".into(), "blog".into()])
            .with_canonical_url("https://example.com/test");

        assert_eq!(post.title, "Test Post");
        assert_eq!(post.content, "# Test Content");
        assert_eq!(post.tags, vec!["test", "blog"]);
        assert_eq!(post.canonical_url.as_deref(), Some("https://example.com/test"));
        assert!(post.published);
        assert!(!post.clone().as_draft().published);
    }

    #[test]
    fn test_limited_tags() {
        let tags = (0..7).map(|i| format!("t{}", i)).collect();
        let post = BlogPost::new("t", "c", tags);

        assert_eq!(post.limited_tags(4).len(), 4);
        assert_eq!(post.limited_tags(10).len(), 7);
        assert_eq!(post.limited_tags(4)[3], "t3");
    }

    #[test]
    fn test_publish_result_constructors() {
        let ok = PublishResult::published("Dev.to", "42", "https://dev.to/x");
        assert!(ok.success);
        assert_eq!(ok.id.as_deref(), Some("42"));
        assert!(ok.error.is_none());

        let err = PublishResult::failed("Medium", "Medium not configured");
        assert!(!err.success);
        assert_eq!(err.platform, "Medium");
        assert_eq!(err.error.as_deref(), Some("Medium not configured"));
    }
}
