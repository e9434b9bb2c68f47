//! Blog publishing to external platforms.
//!
//! Each platform is one `Publisher`; `MultiPlatformPublisher` fans a post
//! out to every platform that has credentials.

use crate::config::Config;
use crate::types::{BlogPost, PublishResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use futures_util::future::join_all;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{error, info, warn};

const MEDIUM_API_URL: &str = "https://api.medium.com/v1";
const DEVTO_API_URL: &str = "https://dev.to/api";
const HASHNODE_API_URL: &str = "https://gql.hashnode.com";
const USER_AGENT: &str = "tourney/0.1 (bot tournament reports)";

/// A blog platform that can publish posts.
pub trait Publisher: Send + Sync {
    /// Platform name as shown in logs and results.
    fn name(&self) -> &str;

    /// Whether the platform has the credentials it needs.
    fn is_configured(&self) -> bool;

    /// Publish a post. Failures are reported in the result, never raised.
    fn publish<'a>(
        &'a self,
        post: &'a BlogPost,
    ) -> Pin<Box<dyn Future<Output = PublishResult> + Send + 'a>>;
}

fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Log and convert the outcome of a platform call.
fn finish(platform: &str, outcome: anyhow::Result<(String, String)>) -> PublishResult {
    match outcome {
        Ok((id, url)) => PublishResult::published(platform, id, url),
        Err(e) => {
            error!("Failed to publish to {}: {}", platform, e);
            PublishResult::failed(platform, e.to_string())
        }
    }
}

// =============================================================================
// Medium
// =============================================================================

#[derive(Debug, Deserialize)]
struct MediumEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MediumUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MediumPost {
    id: String,
    url: String,
}

/// Publisher for Medium.
pub struct MediumPublisher {
    client: Client,
    access_token: Option<String>,
    base_url: String,
}

impl MediumPublisher {
    /// Medium accepts at most five tags.
    pub const MAX_TAGS: usize = 5;

    pub fn new(access_token: Option<String>) -> Self {
        Self {
            client: http_client(),
            access_token,
            base_url: MEDIUM_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request body for a new post.
    pub fn post_body(post: &BlogPost) -> serde_json::Value {
        let mut body = json!({
            "title": post.title,
            "contentFormat": "markdown",
            "content": post.content,
            "tags": post.limited_tags(Self::MAX_TAGS),
            "publishStatus": if post.published { "public" } else { "draft" },
        });
        if let Some(url) = &post.canonical_url {
            body["canonicalUrl"] = json!(url);
        }
        body
    }

    async fn send(&self, token: &str, post: &BlogPost) -> anyhow::Result<(String, String)> {
        let user: MediumEnvelope<MediumUser> = self
            .client
            .get(format!("{}/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let created: MediumEnvelope<MediumPost> = self
            .client
            .post(format!("{}/users/{}/posts", self.base_url, user.data.id))
            .bearer_auth(token)
            .json(&Self::post_body(post))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok((created.data.id, created.data.url))
    }
}

impl Publisher for MediumPublisher {
    fn name(&self) -> &str {
        "Medium"
    }

    fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    fn publish<'a>(
        &'a self,
        post: &'a BlogPost,
    ) -> Pin<Box<dyn Future<Output = PublishResult> + Send + 'a>> {
        Box::pin(async move {
            let Some(token) = self.access_token.as_deref() else {
                return PublishResult::failed(self.name(), "Medium not configured");
            };
            finish(self.name(), self.send(token, post).await)
        })
    }
}

// =============================================================================
// Dev.to
// =============================================================================

#[derive(Debug, Deserialize)]
struct DevToArticle {
    id: serde_json::Value,
    url: String,
}

/// Publisher for Dev.to.
pub struct DevToPublisher {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl DevToPublisher {
    /// Dev.to accepts at most four tags.
    pub const MAX_TAGS: usize = 4;

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: http_client(),
            api_key,
            base_url: DEVTO_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Request body for a new article.
    pub fn post_body(post: &BlogPost) -> serde_json::Value {
        let mut article = json!({
            "title": post.title,
            "body_markdown": post.content,
            "published": post.published,
            "tags": post.limited_tags(Self::MAX_TAGS),
        });
        if let Some(url) = &post.canonical_url {
            article["canonical_url"] = json!(url);
        }
        json!({ "article": article })
    }

    async fn send(&self, api_key: &str, post: &BlogPost) -> anyhow::Result<(String, String)> {
        let article: DevToArticle = self
            .client
            .post(format!("{}/articles", self.base_url))
            .header("api-key", api_key)
            .json(&Self::post_body(post))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Dev.to ids are numeric
        let id = match article.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Ok((id, article.url))
    }
}

impl Publisher for DevToPublisher {
    fn name(&self) -> &str {
        "Dev.to"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn publish<'a>(
        &'a self,
        post: &'a BlogPost,
    ) -> Pin<Box<dyn Future<Output = PublishResult> + Send + 'a>> {
        Box::pin(async move {
            let Some(api_key) = self.api_key.as_deref() else {
                return PublishResult::failed(self.name(), "Dev.to not configured");
            };
            finish(self.name(), self.send(api_key, post).await)
        })
    }
}

// =============================================================================
// Hashnode
// =============================================================================

const HASHNODE_PUBLISH_MUTATION: &str = "mutation PublishPost($input: PublishPostInput!) { \
     publishPost(input: $input) { post { id url title } } }";

/// Publisher for Hashnode (GraphQL).
pub struct HashnodePublisher {
    client: Client,
    access_token: Option<String>,
    publication_id: Option<String>,
    base_url: String,
}

impl HashnodePublisher {
    /// Hashnode accepts at most five tags.
    pub const MAX_TAGS: usize = 5;

    pub fn new(access_token: Option<String>, publication_id: Option<String>) -> Self {
        Self {
            client: http_client(),
            access_token,
            publication_id,
            base_url: HASHNODE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Tag slug: lowercase with spaces replaced by dashes.
    pub fn tag_slug(tag: &str) -> String {
        tag.to_lowercase().replace(' ', "-")
    }

    /// GraphQL request body for a new post.
    pub fn post_body(post: &BlogPost, publication_id: &str) -> serde_json::Value {
        let tags: Vec<serde_json::Value> = post
            .limited_tags(Self::MAX_TAGS)
            .iter()
            .map(|t| json!({ "slug": Self::tag_slug(t) }))
            .collect();

        let mut input = json!({
            "title": post.title,
            "contentMarkdown": post.content,
            "tags": tags,
            "publicationId": publication_id,
            "publishedAt": if post.published { Some(post.created_at.to_rfc3339()) } else { None },
        });
        if let Some(url) = &post.canonical_url {
            input["originalArticleURL"] = json!(url);
        }

        json!({
            "query": HASHNODE_PUBLISH_MUTATION,
            "variables": { "input": input },
        })
    }

    async fn send(
        &self,
        token: &str,
        publication_id: &str,
        post: &BlogPost,
    ) -> anyhow::Result<(String, String)> {
        let result: serde_json::Value = self
            .client
            .post(&self.base_url)
            .header("Authorization", token)
            .json(&Self::post_body(post, publication_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(errors) = result.get("errors") {
            anyhow::bail!("GraphQL errors: {}", errors);
        }

        let created = &result["data"]["publishPost"]["post"];
        match (created["id"].as_str(), created["url"].as_str()) {
            (Some(id), Some(url)) => Ok((id.to_string(), url.to_string())),
            _ => anyhow::bail!("Unexpected Hashnode response: {}", result),
        }
    }
}

impl Publisher for HashnodePublisher {
    fn name(&self) -> &str {
        "Hashnode"
    }

    fn is_configured(&self) -> bool {
        self.access_token.is_some() && self.publication_id.is_some()
    }

    fn publish<'a>(
        &'a self,
        post: &'a BlogPost,
    ) -> Pin<Box<dyn Future<Output = PublishResult> + Send + 'a>> {
        Box::pin(async move {
            let (Some(token), Some(publication_id)) =
                (self.access_token.as_deref(), self.publication_id.as_deref())
            else {
                return PublishResult::failed(self.name(), "Hashnode not configured");
            };
            finish(self.name(), self.send(token, publication_id, post).await)
        })
    }
}

// =============================================================================
// Ghost
// =============================================================================

type HmacSha256 = Hmac<Sha256>;

/// Admin tokens are valid for five minutes.
const GHOST_TOKEN_TTL_SECS: i64 = 5 * 60;

#[derive(Debug, Deserialize)]
struct GhostPosts {
    posts: Vec<GhostPost>,
}

#[derive(Debug, Deserialize)]
struct GhostPost {
    id: String,
    url: String,
}

/// Publisher for a Ghost site through the Admin API.
pub struct GhostPublisher {
    client: Client,
    api_url: Option<String>,
    /// `(key id, hex secret)` split from the admin API key.
    admin_key: Option<(String, String)>,
}

impl GhostPublisher {
    pub fn new(api_url: Option<String>, admin_api_key: Option<String>) -> Self {
        let admin_key = admin_api_key.as_deref().and_then(|key| {
            let (id, secret) = key.split_once(':')?;
            if id.is_empty() || secret.is_empty() || secret.contains(':') {
                return None;
            }
            Some((id.to_string(), secret.to_string()))
        });

        Self {
            client: http_client(),
            api_url: api_url.map(|url| url.trim_end_matches('/').to_string()),
            admin_key,
        }
    }

    /// HS256 admin token for `key_id`, signed with the hex-encoded `secret`.
    pub fn admin_token(key_id: &str, secret: &str, issued_at: i64) -> anyhow::Result<String> {
        let header = json!({ "alg": "HS256", "typ": "JWT", "kid": key_id });
        let claims = json!({
            "iat": issued_at,
            "exp": issued_at + GHOST_TOKEN_TTL_SECS,
            "aud": "/admin/",
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let key = hex::decode(secret)?;
        let mut mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| anyhow::anyhow!("invalid Ghost secret: {}", e))?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Request body for a new post.
    pub fn post_body(post: &BlogPost) -> serde_json::Value {
        let tags: Vec<serde_json::Value> = post.tags.iter().map(|t| json!({ "name": t })).collect();
        let mut entry = json!({
            "title": post.title,
            "markdown": post.content,
            "status": if post.published { "published" } else { "draft" },
            "tags": tags,
        });
        if let Some(url) = &post.canonical_url {
            entry["canonical_url"] = json!(url);
        }
        json!({ "posts": [entry] })
    }

    async fn send(
        &self,
        api_url: &str,
        key_id: &str,
        secret: &str,
        post: &BlogPost,
    ) -> anyhow::Result<(String, String)> {
        let token = Self::admin_token(key_id, secret, chrono::Utc::now().timestamp())?;
        let created: GhostPosts = self
            .client
            .post(format!("{}/ghost/api/admin/posts/", api_url))
            .header("Authorization", format!("Ghost {}", token))
            .json(&Self::post_body(post))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(first) = created.posts.into_iter().next() else {
            anyhow::bail!("Ghost returned no posts");
        };
        Ok((first.id, first.url))
    }
}

impl Publisher for GhostPublisher {
    fn name(&self) -> &str {
        "Ghost"
    }

    fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.admin_key.is_some()
    }

    fn publish<'a>(
        &'a self,
        post: &'a BlogPost,
    ) -> Pin<Box<dyn Future<Output = PublishResult> + Send + 'a>> {
        Box::pin(async move {
            let (Some(api_url), Some((key_id, secret))) = (self.api_url.as_deref(), self.admin_key.as_ref())
            else {
                return PublishResult::failed(self.name(), "Ghost not configured");
            };
            finish(self.name(), self.send(api_url, key_id, secret, post).await)
        })
    }
}

// =============================================================================
// Fan-out
// =============================================================================

/// Publishes to every configured platform at once.
pub struct MultiPlatformPublisher {
    publishers: Vec<Box<dyn Publisher>>,
}

impl MultiPlatformPublisher {
    pub fn new(publishers: Vec<Box<dyn Publisher>>) -> Self {
        Self { publishers }
    }

    /// All supported platforms, configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Box::new(MediumPublisher::new(config.medium_access_token.clone())),
            Box::new(DevToPublisher::new(config.devto_api_key.clone())),
            Box::new(HashnodePublisher::new(
                config.hashnode_access_token.clone(),
                config.hashnode_publication_id.clone(),
            )),
            Box::new(GhostPublisher::new(
                config.ghost_api_url.clone(),
                config.ghost_admin_api_key.clone(),
            )),
        ])
    }

    /// Names of platforms with credentials.
    pub fn configured(&self) -> Vec<String> {
        self.publishers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Platform name -> configured flag, for every known platform.
    pub fn status(&self) -> BTreeMap<String, bool> {
        self.publishers
            .iter()
            .map(|p| (p.name().to_string(), p.is_configured()))
            .collect()
    }

    /// Publish to all configured platforms. Empty when none are configured.
    pub async fn publish_to_all(&self, post: &BlogPost) -> BTreeMap<String, PublishResult> {
        let targets: Vec<&dyn Publisher> = self
            .publishers
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.is_configured())
            .collect();

        if targets.is_empty() {
            warn!("No blog platforms configured");
            return BTreeMap::new();
        }

        let names: Vec<&str> = targets.iter().map(|p| p.name()).collect();
        info!("Publishing to {} platforms: {}", targets.len(), names.join(", "));

        let results = join_all(targets.iter().map(|p| p.publish(post))).await;

        results
            .into_iter()
            .map(|result| {
                match (&result.url, &result.error) {
                    (Some(url), _) if result.success => {
                        info!("[OK] Published to {}: {}", result.platform, url)
                    }
                    (_, Some(e)) => error!("[FAIL] Failed to publish to {}: {}", result.platform, e),
                    _ => {}
                }
                (result.platform.clone(), result)
            })
            .collect()
    }

    /// Publish to a single platform by name.
    pub async fn publish_to(&self, platform: &str, post: &BlogPost) -> PublishResult {
        let Some(publisher) = self.publishers.iter().find(|p| p.name() == platform) else {
            return PublishResult::failed(platform, format!("Unknown platform: {}", platform));
        };
        if !publisher.is_configured() {
            return PublishResult::failed(platform, format!("{} not configured", platform));
        }
        publisher.publish(post).await
    }
}
