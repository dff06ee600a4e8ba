use std::time::Duration;

use mediabot_common::{
    CategoryId, ContentKind, ContentRef, ContentSource, Error, PostContent, PostId, Result,
    TopicContent, TopicId,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Forum, Reply};
use crate::config::ForumConfig;

const SERVICE: &str = "forum";

#[derive(Debug, Deserialize)]
struct TopicResponse {
    id: u64,
    category_id: Option<u64>,
    #[serde(default)]
    tags: Vec<TagEntry>,
    post_stream: Option<PostStream>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagEntry {
    Name(String),
    Object { name: String },
}

impl TagEntry {
    fn into_name(self) -> String {
        match self {
            TagEntry::Name(name) | TagEntry::Object { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostStream {
    #[serde(default)]
    posts: Vec<StreamPost>,
}

#[derive(Debug, Deserialize)]
struct StreamPost {
    id: u64,
    post_number: u32,
}

#[derive(Debug, Deserialize)]
struct PostResponse {
    id: u64,
    topic_id: u64,
    post_number: u32,
    #[serde(default)]
    raw: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: UserDetail,
}

#[derive(Debug, Deserialize)]
struct UserDetail {
    locale: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePost<'a> {
    topic_id: u64,
    raw: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_post_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: u64,
}

/// Discourse REST client authenticating with an `Api-Key` and posting as the
/// configured bot user.
pub struct DiscourseForum {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    username: String,
}

impl DiscourseForum {
    pub fn new(config: &ForumConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build forum HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            username: config.bot_username.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("Api-Key", key)
                .header("Api-Username", &self.username),
            None => request,
        }
    }

    /// GET `path` and decode it, mapping 404 to `None`.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        debug!(path = %path, "Forum GET");
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| Error::api(SERVICE, format!("Failed to GET {path}: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::api_status(SERVICE, status, format!("GET {path}: {body}")));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Error::api(SERVICE, format!("Invalid response from {path}: {e}")))
    }

    async fn topic(&self, id: u64) -> Result<Option<TopicResponse>> {
        self.get(&format!("/t/{id}.json")).await
    }

    async fn post(&self, id: u64) -> Result<Option<PostResponse>> {
        self.get(&format!("/posts/{id}.json")).await
    }

    /// The author's interface locale. Missing or hidden profiles yield
    /// `None`.
    async fn user_locale(&self, username: Option<&str>) -> Option<String> {
        let username = username?;
        match self
            .get::<UserResponse>(&format!("/u/{username}.json"))
            .await
        {
            Ok(user) => user
                .and_then(|u| u.user.locale)
                .filter(|l| !l.trim().is_empty()),
            Err(e) => {
                debug!(username = %username, error = %e, "Could not load user locale");
                None
            }
        }
    }

    async fn load_topic(&self, id: u64) -> Result<Option<ContentSource>> {
        let Some(topic) = self.topic(id).await? else {
            return Ok(None);
        };
        let first_post = topic
            .post_stream
            .as_ref()
            .and_then(|stream| stream.posts.iter().find(|p| p.post_number == 1))
            .map(|p| p.id);
        let Some(first_post) = first_post else {
            return Ok(None);
        };
        let Some(post) = self.post(first_post).await? else {
            return Ok(None);
        };
        let author_locale = self.user_locale(post.username.as_deref()).await;

        Ok(Some(ContentSource::Topic(TopicContent {
            id: TopicId::new(topic.id),
            raw: post.raw,
            tags: topic.tags.into_iter().map(TagEntry::into_name).collect(),
            category_id: topic.category_id.map(CategoryId::new),
            author_locale,
        })))
    }

    async fn load_post(&self, id: u64) -> Result<Option<ContentSource>> {
        let Some(post) = self.post(id).await? else {
            return Ok(None);
        };
        let topic = self.topic(post.topic_id).await?;
        let author_locale = self.user_locale(post.username.as_deref()).await;
        let (tags, category_id) = match topic {
            Some(topic) => (
                topic.tags.into_iter().map(TagEntry::into_name).collect(),
                topic.category_id.map(CategoryId::new),
            ),
            None => (Vec::new(), None),
        };

        Ok(Some(ContentSource::Post(PostContent {
            id: PostId::new(post.id),
            topic_id: TopicId::new(post.topic_id),
            post_number: post.post_number,
            raw: post.raw,
            tags,
            category_id,
            author_locale,
        })))
    }
}

#[async_trait::async_trait]
impl Forum for DiscourseForum {
    async fn fetch_content(&self, content: ContentRef) -> Result<Option<ContentSource>> {
        match content.kind {
            ContentKind::Topic => self.load_topic(content.content_id).await,
            ContentKind::Post => self.load_post(content.content_id).await,
        }
    }

    async fn create_reply(&self, reply: &Reply) -> Result<PostId> {
        let body = CreatePost {
            topic_id: reply.topic_id.get(),
            raw: &reply.raw,
            reply_to_post_number: reply.reply_to_post_number,
        };

        let response = self
            .authorize(self.client.post(self.url("/posts.json")))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::api(SERVICE, format!("Failed to create reply: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error = response.text().await.unwrap_or_default();
            return Err(Error::api_status(SERVICE, status, format!("Failed to create reply: {error}")));
        }

        let created: CreatedPost = response
            .json()
            .await
            .map_err(|e| Error::api(SERVICE, format!("Invalid create-post response: {e}")))?;
        Ok(PostId::new(created.id))
    }
}
