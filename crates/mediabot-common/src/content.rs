//! Forum content, resolved once at the boundary into a single shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CategoryId, PostId, TopicId};

/// Whether a content-created event refers to a topic or a reply post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Topic,
    Post,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic => write!(f, "topic"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// Reference to a newly created piece of content, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub content_id: u64,
    pub kind: ContentKind,
}

impl ContentRef {
    pub fn topic(id: impl Into<u64>) -> Self {
        Self {
            content_id: id.into(),
            kind: ContentKind::Topic,
        }
    }

    pub fn post(id: impl Into<u64>) -> Self {
        Self {
            content_id: id.into(),
            kind: ContentKind::Post,
        }
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.content_id)
    }
}

/// A topic with the raw text of its first post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContent {
    pub id: TopicId,
    pub raw: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub author_locale: Option<String>,
}

/// A reply post inside an existing topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub id: PostId,
    pub topic_id: TopicId,
    pub post_number: u32,
    pub raw: String,
    /// Tags of the enclosing topic.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub author_locale: Option<String>,
}

/// Content eligible for a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentSource {
    Topic(TopicContent),
    Post(PostContent),
}

impl ContentSource {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Topic(_) => ContentKind::Topic,
            Self::Post(_) => ContentKind::Post,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Self::Topic(t) => &t.raw,
            Self::Post(p) => &p.raw,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Self::Topic(t) => &t.tags,
            Self::Post(p) => &p.tags,
        }
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        match self {
            Self::Topic(t) => t.category_id,
            Self::Post(p) => p.category_id,
        }
    }

    pub fn author_locale(&self) -> Option<&str> {
        match self {
            Self::Topic(t) => t.author_locale.as_deref(),
            Self::Post(p) => p.author_locale.as_deref(),
        }
    }

    /// Topic the reply belongs in.
    pub fn topic_id(&self) -> TopicId {
        match self {
            Self::Topic(t) => t.id,
            Self::Post(p) => p.topic_id,
        }
    }

    /// Post number a reply should thread under, if any. Topic replies are
    /// posted at the end of the topic.
    pub fn reply_to_post_number(&self) -> Option<u32> {
        match self {
            Self::Topic(_) => None,
            Self::Post(p) => Some(p.post_number),
        }
    }
}
