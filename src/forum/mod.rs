//! Host forum seam: load the content a lookup was triggered for, and post
//! the bot's reply.

mod discourse;

pub use discourse::DiscourseForum;

use mediabot_common::{ContentRef, ContentSource, PostId, Result, TopicId};
use serde::{Deserialize, Serialize};

/// A reply to post under the bot identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub topic_id: TopicId,
    /// Post being answered; `None` replies to the topic itself.
    pub reply_to_post_number: Option<u32>,
    pub raw: String,
}

impl Reply {
    /// A reply answering `source`: topics get a plain topic reply, posts are
    /// answered by post number.
    pub fn to(source: &ContentSource, raw: impl Into<String>) -> Self {
        Self {
            topic_id: source.topic_id(),
            reply_to_post_number: source.reply_to_post_number(),
            raw: raw.into(),
        }
    }
}

/// The forum the bot serves.
#[async_trait::async_trait]
pub trait Forum: Send + Sync {
    /// Load a topic (with its first post) or a post. `Ok(None)` when it no
    /// longer exists.
    async fn fetch_content(&self, content: ContentRef) -> Result<Option<ContentSource>>;

    /// Publish `reply`, returning the new post's id.
    async fn create_reply(&self, reply: &Reply) -> Result<PostId>;
}
