pub mod filter;
pub mod reddit;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub type ContentResult<T> = core::result::Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("content fetch failed: {0}")]
    Fetch(String),

    #[error("no posts found for topic '{0}'")]
    NoPosts(String),

    #[error("no posts with enough comments for topic '{0}'")]
    NoViablePosts(String),

    #[error("post '{post_id}' has too few comments ({count})")]
    TooFewComments { post_id: String, count: usize },

    #[error("only {0} usable comments after filtering")]
    NotEnoughUsable(usize),
}

/// A candidate post as the remote platform reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub num_comments: u32,
    pub score: i64,
}

/// An unfiltered comment straight off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub author: String,
    pub score: i64,
    pub body: String,
}

/// Remote content retrieval, one external call per method.
///
/// Implementations do not retry; a round that cannot be sourced is the
/// caller's problem (it substitutes from the offline bank).
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Popular posts for `topic` within `window` (e.g. "month").
    async fn top_posts(
        &self,
        topic: &str,
        window: &str,
        limit: usize,
    ) -> ContentResult<Vec<RawPost>>;

    /// Top comments of one post, best first.
    async fn top_comments(&self, post_id: &str, limit: usize) -> ContentResult<Vec<RawComment>>;
}
