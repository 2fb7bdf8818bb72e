use core::fmt;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::constants::{MIN_POST_COMMENTS, REDDIT_BASE_URL};
use crate::content::{ContentError, ContentResult, ContentSource, RawComment, RawPost};

/// Client for the public listing endpoints of the discussion platform.
///
/// Every call is a single GET; failures bubble up untouched so the challenge
/// generator can fall back per round.
pub struct RedditClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl RedditClient {
    pub fn new(user_agent: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: String::from(REDDIT_BASE_URL),
            user_agent: String::from(user_agent),
        }
    }

    #[instrument(skip(self))]
    async fn fetch<T>(&self, url: String) -> ContentResult<T>
    where
        T: DeserializeOwned + fmt::Debug,
    {
        let res = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            error!(code = %status, url, "non-success response from content host");
            return Err(ContentError::Fetch(status.to_string()));
        }

        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    #[instrument(skip(self))]
    async fn top_posts(
        &self,
        topic: &str,
        window: &str,
        limit: usize,
    ) -> ContentResult<Vec<RawPost>> {
        let url = format!(
            "{}/r/{}/top.json?t={}&limit={}&raw_json=1",
            self.base_url, topic, window, limit
        );

        let listing: Listing<ListedPost> = self.fetch(url).await?;
        let posts: Vec<RawPost> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into())
            .collect();

        debug!(topic, fetched = posts.len(), "fetched top posts");

        if posts.is_empty() {
            return Err(ContentError::NoPosts(String::from(topic)));
        }

        Ok(posts)
    }

    #[instrument(skip(self))]
    async fn top_comments(&self, post_id: &str, limit: usize) -> ContentResult<Vec<RawComment>> {
        let url = format!(
            "{}/comments/{}.json?limit={}&sort=top&raw_json=1",
            self.base_url, post_id, limit
        );

        // the comments endpoint answers with a two-element array:
        // [post listing, comment listing]
        let (_post, comments): (Listing<ListedPost>, Listing<ListedComment>) =
            self.fetch(url).await?;

        let comments: Vec<RawComment> = comments
            .data
            .children
            .into_iter()
            // collapsed "load more" stubs come back as children with no body
            .filter(|child| !child.data.body.is_empty())
            .map(|child| child.data.into())
            .collect();

        debug!(post_id, fetched = comments.len(), "fetched top comments");

        if comments.len() < MIN_POST_COMMENTS as usize {
            return Err(ContentError::TooFewComments {
                post_id: String::from(post_id),
                count: comments.len(),
            });
        }

        Ok(comments)
    }
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    children: Vec<Child<T>>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ListedPost {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    num_comments: u32,
    #[serde(default)]
    score: i64,
}

impl From<ListedPost> for RawPost {
    fn from(value: ListedPost) -> Self {
        RawPost {
            id: value.id,
            title: value.title,
            num_comments: value.num_comments,
            score: value.score,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListedComment {
    #[serde(default)]
    author: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    body: String,
}

impl From<ListedComment> for RawComment {
    fn from(value: ListedComment) -> Self {
        RawComment {
            author: value.author,
            score: value.score,
            body: value.body,
        }
    }
}
