use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::app::{RedthreadError, Result};
use crate::config::{CommentsConfig, Config};
use crate::domain::{CommentTree, LinkId, Post};
use crate::extractor::{ContentExtractor, MarkdownExtractor};
use crate::fetcher::{Fetcher, HttpFetcher, RetryPolicy};
use crate::reddit::endpoints;
use crate::reddit::listing::{ListingEnvelope, MoreChildrenResponse, PostRef, Thing};
use crate::reddit::SortType;
use crate::tree::{CommentTreeBuilder, MoreChildrenSource, RawThing, MAX_DEPTH};

/// Listing page limits accepted by the API
const LIMIT_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// One page of a subreddit listing
#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Cursor for the next page, if any
    pub after: Option<String>,
}

/// Entry point for post listings and comment trees.
///
/// Constructed explicitly from a [`Config`] and shared by reference; every
/// operation is an independent future and can run concurrently with others.
pub struct RedditClient {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    extractor: Arc<dyn ContentExtractor>,
    base_url: Url,
    retry: RetryPolicy,
    comments: CommentsConfig,
}

impl RedditClient {
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.http)?);
        Self::with_fetcher(fetcher, config)
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher + Send + Sync>, config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.http.base_url)?;
        let extractor = Arc::new(MarkdownExtractor::new(base_url.clone()));

        Ok(Self {
            fetcher,
            extractor,
            base_url,
            retry: config.retry.clone(),
            comments: config.comments.clone(),
        })
    }

    /// Replace the markdown extractor used for comment bodies
    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetch the first page of a subreddit listing.
    ///
    /// `limit` must be within 1..=100; it is checked before any request.
    /// Listing fetches are not retried.
    pub async fn fetch_posts(
        &self,
        subreddit: &str,
        sort: SortType,
        limit: u32,
    ) -> Result<Vec<Post>> {
        Ok(self.fetch_posts_page(subreddit, sort, limit, None).await?.posts)
    }

    pub async fn fetch_posts_page(
        &self,
        subreddit: &str,
        sort: SortType,
        limit: u32,
        after: Option<&str>,
    ) -> Result<PostPage> {
        if !LIMIT_RANGE.contains(&limit) {
            return Err(RedthreadError::InvalidLimit(limit));
        }

        let url = endpoints::listing_url(&self.base_url, subreddit, sort, limit, after)?;
        info!("Fetching posts from {}", url);

        let body = self.fetcher.fetch(&url).await?;
        let listing: ListingEnvelope<Thing<Post>> = serde_json::from_slice(&body)?;

        let posts: Vec<Post> = listing.data.children.into_iter().map(|t| t.data).collect();
        debug!("Decoded {} posts", posts.len());

        Ok(PostPage {
            posts,
            after: listing.data.after,
        })
    }

    /// Fetch and fully expand the comment tree of one post.
    ///
    /// A malformed top-level payload fails the call. Branches whose
    /// expansion keeps failing are left out and the call still succeeds.
    pub async fn fetch_comments(&self, permalink: &str) -> Result<CommentTree> {
        let url = endpoints::comments_url(
            &self.base_url,
            permalink,
            self.comments.limit,
            self.request_depth(),
        )?;
        info!("Fetching comments from {}", url);

        let body = self.fetcher.fetch(&url).await?;
        let (link_id, roots) = decode_comments_payload(&body)?;
        debug!("Found {} top-level nodes for {}", roots.len(), link_id);

        let tree = CommentTreeBuilder::new(self, self.extractor.as_ref(), &self.retry, &link_id)
            .with_max_depth(self.request_depth())
            .build(roots)
            .await;

        Ok(tree)
    }

    /// Configured depth, never above what the endpoints serve
    fn request_depth(&self) -> usize {
        self.comments.max_depth.min(MAX_DEPTH)
    }
}

#[async_trait]
impl MoreChildrenSource for RedditClient {
    async fn fetch_more(&self, link_id: &LinkId, children: &[String]) -> Result<Vec<RawThing>> {
        let url = endpoints::more_children_url(
            &self.base_url,
            link_id,
            children,
            self.request_depth(),
        )?;
        debug!("Expanding {} hidden comments", children.len());

        let body = self.fetcher.fetch(&url).await?;
        let response: MoreChildrenResponse = serde_json::from_slice(&body)?;

        if !response.json.errors.is_empty() {
            return Err(RedthreadError::Decode(format!(
                "morechildren rejected: {}",
                Value::Array(response.json.errors)
            )));
        }

        response
            .json
            .data
            .map(|data| data.things)
            .ok_or_else(|| RedthreadError::Decode("morechildren response has no data".into()))
    }
}

/// Split a `[postListing, commentListing]` payload into the session's
/// link id and the root comment nodes.
fn decode_comments_payload(body: &[u8]) -> Result<(LinkId, Vec<RawThing>)> {
    let payload: Vec<Value> = serde_json::from_slice(body)
        .map_err(|e| RedthreadError::Decode(format!("comments payload is not an array: {}", e)))?;

    let mut parts = payload.into_iter();
    let (Some(post_part), Some(comment_part)) = (parts.next(), parts.next()) else {
        return Err(RedthreadError::Decode(
            "comments payload has fewer than two listings".into(),
        ));
    };

    let post_listing: ListingEnvelope<Thing<PostRef>> = serde_json::from_value(post_part)
        .map_err(|e| RedthreadError::Decode(format!("post listing: {}", e)))?;
    let post = post_listing
        .data
        .children
        .into_iter()
        .next()
        .ok_or_else(|| RedthreadError::Decode("post listing is empty".into()))?;
    let link_id = LinkId::for_post(&post.data.id)?;

    let comment_listing: ListingEnvelope<RawThing> = serde_json::from_value(comment_part)
        .map_err(|e| RedthreadError::Decode(format!("comment listing: {}", e)))?;

    Ok((link_id, comment_listing.data.children))
}
