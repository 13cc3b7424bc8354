use std::fmt;

use serde::Serialize;

use crate::app::{RedthreadError, Result};
use crate::extractor::ExtractedContent;

/// A non-image markdown link found in a comment body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// A fully materialized comment.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub raw_text: String,
    pub processed_text: String,
    pub image_urls: Vec<String>,
    pub links: Vec<Link>,
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(id: String, raw_text: String, content: ExtractedContent) -> Self {
        Self {
            id,
            raw_text,
            processed_text: content.processed_text,
            image_urls: content.image_urls,
            links: content.links,
            replies: Vec::new(),
        }
    }

    /// The first two images, as shown inline by list renderers
    pub fn limited_image_urls(&self) -> &[String] {
        &self.image_urls[..self.image_urls.len().min(2)]
    }

    pub fn has_more_images(&self) -> bool {
        self.image_urls.len() > 2
    }
}

/// Fullname of the post a comment-tree session belongs to (`t3_<postId>`).
///
/// Every expansion request of the session carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkId(String);

impl LinkId {
    pub fn for_post(post_id: &str) -> Result<Self> {
        let post_id = post_id.trim();
        if post_id.is_empty() {
            return Err(RedthreadError::MissingLinkId);
        }
        Ok(Self(format!("t3_{}", post_id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Root comments of one post, in API order, with replies nested.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentTree {
    pub comments: Vec<Comment>,
}

impl CommentTree {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    /// Depth-first, pre-order walk yielding `(depth, comment)`.
    pub fn iter(&self) -> CommentIter<'_> {
        CommentIter::new(&self.comments)
    }

    /// Total number of comments at every depth
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

pub struct CommentIter<'a> {
    stack: Vec<(usize, &'a Comment)>,
}

impl<'a> CommentIter<'a> {
    /// Walk `comments` and their replies, treating them as depth 0.
    pub fn new(comments: &'a [Comment]) -> Self {
        Self {
            stack: comments.iter().rev().map(|c| (0, c)).collect(),
        }
    }
}

impl<'a> Iterator for CommentIter<'a> {
    type Item = (usize, &'a Comment);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, comment) = self.stack.pop()?;
        self.stack
            .extend(comment.replies.iter().rev().map(|reply| (depth + 1, reply)));
        Some((depth, comment))
    }
}
