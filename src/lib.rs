//! # redthread
//!
//! Reconstructs Reddit comment threads from the public JSON API and
//! extracts images, links and clean prose from every comment.
//!
//! ## Architecture
//!
//! ```text
//! RedditClient → Fetcher → CommentTreeBuilder ⇄ RetryPolicy → morechildren
//!                                 ↓
//!                         ContentExtractor → CommentTree
//! ```
//!
//! The comment listing endpoint returns a shallow tree in which deep or
//! long branches are replaced by "more" stubs. [`tree::CommentTreeBuilder`]
//! walks the listing breadth-first and resolves each stub through the
//! secondary endpoint until the tree is complete or the retry budget for
//! that branch is spent.
//!
//! ## Quick Start
//!
//! ```bash
//! # Hot posts of two subreddits
//! redthread posts rust programming --limit 10
//!
//! # Full comment tree
//! redthread comments /r/rust/comments/abc123/some_title/
//!
//! # Summarizer prompt
//! redthread outline /r/rust/comments/abc123/some_title/
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Posts, comments and comment trees
//! - [`extractor`]: Image/link extraction and text cleanup
//! - [`fetcher`]: HTTP transport and retry policy
//! - [`reddit`]: API client and endpoints
//! - [`summary`]: Summarizer seam and prompt rendering
//! - [`tree`]: Comment tree assembly

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires configuration into a
/// [`RedditClient`](reddit::RedditClient).
pub mod app;

/// Command-line interface using clap.
///
/// - `posts <subreddit>...` - List posts
/// - `comments <permalink>` - Print a fully expanded comment tree
/// - `outline <permalink>` - Print the summarizer prompt
pub mod cli;

/// Configuration loaded from `~/.config/redthread/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Post`](domain::Post): listing entry with image resolution
/// - [`Comment`](domain::Comment): materialized comment with extracted content
/// - [`CommentTree`](domain::CommentTree): root comments with nested replies
pub mod domain;

/// Markdown content extraction behind the
/// [`ContentExtractor`](extractor::ContentExtractor) trait.
pub mod extractor;

/// HTTP fetching and retry.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for a single GET
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`RetryPolicy`](fetcher::RetryPolicy): bounded exponential backoff
pub mod fetcher;

pub mod reddit;

pub mod summary;

pub mod tree;
