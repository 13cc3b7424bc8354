//! Reddit JSON API access.
//!
//! - [`RedditClient`]: listing and comment-tree fetches over a [`Fetcher`](crate::fetcher::Fetcher)
//! - [`endpoints`]: URL construction for the three endpoints used
//! - [`listing`]: wire envelopes

mod client;
pub mod endpoints;
pub mod listing;

pub use client::{PostPage, RedditClient};

use serde::Deserialize;

/// Sort order of a subreddit listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    New,
    #[default]
    Hot,
    Top,
}

impl SortType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::New => "new",
            SortType::Hot => "hot",
            SortType::Top => "top",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortType::New => "New",
            SortType::Hot => "Hot",
            SortType::Top => "Top",
        }
    }
}
