use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::http::DEFAULT_BASE_URL;

/// Thumbnail values that are placeholders rather than URLs
const THUMBNAIL_SENTINELS: [&str; 3] = ["self", "default", "nsfw"];

/// Suffixes of a post `url` that point straight at an image
const DIRECT_IMAGE_SUFFIXES: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub preview: Option<Preview>,
    #[serde(default)]
    pub media_metadata: Option<BTreeMap<String, MediaMetadata>>,
    #[serde(default)]
    pub gallery_data: Option<GalleryData>,
    #[serde(default)]
    pub stickied: bool,
    #[serde(default)]
    pub created_utc: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preview {
    #[serde(default)]
    pub images: Vec<PreviewImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewImage {
    pub source: PreviewSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSource {
    pub url: String,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryData {
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    pub media_id: String,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "s")]
    pub source: Option<MediaImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaImage {
    #[serde(default, rename = "u")]
    pub url: Option<String>,
    #[serde(default, rename = "x")]
    pub width: Option<i64>,
    #[serde(default, rename = "y")]
    pub height: Option<i64>,
}

impl MediaMetadata {
    /// Unescaped source URL, only for entries whose status is `valid`.
    fn valid_url(&self) -> Option<String> {
        if self.status != "valid" {
            return None;
        }
        let url = self.source.as_ref()?.url.as_deref()?;
        parse_image_url(&url.replace("&amp;", "&"))
    }
}

impl Post {
    /// The first 300 characters of the self text
    pub fn preview_text(&self) -> String {
        self.selftext
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(300)
            .collect()
    }

    pub fn full_url(&self) -> Option<Url> {
        Url::parse(DEFAULT_BASE_URL)
            .ok()?
            .join(&self.permalink)
            .ok()
    }

    /// Title with HTML entities decoded (`&amp;` and friends)
    pub fn display_title(&self) -> String {
        decode_html_entities(&self.title).into_owned()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.created_utc?;
        DateTime::from_timestamp(secs.trunc() as i64, 0)
    }

    /// The single best image for the post.
    ///
    /// Priority: preview source, first valid media metadata entry, direct
    /// image `url`, thumbnail.
    pub fn best_image_url(&self) -> Option<String> {
        self.preview_image_url()
            .or_else(|| self.media_image_urls().into_iter().next())
            .or_else(|| self.direct_image_url())
            .or_else(|| self.thumbnail_url())
    }

    /// Every candidate image, in the same priority order as
    /// [`best_image_url`](Self::best_image_url). Duplicates are kept.
    pub fn all_image_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        urls.extend(self.preview_image_url());
        urls.extend(self.gallery_image_urls());
        urls.extend(self.direct_image_url());
        urls.extend(self.thumbnail_url());
        urls
    }

    fn preview_image_url(&self) -> Option<String> {
        let image = self.preview.as_ref()?.images.first()?;
        parse_image_url(&image.source.url.replace("&amp;", "&"))
    }

    /// Valid gallery entries in gallery order.
    fn gallery_image_urls(&self) -> Vec<String> {
        let (Some(gallery), Some(media)) = (&self.gallery_data, &self.media_metadata) else {
            return Vec::new();
        };

        gallery
            .items
            .iter()
            .filter_map(|item| media.get(&item.media_id))
            .filter_map(MediaMetadata::valid_url)
            .collect()
    }

    /// Valid media entries: gallery order when the post is a gallery,
    /// otherwise media id order.
    fn media_image_urls(&self) -> Vec<String> {
        if self.gallery_data.is_some() {
            return self.gallery_image_urls();
        }

        self.media_metadata
            .iter()
            .flat_map(|media| media.values())
            .filter_map(MediaMetadata::valid_url)
            .collect()
    }

    fn direct_image_url(&self) -> Option<String> {
        let url = self.url.as_deref()?;
        let lowered = url.to_lowercase();
        if DIRECT_IMAGE_SUFFIXES
            .iter()
            .any(|suffix| lowered.ends_with(suffix))
        {
            parse_image_url(url)
        } else {
            None
        }
    }

    fn thumbnail_url(&self) -> Option<String> {
        let thumb = self.thumbnail.as_deref()?;
        if thumb.is_empty() || THUMBNAIL_SENTINELS.contains(&thumb) {
            return None;
        }
        parse_image_url(thumb)
    }
}

fn parse_image_url(candidate: &str) -> Option<String> {
    Url::parse(candidate).ok().map(|_| candidate.to_string())
}
