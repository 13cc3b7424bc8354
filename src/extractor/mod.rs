//! Content extraction from raw comment markdown.
//!
//! Extraction is isolated behind [`ContentExtractor`] so the regex-based
//! [`MarkdownExtractor`] can be replaced by a real markdown tokenizer
//! without touching tree assembly.

mod markdown;

pub use markdown::MarkdownExtractor;

use crate::domain::Link;

/// File extensions treated as embedded images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "gif", "png", "webp", "bmp", "tiff"];

/// Everything derived from one comment body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub image_urls: Vec<String>,
    pub links: Vec<Link>,
    pub processed_text: String,
}

/// Pure, deterministic extraction of images, links and display text.
pub trait ContentExtractor: Send + Sync {
    /// Image URLs in first-seen order.
    fn image_urls(&self, text: &str) -> Vec<String>;

    /// Non-image markdown links in first-seen order.
    fn links(&self, text: &str) -> Vec<Link>;

    /// `text` with the given image URLs removed and split link syntax repaired.
    fn clean_text(&self, text: &str, image_urls: &[String]) -> String;

    fn extract(&self, text: &str) -> ExtractedContent {
        let image_urls = self.image_urls(text);
        let links = self.links(text);
        let processed_text = self.clean_text(text, &image_urls);
        ExtractedContent {
            image_urls,
            links,
            processed_text,
        }
    }
}
