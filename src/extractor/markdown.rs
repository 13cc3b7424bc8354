use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::config::http::DEFAULT_BASE_URL;
use crate::domain::Link;
use crate::extractor::{ContentExtractor, IMAGE_EXTENSIONS};

static IMAGE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:!\[[^\]]*\]\()?(https?://[^\s)]+?\.(?:jpg|jpeg|gif|png|webp|bmp|tiff)(?:\?[^\s)]+)?)\)?",
    )
    .expect("valid image url regex")
});

static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid markdown link regex"));

static SPLIT_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\]\s*\(").expect("valid split link regex"));

/// Regex-based extractor for Reddit comment markdown.
///
/// Relative link targets such as `/r/rust` are resolved against `base_url`.
#[derive(Debug, Clone)]
pub struct MarkdownExtractor {
    base_url: Url,
}

impl Default for MarkdownExtractor {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default base url"),
        }
    }
}

impl MarkdownExtractor {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn resolve(&self, target: &str) -> Option<String> {
        match Url::parse(target) {
            Ok(_) => Some(target.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                self.base_url.join(target).ok().map(|url| url.to_string())
            }
            Err(_) => None,
        }
    }
}

impl ContentExtractor for MarkdownExtractor {
    fn image_urls(&self, text: &str) -> Vec<String> {
        IMAGE_URL_RE
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().replace("&amp;", "&").trim().to_string())
            .filter(|candidate| Url::parse(candidate).is_ok())
            .collect()
    }

    fn links(&self, text: &str) -> Vec<Link> {
        let mut links = Vec::new();

        for caps in MARKDOWN_LINK_RE.captures_iter(text) {
            let label = &caps[1];
            let target = caps[2].trim();

            let Some(url) = self.resolve(target) else {
                debug!("Skipping unparseable link target {:?}", target);
                continue;
            };

            if has_image_extension(&url) {
                continue;
            }

            links.push(Link {
                label: label.to_string(),
                url,
            });
        }

        links
    }

    fn clean_text(&self, text: &str, image_urls: &[String]) -> String {
        let mut cleaned = text.to_string();

        for url in image_urls.iter().filter(|url| !url.is_empty()) {
            let encoded = url.replace('&', "&amp;");

            for variant in [url.as_str(), encoded.as_str()] {
                let pattern = format!(r"!\[[^\]]*\]\({}\)", regex::escape(variant));
                if let Ok(re) = Regex::new(&pattern) {
                    cleaned = re.replace_all(&cleaned, "").into_owned();
                }
            }

            cleaned = cleaned.replace(url.as_str(), "");
            cleaned = cleaned.replace(encoded.as_str(), "");
        }

        SPLIT_LINK_RE
            .replace_all(&cleaned, "](")
            .trim()
            .to_string()
    }
}

/// Whether the last path segment of `url` ends in an image extension.
pub(crate) fn has_image_extension(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|segment| segment.rsplit_once('.'))
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MarkdownExtractor {
        MarkdownExtractor::default()
    }

    #[test]
    fn test_extract_image_and_link() {
        let text = "Check ![](https://x.com/a.png) and [site](https://x.com/page)";
        let content = extractor().extract(text);

        assert_eq!(content.image_urls, vec!["https://x.com/a.png"]);
        assert_eq!(
            content.links,
            vec![Link {
                label: "site".into(),
                url: "https://x.com/page".into(),
            }]
        );
        assert_eq!(
            content.processed_text,
            "Check  and [site](https://x.com/page)"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let text = "  Just some prose, nothing to see.\n";
        let ex = extractor();

        assert!(ex.image_urls(text).is_empty());
        assert!(ex.links(text).is_empty());
        assert_eq!(ex.clean_text(text, &[]), text.trim());
    }

    #[test]
    fn test_image_urls_in_order() {
        let text = "first https://i.redd.it/one.JPG then ![alt](https://i.imgur.com/two.webp) \
                    and https://example.com/three.gif?width=640";
        let urls = extractor().image_urls(text);

        assert_eq!(
            urls,
            vec![
                "https://i.redd.it/one.JPG",
                "https://i.imgur.com/two.webp",
                "https://example.com/three.gif?width=640",
            ]
        );
    }

    #[test]
    fn test_image_url_unescapes_ampersands() {
        let text = "![img](https://preview.redd.it/abc.png?width=640&amp;format=png)";
        let ex = extractor();
        let urls = ex.image_urls(text);

        assert_eq!(urls, vec!["https://preview.redd.it/abc.png?width=640&format=png"]);
        assert_eq!(ex.clean_text(text, &urls), "");
    }

    #[test]
    fn test_image_url_drops_trailing_paren() {
        let text = "(see https://x.com/pic.jpeg)";
        assert_eq!(extractor().image_urls(text), vec!["https://x.com/pic.jpeg"]);
    }

    #[test]
    fn test_links_exclude_images() {
        let text = "[pic](https://x.com/cat.PNG) [docs](https://docs.rs/regex) \
                    [tiff](https://x.com/scan.tiff?dl=1)";
        let links = extractor().links(text);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, "docs");
        assert_eq!(links[0].url, "https://docs.rs/regex");
    }

    #[test]
    fn test_relative_links_are_resolved() {
        let links = extractor().links("ask in [the sub](/r/rust)");
        assert_eq!(links[0].url, "https://www.reddit.com/r/rust");
    }

    #[test]
    fn test_clean_text_removes_every_form() {
        let url = "https://x.com/a.png?s=1&t=2".to_string();
        let text = "a ![](https://x.com/a.png?s=1&t=2) b https://x.com/a.png?s=1&amp;t=2 \
                    c ![x](https://x.com/a.png?s=1&amp;t=2) d";
        let cleaned = extractor().clean_text(text, &[url.clone()]);

        assert!(!cleaned.contains(&url));
        assert!(!cleaned.contains("https://x.com/a.png?s=1&amp;t=2"));
        assert!(!cleaned.contains("!["));
        assert!(cleaned.starts_with("a "));
        assert!(cleaned.ends_with(" d"));
    }

    #[test]
    fn test_clean_text_repairs_split_links() {
        let cleaned = extractor().clean_text("see [this] (https://x.com/page)", &[]);
        assert_eq!(cleaned, "see [this](https://x.com/page)");
    }

    #[test]
    fn test_clean_text_is_idempotent() {
        let ex = extractor();
        let text = "  look ![](https://x.com/a.png) [here] (https://x.com) https://x.com/b.gif  ";
        let urls = ex.image_urls(text);

        let once = ex.clean_text(text, &urls);
        let twice = ex.clean_text(&once, &urls);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let ex = extractor();
        let text = "![](https://x.com/a.png) [site](https://x.com/page)";
        assert_eq!(ex.extract(text), ex.extract(text));
    }

    #[test]
    fn test_has_image_extension() {
        assert!(has_image_extension("https://x.com/a/b.Jpg"));
        assert!(has_image_extension("https://x.com/b.bmp?x=1"));
        assert!(!has_image_extension("https://x.com/page"));
        assert!(!has_image_extension("https://x.com/png"));
        assert!(!has_image_extension("not a url.png"));
    }
}
