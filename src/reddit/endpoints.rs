use url::Url;

use crate::app::Result;
use crate::domain::LinkId;
use crate::reddit::SortType;

/// `r/{subreddit}/{sort}.json?limit=..`, or the front page when `subreddit` is empty.
pub fn listing_url(
    base: &Url,
    subreddit: &str,
    sort: SortType,
    limit: u32,
    after: Option<&str>,
) -> Result<Url> {
    let subreddit = subreddit
        .trim()
        .trim_start_matches('/')
        .trim_start_matches("r/")
        .trim_matches('/');
    let path = if subreddit.is_empty() {
        format!("{}.json", sort.as_str())
    } else {
        format!("r/{}/{}.json", subreddit, sort.as_str())
    };

    let mut url = base.join(&path)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("limit", &limit.to_string());
        if let Some(after) = after {
            pairs.append_pair("after", after);
        }
    }
    Ok(url)
}

/// `{permalink}.json?limit=..&depth=..&threaded=false`.
///
/// Accepts a bare permalink (`/r/x/comments/id/slug/`) or a full post URL.
pub fn comments_url(base: &Url, permalink: &str, limit: u32, depth: usize) -> Result<Url> {
    let path = match Url::parse(permalink) {
        Ok(full) => full.path().to_string(),
        Err(_) => permalink.trim().to_string(),
    };
    let path = format!("{}.json", path.trim_matches('/'));

    let mut url = base.join(&path)?;
    url.query_pairs_mut()
        .append_pair("limit", &limit.to_string())
        .append_pair("depth", &depth.to_string())
        .append_pair("threaded", "false");
    Ok(url)
}

/// `api/morechildren` for one batch of hidden child ids
pub fn more_children_url(
    base: &Url,
    link_id: &LinkId,
    children: &[String],
    depth: usize,
) -> Result<Url> {
    let mut url = base.join("api/morechildren")?;
    url.query_pairs_mut()
        .append_pair("api_type", "json")
        .append_pair("link_id", link_id.as_str())
        .append_pair("children", &children.join(","))
        .append_pair("sort", "confidence")
        .append_pair("limit_children", "false")
        .append_pair("depth", &depth.to_string());
    Ok(url)
}
