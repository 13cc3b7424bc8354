pub mod http_fetcher;
pub mod retry;

pub use http_fetcher::HttpFetcher;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

/// A single GET round trip returning the raw response body.
///
/// Implementations report non-2xx responses as
/// [`RedthreadError::BadStatus`](crate::app::RedthreadError::BadStatus).
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}
