use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{RedthreadError, Result};
use crate::config::Config;
use crate::reddit::RedditClient;

pub struct AppContext {
    pub config: Config,
    pub client: Arc<RedditClient>,
}

impl AppContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(&path),
            None => Config::load(),
        }
        .map_err(|e| RedthreadError::Config(e.to_string()))?;

        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let client = Arc::new(RedditClient::new(&config)?);
        Ok(Self { config, client })
    }
}
