//! Lookup configuration

use crate::api::{BASE_URL, DEFAULT_USER_AGENT, IMAGE_URL, RANDOM_URL};
use crate::request::KeyOrder;
use std::path::PathBuf;

/// Settings for a [`crate::CardClient`]
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Card info endpoint
    pub base_url: String,
    /// Random card endpoint
    pub random_url: String,
    /// Image host root
    pub image_url: String,
    /// Cache root directory
    pub cache_dir: PathBuf,
    /// Wipe the cache when the client is closed (same-run memoization).
    /// Disable to keep entries across runs.
    pub clear_on_close: bool,
    /// Filter ordering inside request keys
    pub key_order: KeyOrder,
    pub user_agent: String,
    /// When set, freshly fetched images are also written here as `<selector>.jpg`
    pub image_save_dir: Option<PathBuf>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            random_url: RANDOM_URL.to_string(),
            image_url: IMAGE_URL.to_string(),
            cache_dir: default_cache_dir(),
            clear_on_close: true,
            key_order: KeyOrder::Insertion,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            image_save_dir: None,
        }
    }
}

impl LookupConfig {
    /// Default config with a specific cache root
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }
}

/// Returns the default cache root: ~/.cache/ygo_lookup
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("ygo_lookup"))
        .unwrap_or_else(|| PathBuf::from("cache"))
}
