use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::identity::Language;

/// Configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PDS / entryway all XRPC calls go to
    pub service_url: String,
    /// JSON document holding tokens, handles and language preferences
    pub store_path: PathBuf,
    /// Appended to bare names at login
    pub default_domain: String,
    pub default_language: Language,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    pub feed_cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: "https://bsky.social".to_string(),
            store_path: PathBuf::from("./data/userdata.json"),
            default_domain: "bsky.social".to_string(),
            default_language: Language::Ja,
            request_timeout: Duration::from_secs(30),
            feed_cache_ttl: Duration::from_secs(3600),
        }
    }
}

impl Config {
    /// Parse configuration from environment variables, falling back to
    /// defaults for anything missing or unparseable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let service_url = env::var("BSKY_SERVICE_URL").unwrap_or(defaults.service_url);

        let store_path = env::var("BSKY_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let default_domain = env::var("BSKY_DEFAULT_DOMAIN").unwrap_or(defaults.default_domain);

        let default_language = env::var("BSKY_LANGUAGE")
            .ok()
            .and_then(|l| l.parse().ok())
            .unwrap_or(defaults.default_language);

        let request_timeout = env::var("BSKY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let feed_cache_ttl = env::var("BSKY_FEED_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.feed_cache_ttl);

        Self {
            service_url,
            store_path,
            default_domain,
            default_language,
            request_timeout,
            feed_cache_ttl,
        }
    }
}
