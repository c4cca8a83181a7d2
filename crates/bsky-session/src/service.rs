//! Wires the session core together for a caller

use std::sync::Arc;

use atproto_identity::IdentityResolver;
use bsky_xrpc::SocialClient;
use tracing::info;

use crate::config::Config;
use crate::content::ContentService;
use crate::feeds::{FeedCache, FeedResolver};
use crate::registry::SessionRegistry;
use crate::store::CredentialStore;

/// Everything a command handler needs, sharing one client and one registry
pub struct BskyService {
    pub registry: Arc<SessionRegistry>,
    pub feeds: FeedResolver,
    pub content: ContentService,
}

impl BskyService {
    /// Load stored sessions and build the feed and content services
    pub async fn open(config: &Config, client: Arc<dyn SocialClient>) -> Self {
        let store = CredentialStore::new(config.store_path.clone());
        let registry = Arc::new(SessionRegistry::open(client.clone(), store, config).await);
        let identities = Arc::new(IdentityResolver::new(client.clone()));

        let feeds = FeedResolver::new(
            registry.clone(),
            client.clone(),
            identities.clone(),
            FeedCache::new(config.feed_cache_ttl),
        );
        let content = ContentService::new(registry.clone(), client, identities);

        Self {
            registry,
            feeds,
            content,
        }
    }

    /// Flush sessions to disk
    pub async fn shutdown(&self) {
        self.registry.flush().await;
        info!("Session state flushed");
    }
}
