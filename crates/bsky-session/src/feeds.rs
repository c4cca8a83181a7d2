//! Custom feed lookup: turns whatever the user typed into an `at://` feed URI

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use atproto_identity::{Did, Handle, IdentityResolver, ResolutionError};
use bsky_xrpc::{FeedGenerator, SocialClient};
use moka::future::Cache;
use tracing::{debug, info};

use crate::error::{BskyError, Result};
use crate::identity::UserIdentity;
use crate::registry::SessionRegistry;

/// `at://<DID>/<collection>/<rkey>`, the only form `getFeed` accepts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalFeedUri(String);

impl CanonicalFeedUri {
    /// Accept a URI that already has the `at://` form
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("at://")?;
        let (authority, path) = rest.split_once('/')?;
        if authority.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self(uri.to_string()))
    }

    fn from_listing(generator: &FeedGenerator) -> Self {
        Self(generator.uri.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalFeedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display names of each user's saved feeds, for quick re-display.
/// Never consulted when resolving.
pub struct FeedCache {
    names: Cache<UserIdentity, Arc<Vec<String>>>,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        let names = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();
        Self { names }
    }

    pub async fn store(&self, identity: &UserIdentity, names: Vec<String>) {
        self.names.insert(identity.clone(), Arc::new(names)).await;
    }

    pub async fn names(&self, identity: &UserIdentity) -> Option<Arc<Vec<String>>> {
        self.names.get(identity).await
    }
}

/// Both feed lists shown by the feed listing command
#[derive(Debug, Clone, Default)]
pub struct FeedListing {
    pub saved: Vec<FeedGenerator>,
    pub authored: Vec<FeedGenerator>,
}

pub struct FeedResolver {
    registry: Arc<SessionRegistry>,
    client: Arc<dyn SocialClient>,
    identities: Arc<IdentityResolver>,
    cache: FeedCache,
}

impl FeedResolver {
    pub fn new(
        registry: Arc<SessionRegistry>,
        client: Arc<dyn SocialClient>,
        identities: Arc<IdentityResolver>,
        cache: FeedCache,
    ) -> Self {
        Self {
            registry,
            client,
            identities,
            cache,
        }
    }

    /// Resolve a feed reference for a logged-in user.
    ///
    /// Searched in this order, first hit wins:
    /// 1. saved feeds: URI contains the reference, or display name equals it
    ///    ignoring case
    /// 2. feeds the user authored: display name equals it ignoring case
    /// 3. `[at://]<actor>/<path…>`: a handle is looked up, a DID is taken
    ///    as is, and the reference is rebuilt as `at://<DID>/<path…>`
    ///
    /// Duplicate display names are not disambiguated; listing order decides.
    pub async fn resolve(
        &self,
        identity: &UserIdentity,
        reference: &str,
    ) -> Result<CanonicalFeedUri> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BskyError::InvalidInput("empty feed reference".to_string()));
        }
        let session = self.registry.require_session(identity).await?;

        let saved = self.client.get_saved_feeds(&session.token).await?;
        self.remember_names(identity, &saved).await;
        if let Some(found) = saved
            .iter()
            .find(|f| f.uri.contains(reference) || same_name(&f.display_name, reference))
        {
            debug!(identity = %identity, uri = %found.uri, "Matched saved feed");
            return Ok(CanonicalFeedUri::from_listing(found));
        }

        let authored = self
            .client
            .get_actor_feeds(&session.handle, &session.token)
            .await?;
        if let Some(found) = authored
            .iter()
            .find(|f| same_name(&f.display_name, reference))
        {
            debug!(identity = %identity, uri = %found.uri, "Matched authored feed");
            return Ok(CanonicalFeedUri::from_listing(found));
        }

        self.rewrite_path(reference, &session.token).await
    }

    /// Saved and authored feeds for a logged-in user. Refreshes the cached
    /// saved-feed names as a side effect.
    pub async fn list_feeds(&self, identity: &UserIdentity) -> Result<FeedListing> {
        let session = self.registry.require_session(identity).await?;

        let saved = self.client.get_saved_feeds(&session.token).await?;
        self.remember_names(identity, &saved).await;

        let authored = self
            .client
            .get_actor_feeds(&session.handle, &session.token)
            .await?;

        info!(
            identity = %identity,
            saved = saved.len(),
            authored = authored.len(),
            "Listed feeds"
        );
        Ok(FeedListing { saved, authored })
    }

    /// Saved-feed names seen by the last listing or resolution, if still cached
    pub async fn cached_feed_names(&self, identity: &UserIdentity) -> Option<Vec<String>> {
        self.cache
            .names(identity)
            .await
            .map(|names| names.as_ref().clone())
    }

    async fn remember_names(&self, identity: &UserIdentity, feeds: &[FeedGenerator]) {
        let names = feeds.iter().map(|f| f.display_name.clone()).collect();
        self.cache.store(identity, names).await;
    }

    async fn rewrite_path(&self, reference: &str, token: &str) -> Result<CanonicalFeedUri> {
        let no_match = |cause: Option<ResolutionError>| BskyError::FeedResolution {
            reference: reference.to_string(),
            cause,
        };

        // A full at:// reference names its authority directly
        let path_part = reference.strip_prefix("at://").unwrap_or(reference);
        let Some((actor, path)) = split_actor_path(path_part) else {
            debug!(reference, "No feed matched and reference is not a path");
            return Err(no_match(None));
        };

        let did = match Did::parse(actor) {
            Some(did) => did,
            None => {
                let handle = Handle::qualify(actor, self.registry.default_domain());
                self.identities
                    .resolve_did(handle.as_str(), token)
                    .await
                    .map_err(|e| no_match(Some(e)))?
            }
        };

        let uri = format!("at://{}/{}", did, path.join("/"));
        debug!(reference, %uri, "Rewrote feed path");
        CanonicalFeedUri::parse(&uri).ok_or_else(|| no_match(None))
    }
}

fn same_name(display_name: &str, reference: &str) -> bool {
    display_name.to_lowercase() == reference.to_lowercase()
}

/// `bob.example.com/app.bsky.feed.generator/cool` -> (`bob.example.com`,
/// [`app.bsky.feed.generator`, `cool`]). `None` without a non-empty rest.
fn split_actor_path(reference: &str) -> Option<(&str, Vec<&str>)> {
    let mut segments = reference.split('/');
    let actor = segments.next()?.trim();
    let rest: Vec<&str> = segments.filter(|s| !s.is_empty()).collect();
    if actor.is_empty() || rest.is_empty() {
        return None;
    }
    Some((actor, rest))
}
