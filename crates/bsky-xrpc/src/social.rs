//! The remote operations the session core relies on

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CreateRecordRequest, FeedGenerator, FeedPage, Profile, RecordRef, SessionTokens};

/// Authenticated calls against a Bluesky service.
///
/// The session core only ever talks to the network through this trait, so
/// tests can swap in an in-memory double.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// `com.atproto.server.createSession`
    async fn create_session(&self, identifier: &str, password: &str) -> Result<SessionTokens>;

    /// `app.bsky.actor.getProfile` for a handle or DID
    async fn get_profile(&self, actor: &str, token: &str) -> Result<Profile>;

    /// `com.atproto.repo.createRecord`
    async fn create_record(&self, request: &CreateRecordRequest, token: &str) -> Result<RecordRef>;

    /// `app.bsky.feed.getTimeline`
    async fn get_timeline(&self, token: &str) -> Result<FeedPage>;

    /// `app.bsky.feed.getFeed` for a canonical `at://` feed URI
    async fn get_feed(&self, feed_uri: &str, token: &str) -> Result<FeedPage>;

    /// Feed generators the user has saved, in preference order
    async fn get_saved_feeds(&self, token: &str) -> Result<Vec<FeedGenerator>>;

    /// `app.bsky.feed.getActorFeeds`: generators authored by `actor`
    async fn get_actor_feeds(&self, actor: &str, token: &str) -> Result<Vec<FeedGenerator>>;
}
