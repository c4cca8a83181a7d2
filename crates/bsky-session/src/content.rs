//! Posting and reading timelines / custom feeds

use std::sync::Arc;

use atproto_identity::IdentityResolver;
use bsky_xrpc::{CreateRecordRequest, FeedPage, RecordRef, SocialClient, POST_COLLECTION};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{BskyError, Result};
use crate::feeds::CanonicalFeedUri;
use crate::identity::UserIdentity;
use crate::registry::SessionRegistry;

/// One entry of a timeline or feed, in API order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Post {
        author_display_name: String,
        author_handle: String,
        text: String,
    },
    /// An entry that could not be decoded; the rest of the page is unaffected
    Unreadable(String),
}

pub struct ContentService {
    registry: Arc<SessionRegistry>,
    client: Arc<dyn SocialClient>,
    identities: Arc<IdentityResolver>,
}

impl ContentService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        client: Arc<dyn SocialClient>,
        identities: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            registry,
            client,
            identities,
        }
    }

    /// Publish a text post as the user's account
    pub async fn post(&self, identity: &UserIdentity, text: &str) -> Result<RecordRef> {
        if text.trim().is_empty() {
            return Err(BskyError::InvalidInput("post text is empty".to_string()));
        }
        let session = self.registry.require_session(identity).await?;

        // Records are written to the repo named by DID, not by handle
        let did = self
            .identities
            .resolve_did(&session.handle, &session.token)
            .await?;

        let request = CreateRecordRequest {
            repo: did.to_string(),
            collection: POST_COLLECTION.to_string(),
            record: json!({
                "$type": POST_COLLECTION,
                "text": text,
                "createdAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }),
        };

        let record = self
            .client
            .create_record(&request, &session.token)
            .await
            .map_err(|e| {
                warn!(identity = %identity, error = %e, "Post rejected");
                BskyError::Transport(e)
            })?;

        info!(identity = %identity, uri = %record.uri, "Posted");
        Ok(record)
    }

    pub async fn fetch_timeline(&self, identity: &UserIdentity) -> Result<Vec<FeedItem>> {
        let token = self.registry.current_token(identity).await?;
        let page = self.client.get_timeline(&token).await?;
        Ok(feed_items(&page))
    }

    pub async fn fetch_feed(
        &self,
        identity: &UserIdentity,
        feed: &CanonicalFeedUri,
    ) -> Result<Vec<FeedItem>> {
        let token = self.registry.current_token(identity).await?;
        let page = self.client.get_feed(feed.as_str(), &token).await?;
        Ok(feed_items(&page))
    }
}

/// Authors without a display name are shown by handle
fn feed_items(page: &FeedPage) -> Vec<FeedItem> {
    page.posts()
        .map(|entry| match entry {
            Ok(view) => {
                let author = view.post.author;
                FeedItem::Post {
                    author_display_name: author
                        .display_name
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| author.handle.clone()),
                    author_handle: author.handle,
                    text: view.post.record.text,
                }
            }
            Err(e) => FeedItem::Unreadable(e.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::CredentialStore;
    use crate::testing::{feed_entry, MockClient};
    use chrono::DateTime;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn alice() -> UserIdentity {
        UserIdentity::new("player-1").unwrap()
    }

    async fn setup(dir: &TempDir, mock: MockClient) -> (ContentService, Arc<MockClient>) {
        let client = Arc::new(
            mock.with_account("alice.bsky.social", "pw", "tok")
                .with_profile("alice.bsky.social", "did:plc:alice"),
        );
        let registry = Arc::new(
            SessionRegistry::open(
                client.clone(),
                CredentialStore::new(dir.path().join("userdata.json")),
                &Config::default(),
            )
            .await,
        );
        registry.login(&alice(), "alice", "pw").await.unwrap();

        let service = ContentService::new(
            registry,
            client.clone(),
            Arc::new(IdentityResolver::new(client.clone())),
        );
        (service, client)
    }

    #[tokio::test]
    async fn test_post_writes_to_did_repo() {
        let dir = tempdir().unwrap();
        let (service, client) = setup(&dir, MockClient::default()).await;

        let record = service.post(&alice(), "hello from the server").await.unwrap();
        assert!(record.uri.starts_with("at://did:plc:alice/app.bsky.feed.post/"));

        let records = client.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].repo, "did:plc:alice");
        assert_eq!(records[0].collection, "app.bsky.feed.post");
        assert_eq!(records[0].record["text"], "hello from the server");

        let created_at = records[0].record["createdAt"].as_str().unwrap();
        assert!(created_at.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(created_at).is_ok());

        // DID lookup happens before the write
        let calls = client.calls();
        let profile = calls.iter().position(|c| c == "getProfile").unwrap();
        let create = calls.iter().position(|c| c == "createRecord").unwrap();
        assert!(profile < create);
    }

    #[tokio::test]
    async fn test_rejected_post_surfaces_body() {
        let dir = tempdir().unwrap();
        let (service, _) = setup(
            &dir,
            MockClient::default().rejecting_records(r#"{"error":"InvalidRecord"}"#),
        )
        .await;

        let err = service.post(&alice(), "hi").await.unwrap_err();
        assert!(matches!(err, BskyError::Transport(_)));
        assert!(err.to_string().contains("InvalidRecord"));
    }

    #[tokio::test]
    async fn test_post_requires_session() {
        let dir = tempdir().unwrap();
        let (service, _) = setup(&dir, MockClient::default()).await;
        let stranger = UserIdentity::new("player-2").unwrap();

        assert!(matches!(
            service.post(&stranger, "hi").await,
            Err(BskyError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_empty_post_rejected() {
        let dir = tempdir().unwrap();
        let (service, client) = setup(&dir, MockClient::default()).await;

        assert!(matches!(
            service.post(&alice(), "   ").await,
            Err(BskyError::InvalidInput(_))
        ));
        assert!(client.records().is_empty());
    }

    #[tokio::test]
    async fn test_timeline_keeps_order_and_skips_bad_post() {
        let dir = tempdir().unwrap();
        let (service, _) = setup(
            &dir,
            MockClient::default().with_timeline(vec![
                feed_entry(Some("Bob"), "bob.test", "newest"),
                json!({ "post": { "author": { "handle": "broken.test" } } }),
                feed_entry(None, "carol.test", "oldest"),
            ]),
        )
        .await;

        let items = service.fetch_timeline(&alice()).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            FeedItem::Post {
                author_display_name: "Bob".to_string(),
                author_handle: "bob.test".to_string(),
                text: "newest".to_string(),
            }
        );
        assert!(matches!(items[1], FeedItem::Unreadable(_)));
        assert_eq!(
            items[2],
            FeedItem::Post {
                author_display_name: "carol.test".to_string(),
                author_handle: "carol.test".to_string(),
                text: "oldest".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_feed() {
        let dir = tempdir().unwrap();
        let uri = "at://did:plc:gen/app.bsky.feed.generator/cats";
        let (service, _) = setup(
            &dir,
            MockClient::default().with_feed(uri, vec![feed_entry(Some("Cat"), "cat.test", "meow")]),
        )
        .await;

        let feed = CanonicalFeedUri::parse(uri).unwrap();
        let items = service.fetch_feed(&alice(), &feed).await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_timeline_requires_session() {
        let dir = tempdir().unwrap();
        let (service, client) = setup(&dir, MockClient::default()).await;
        let stranger = UserIdentity::new("player-2").unwrap();

        assert!(matches!(
            service.fetch_timeline(&stranger).await,
            Err(BskyError::NotAuthenticated)
        ));
        assert!(!client.calls().contains(&"getTimeline".to_string()));
    }
}
