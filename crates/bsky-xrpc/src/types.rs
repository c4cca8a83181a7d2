//! Request and response shapes for the XRPC methods we call

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection NSID for ordinary posts
pub const POST_COLLECTION: &str = "app.bsky.feed.post";

const SAVED_FEEDS_PREF_V2: &str = "app.bsky.actor.defs#savedFeedsPrefV2";
const SAVED_FEEDS_PREF: &str = "app.bsky.actor.defs#savedFeedsPref";

/// Tokens returned by `com.atproto.server.createSession`
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_jwt: String,
    pub refresh_jwt: Option<String>,
    pub handle: Option<String>,
    pub did: Option<String>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_jwt", &"<redacted>")
            .field("refresh_jwt", &self.refresh_jwt.as_ref().map(|_| "<redacted>"))
            .field("handle", &self.handle)
            .field("did", &self.did)
            .finish()
    }
}

#[derive(Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub(crate) identifier: &'a str,
    pub(crate) password: &'a str,
}

/// Subset of `app.bsky.actor.getProfile`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
}

/// Body of `com.atproto.repo.createRecord`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRecordRequest {
    pub repo: String,
    pub collection: String,
    pub record: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordRef {
    pub uri: String,
    pub cid: String,
}

/// A feed generator as listed by `getFeedGenerators` / `getActorFeeds`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedGenerator {
    pub uri: String,
    pub display_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedGeneratorsResponse {
    pub(crate) feeds: Vec<FeedGenerator>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferencesResponse {
    pub(crate) preferences: Vec<serde_json::Value>,
}

/// One page of `getTimeline` / `getFeed`.
///
/// Entries stay as raw JSON so a single malformed post can be reported
/// without losing the rest of the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPage {
    pub feed: Vec<serde_json::Value>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedViewPost {
    pub post: PostView,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostView {
    pub author: PostAuthor,
    pub record: PostRecord,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub handle: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    pub text: String,
}

impl FeedPage {
    /// Decode each entry independently, in listing order
    pub fn posts(&self) -> impl Iterator<Item = Result<FeedViewPost, serde_json::Error>> + '_ {
        self.feed
            .iter()
            .map(|entry| FeedViewPost::deserialize(entry))
    }
}

/// Saved feed URIs from an actor preferences document, in preference order.
///
/// Reads `savedFeedsPrefV2` items of type `feed` and the legacy
/// `savedFeedsPref` lists (pinned first); duplicates are dropped.
pub(crate) fn saved_feed_uris(preferences: &[serde_json::Value]) -> Vec<String> {
    let mut uris: Vec<String> = Vec::new();
    let mut push = |uri: &str| {
        if !uri.is_empty() && !uris.iter().any(|u| u == uri) {
            uris.push(uri.to_string());
        }
    };

    for pref in preferences {
        match pref.get("$type").and_then(|t| t.as_str()) {
            Some(SAVED_FEEDS_PREF_V2) => {
                let items = pref.get("items").and_then(|i| i.as_array());
                for item in items.into_iter().flatten() {
                    if item.get("type").and_then(|t| t.as_str()) != Some("feed") {
                        continue;
                    }
                    if let Some(value) = item.get("value").and_then(|v| v.as_str()) {
                        push(value);
                    }
                }
            }
            Some(SAVED_FEEDS_PREF) => {
                for key in ["pinned", "saved"] {
                    let list = pref.get(key).and_then(|l| l.as_array());
                    for uri in list.into_iter().flatten().filter_map(|u| u.as_str()) {
                        push(uri);
                    }
                }
            }
            _ => {}
        }
    }

    uris
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_tokens_debug_redacts_jwt() {
        let tokens: SessionTokens = serde_json::from_value(json!({
            "accessJwt": "secret-access",
            "refreshJwt": "secret-refresh",
            "handle": "alice.bsky.social",
            "did": "did:plc:alice"
        }))
        .unwrap();

        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("alice.bsky.social"));
    }

    #[test]
    fn test_feed_page_keeps_going_past_bad_entry() {
        let page: FeedPage = serde_json::from_value(json!({
            "feed": [
                { "post": { "author": { "handle": "a.test", "displayName": "A" }, "record": { "text": "one" } } },
                { "post": { "author": { "handle": "b.test" } } },
                { "post": { "author": { "handle": "c.test" }, "record": { "text": "three" } } }
            ]
        }))
        .unwrap();

        let posts: Vec<_> = page.posts().collect();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].as_ref().unwrap().post.record.text, "one");
        assert!(posts[1].is_err());
        let third = posts[2].as_ref().unwrap();
        assert_eq!(third.post.author.handle, "c.test");
        assert!(third.post.author.display_name.is_none());
    }

    #[test]
    fn test_saved_feed_uris_v2_only_feeds() {
        let prefs = vec![json!({
            "$type": "app.bsky.actor.defs#savedFeedsPrefV2",
            "items": [
                { "type": "timeline", "value": "following", "pinned": true },
                { "type": "feed", "value": "at://did:plc:a/app.bsky.feed.generator/one", "pinned": true },
                { "type": "list", "value": "at://did:plc:a/app.bsky.graph.list/x" },
                { "type": "feed", "value": "at://did:plc:b/app.bsky.feed.generator/two" }
            ]
        })];

        assert_eq!(
            saved_feed_uris(&prefs),
            vec![
                "at://did:plc:a/app.bsky.feed.generator/one".to_string(),
                "at://did:plc:b/app.bsky.feed.generator/two".to_string(),
            ]
        );
    }

    #[test]
    fn test_saved_feed_uris_legacy_dedup() {
        let prefs = vec![
            json!({ "$type": "app.bsky.actor.defs#adultContentPref", "enabled": false }),
            json!({
                "$type": "app.bsky.actor.defs#savedFeedsPref",
                "pinned": ["at://did:plc:a/app.bsky.feed.generator/one"],
                "saved": [
                    "at://did:plc:a/app.bsky.feed.generator/one",
                    "at://did:plc:c/app.bsky.feed.generator/three"
                ]
            }),
        ];

        assert_eq!(
            saved_feed_uris(&prefs),
            vec![
                "at://did:plc:a/app.bsky.feed.generator/one".to_string(),
                "at://did:plc:c/app.bsky.feed.generator/three".to_string(),
            ]
        );
    }

    #[test]
    fn test_feed_generator_deserialization() {
        let generator: FeedGenerator = serde_json::from_value(json!({
            "uri": "at://did:plc:abc/app.bsky.feed.generator/cool",
            "cid": "bafy",
            "did": "did:web:feeds.example.com",
            "displayName": "Cool Feed",
            "likeCount": 3
        }))
        .unwrap();
        assert_eq!(generator.display_name, "Cool Feed");
        assert!(generator.description.is_none());
    }
}
