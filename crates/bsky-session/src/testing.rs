//! In-memory [`SocialClient`] for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bsky_xrpc::{
    CreateRecordRequest, FeedGenerator, FeedPage, Profile, RecordRef, Result, SessionTokens,
    SocialClient, XrpcError,
};
use serde_json::{json, Value};

#[derive(Default)]
pub(crate) struct MockClient {
    /// identifier -> (password, access token)
    accounts: HashMap<String, (String, String)>,
    /// actor -> DID
    profiles: HashMap<String, String>,
    saved_feeds: Vec<FeedGenerator>,
    actor_feeds: HashMap<String, Vec<FeedGenerator>>,
    timeline: Vec<Value>,
    feeds: HashMap<String, Vec<Value>>,
    fail_saved_feeds: bool,
    fail_actor_feeds: bool,
    reject_records: Option<String>,
    calls: Mutex<Vec<String>>,
    records: Mutex<Vec<CreateRecordRequest>>,
}

pub(crate) fn generator(name: &str, uri: &str) -> FeedGenerator {
    FeedGenerator {
        uri: uri.to_string(),
        display_name: name.to_string(),
        description: None,
    }
}

pub(crate) fn feed_entry(display_name: Option<&str>, handle: &str, text: &str) -> Value {
    let mut author = json!({ "handle": handle, "did": format!("did:plc:{handle}") });
    if let Some(name) = display_name {
        author["displayName"] = json!(name);
    }
    json!({
        "post": {
            "uri": format!("at://did:plc:{handle}/app.bsky.feed.post/1"),
            "author": author,
            "record": { "$type": "app.bsky.feed.post", "text": text }
        }
    })
}

fn status(code: u16, error: &str) -> XrpcError {
    XrpcError::Status {
        status: code,
        body: json!({ "error": error }).to_string(),
    }
}

impl MockClient {
    pub(crate) fn with_account(mut self, identifier: &str, password: &str, token: &str) -> Self {
        self.accounts.insert(
            identifier.to_string(),
            (password.to_string(), token.to_string()),
        );
        self
    }

    pub(crate) fn with_profile(mut self, actor: &str, did: &str) -> Self {
        self.profiles.insert(actor.to_string(), did.to_string());
        self
    }

    pub(crate) fn with_saved_feed(mut self, name: &str, uri: &str) -> Self {
        self.saved_feeds.push(generator(name, uri));
        self
    }

    pub(crate) fn with_actor_feed(mut self, actor: &str, name: &str, uri: &str) -> Self {
        self.actor_feeds
            .entry(actor.to_string())
            .or_default()
            .push(generator(name, uri));
        self
    }

    pub(crate) fn with_timeline(mut self, entries: Vec<Value>) -> Self {
        self.timeline = entries;
        self
    }

    pub(crate) fn with_feed(mut self, uri: &str, entries: Vec<Value>) -> Self {
        self.feeds.insert(uri.to_string(), entries);
        self
    }

    pub(crate) fn failing_saved_feeds(mut self) -> Self {
        self.fail_saved_feeds = true;
        self
    }

    pub(crate) fn failing_actor_feeds(mut self) -> Self {
        self.fail_actor_feeds = true;
        self
    }

    pub(crate) fn rejecting_records(mut self, body: &str) -> Self {
        self.reject_records = Some(body.to_string());
        self
    }

    /// Names of the remote methods called so far, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn records(&self) -> Vec<CreateRecordRequest> {
        self.records.lock().unwrap().clone()
    }

    fn record_call(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl SocialClient for MockClient {
    async fn create_session(&self, identifier: &str, password: &str) -> Result<SessionTokens> {
        self.record_call("createSession");
        match self.accounts.get(identifier) {
            Some((pw, token)) if pw == password => Ok(SessionTokens {
                access_jwt: token.clone(),
                refresh_jwt: None,
                handle: Some(identifier.to_string()),
                did: None,
            }),
            _ => Err(status(401, "AuthenticationRequired")),
        }
    }

    async fn get_profile(&self, actor: &str, _token: &str) -> Result<Profile> {
        self.record_call("getProfile");
        self.profiles
            .get(actor)
            .map(|did| Profile {
                did: did.clone(),
                handle: actor.to_string(),
                display_name: None,
            })
            .ok_or_else(|| status(400, "InvalidRequest"))
    }

    async fn create_record(&self, request: &CreateRecordRequest, _token: &str) -> Result<RecordRef> {
        self.record_call("createRecord");
        if let Some(body) = &self.reject_records {
            return Err(XrpcError::Status {
                status: 400,
                body: body.clone(),
            });
        }
        self.records.lock().unwrap().push(request.clone());
        Ok(RecordRef {
            uri: format!("at://{}/{}/3kabc", request.repo, request.collection),
            cid: "bafyreitest".to_string(),
        })
    }

    async fn get_timeline(&self, _token: &str) -> Result<FeedPage> {
        self.record_call("getTimeline");
        Ok(FeedPage {
            feed: self.timeline.clone(),
            cursor: None,
        })
    }

    async fn get_feed(&self, feed_uri: &str, _token: &str) -> Result<FeedPage> {
        self.record_call("getFeed");
        self.feeds
            .get(feed_uri)
            .map(|feed| FeedPage {
                feed: feed.clone(),
                cursor: None,
            })
            .ok_or_else(|| status(400, "UnknownFeed"))
    }

    async fn get_saved_feeds(&self, _token: &str) -> Result<Vec<FeedGenerator>> {
        self.record_call("getFeedGenerators");
        if self.fail_saved_feeds {
            return Err(status(502, "UpstreamFailure"));
        }
        Ok(self.saved_feeds.clone())
    }

    async fn get_actor_feeds(&self, actor: &str, _token: &str) -> Result<Vec<FeedGenerator>> {
        self.record_call("getActorFeeds");
        if self.fail_actor_feeds {
            return Err(status(503, "UpstreamFailure"));
        }
        Ok(self.actor_feeds.get(actor).cloned().unwrap_or_default())
    }
}
