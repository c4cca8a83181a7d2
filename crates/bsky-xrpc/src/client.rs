//! reqwest-backed [`SocialClient`]

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, XrpcError};
use crate::social::SocialClient;
use crate::types::{
    saved_feed_uris, CreateRecordRequest, CreateSessionRequest, FeedGenerator,
    FeedGeneratorsResponse, FeedPage, PreferencesResponse, Profile, RecordRef, SessionTokens,
};

const DEFAULT_SERVICE_URL: &str = "https://bsky.social";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ACTOR_FEEDS_LIMIT: u32 = 100;

/// Client for a Bluesky PDS / entryway speaking XRPC over HTTP
pub struct XrpcClient {
    http: reqwest::Client,
    service_url: String,
}

impl XrpcClient {
    /// Create a client for bsky.social with a 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_SERVICE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client for a custom service URL and request timeout
    pub fn with_config(service_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            service_url: service_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, nsid)
    }

    fn profile_url(&self, actor: &str) -> String {
        format!(
            "{}?actor={}",
            self.endpoint("app.bsky.actor.getProfile"),
            urlencoding::encode(actor)
        )
    }

    fn feed_url(&self, feed_uri: &str) -> String {
        format!(
            "{}?feed={}",
            self.endpoint("app.bsky.feed.getFeed"),
            urlencoding::encode(feed_uri)
        )
    }

    /// One `feeds=` parameter per URI
    fn generators_url(&self, uris: &[String]) -> String {
        let params = uris
            .iter()
            .map(|u| format!("feeds={}", urlencoding::encode(u)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{params}", self.endpoint("app.bsky.feed.getFeedGenerators"))
    }

    fn actor_feeds_url(&self, actor: &str) -> String {
        format!(
            "{}?actor={}&limit={}",
            self.endpoint("app.bsky.feed.getActorFeeds"),
            urlencoding::encode(actor),
            ACTOR_FEEDS_LIMIT
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(%status, "XRPC call rejected");
        return Err(XrpcError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl SocialClient for XrpcClient {
    async fn create_session(&self, identifier: &str, password: &str) -> Result<SessionTokens> {
        let response = self
            .http
            .post(self.endpoint("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn get_profile(&self, actor: &str, token: &str) -> Result<Profile> {
        self.get_json(&self.profile_url(actor), token).await
    }

    async fn create_record(&self, request: &CreateRecordRequest, token: &str) -> Result<RecordRef> {
        let response = self
            .http
            .post(self.endpoint("com.atproto.repo.createRecord"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_timeline(&self, token: &str) -> Result<FeedPage> {
        self.get_json(&self.endpoint("app.bsky.feed.getTimeline"), token)
            .await
    }

    async fn get_feed(&self, feed_uri: &str, token: &str) -> Result<FeedPage> {
        self.get_json(&self.feed_url(feed_uri), token).await
    }

    async fn get_saved_feeds(&self, token: &str) -> Result<Vec<FeedGenerator>> {
        let prefs: PreferencesResponse = self
            .get_json(&self.endpoint("app.bsky.actor.getPreferences"), token)
            .await?;

        let uris = saved_feed_uris(&prefs.preferences);
        if uris.is_empty() {
            return Ok(vec![]);
        }

        let data: FeedGeneratorsResponse =
            self.get_json(&self.generators_url(&uris), token).await?;
        debug!(count = data.feeds.len(), "Fetched saved feed generators");
        Ok(data.feeds)
    }

    async fn get_actor_feeds(&self, actor: &str, token: &str) -> Result<Vec<FeedGenerator>> {
        let data: FeedGeneratorsResponse =
            self.get_json(&self.actor_feeds_url(actor), token).await?;
        Ok(data.feeds)
    }
}
