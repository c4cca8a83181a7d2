//! Bluesky XRPC client
//!
//! The handful of `com.atproto` / `app.bsky` calls needed to log in, post,
//! read timelines and custom feeds, behind the [`SocialClient`] trait.

pub mod client;
pub mod error;
pub mod social;
pub mod types;

pub use client::XrpcClient;
pub use error::{Result, XrpcError};
pub use social::SocialClient;
pub use types::{
    CreateRecordRequest, FeedGenerator, FeedPage, FeedViewPost, PostAuthor, PostRecord, PostView,
    Profile, RecordRef, SessionTokens, POST_COLLECTION,
};
