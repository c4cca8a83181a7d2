//! Bluesky session core
//!
//! Keeps one authenticated session per local user, persisted to a JSON
//! file, and resolves loosely typed custom-feed references (display names,
//! URI fragments, `handle/collection/rkey` paths) into canonical `at://`
//! feed URIs. All network access goes through [`bsky_xrpc::SocialClient`].

pub mod config;
pub mod content;
pub mod error;
pub mod feeds;
pub mod identity;
pub mod registry;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use content::{ContentService, FeedItem};
pub use error::{BskyError, Result};
pub use feeds::{CanonicalFeedUri, FeedCache, FeedListing, FeedResolver};
pub use identity::{Language, Session, UserIdentity};
pub use registry::SessionRegistry;
pub use service::BskyService;
pub use store::{CredentialStore, StoredCredentials};
