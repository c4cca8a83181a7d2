use std::fmt;
use std::sync::Arc;

use bsky_xrpc::{SocialClient, XrpcError};
use tracing::{debug, warn};

use crate::types::Did;

#[derive(Debug)]
pub enum ResolutionError {
    /// The profile lookup itself failed
    Lookup { actor: String, source: XrpcError },
    /// The profile came back without a usable DID
    MissingDid { actor: String },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionError::Lookup { actor, source } => {
                write!(f, "could not look up {}: {}", actor, source)
            }
            ResolutionError::MissingDid { actor } => write!(f, "no DID found for {}", actor),
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolutionError::Lookup { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Resolves handles to DIDs through authenticated profile lookups
pub struct IdentityResolver {
    client: Arc<dyn SocialClient>,
}

impl IdentityResolver {
    pub fn new(client: Arc<dyn SocialClient>) -> Self {
        Self { client }
    }

    /// Resolve a handle (or DID) to the actor's DID with one `getProfile` call
    pub async fn resolve_did(&self, actor: &str, token: &str) -> Result<Did, ResolutionError> {
        let profile = self
            .client
            .get_profile(actor, token)
            .await
            .map_err(|source| {
                warn!(actor, error = %source, "Profile lookup failed");
                ResolutionError::Lookup {
                    actor: actor.to_string(),
                    source,
                }
            })?;

        let did = Did::parse(&profile.did).ok_or_else(|| ResolutionError::MissingDid {
            actor: actor.to_string(),
        })?;

        debug!(actor, %did, "Resolved DID");
        Ok(did)
    }
}
