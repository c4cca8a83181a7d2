//! In-memory authority over active sessions, written through to a
//! [`CredentialStore`] on every change

use std::collections::HashMap;
use std::sync::Arc;

use atproto_identity::Handle;
use bsky_xrpc::{SocialClient, XrpcError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{BskyError, Result};
use crate::identity::{Language, Session, UserIdentity};
use crate::store::{CredentialStore, StoredCredentials};

struct Credentials {
    token: String,
    handle: String,
}

#[derive(Default)]
struct RegistryState {
    sessions: HashMap<UserIdentity, Credentials>,
    /// Kept apart from `sessions`: a preference outlives logout
    languages: HashMap<UserIdentity, Language>,
}

impl RegistryState {
    /// Rebuild state from the stored document, dropping entries that would
    /// break the registry's invariants
    fn from_stored(stored: StoredCredentials) -> Self {
        let mut state = RegistryState::default();
        let StoredCredentials {
            tokens,
            mut handles,
            languages,
        } = stored;

        for (key, token) in tokens {
            let Some(identity) = UserIdentity::new(key.as_str()) else {
                continue;
            };
            if token.is_empty() {
                warn!(identity = %identity, "Skipping stored session with empty token");
                continue;
            }
            let Some(handle) = handles.remove(&key).filter(|h| !h.is_empty()) else {
                warn!(identity = %identity, "Skipping stored session without handle");
                continue;
            };
            state
                .sessions
                .insert(identity, Credentials { token, handle });
        }

        for (key, code) in languages {
            let Some(identity) = UserIdentity::new(key.as_str()) else {
                continue;
            };
            match code.parse::<Language>() {
                Ok(language) => {
                    state.languages.insert(identity, language);
                }
                Err(e) => warn!(identity = %identity, error = %e, "Skipping stored language"),
            }
        }

        state
    }

    fn to_stored(&self) -> StoredCredentials {
        let mut stored = StoredCredentials::default();
        for (identity, creds) in &self.sessions {
            stored
                .tokens
                .insert(identity.to_string(), creds.token.clone());
            stored
                .handles
                .insert(identity.to_string(), creds.handle.clone());
        }
        for (identity, language) in &self.languages {
            stored
                .languages
                .insert(identity.to_string(), language.code().to_string());
        }
        stored
    }

    fn session(&self, identity: &UserIdentity, default_language: Language) -> Option<Session> {
        let creds = self.sessions.get(identity)?;
        Some(Session {
            token: creds.token.clone(),
            handle: creds.handle.clone(),
            language: self
                .languages
                .get(identity)
                .copied()
                .unwrap_or(default_language),
        })
    }
}

/// Owns every user's session. At most one session per identity.
pub struct SessionRegistry {
    client: Arc<dyn SocialClient>,
    store: CredentialStore,
    default_domain: String,
    default_language: Language,
    state: RwLock<RegistryState>,
}

impl SessionRegistry {
    /// Create a registry and load whatever the store already holds
    pub async fn open(client: Arc<dyn SocialClient>, store: CredentialStore, config: &Config) -> Self {
        let state = RegistryState::from_stored(store.load().await);
        info!(sessions = state.sessions.len(), "Session registry ready");

        Self {
            client,
            store,
            default_domain: config.default_domain.clone(),
            default_language: config.default_language,
            state: RwLock::new(state),
        }
    }

    /// Domain appended to bare names
    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    /// Log in with a handle (or bare name) and app password.
    ///
    /// A bare name is qualified with the default domain before it is sent
    /// and stored. State is untouched unless the server hands back a token.
    pub async fn login(
        &self,
        identity: &UserIdentity,
        handle_or_name: &str,
        secret: &str,
    ) -> Result<Session> {
        let handle = Handle::qualify(handle_or_name, &self.default_domain);

        let tokens = self
            .client
            .create_session(handle.as_str(), secret)
            .await
            .map_err(|e| {
                warn!(identity = %identity, handle = %handle, error = %e, "Login failed");
                BskyError::Auth(e)
            })?;

        if tokens.access_jwt.is_empty() {
            return Err(BskyError::Auth(XrpcError::Parse(
                "createSession returned an empty access token".to_string(),
            )));
        }

        let mut state = self.state.write().await;
        state.sessions.insert(
            identity.clone(),
            Credentials {
                token: tokens.access_jwt,
                handle: handle.to_string(),
            },
        );
        self.persist(&state).await;

        info!(identity = %identity, handle = %handle, "Logged in");
        state
            .session(identity, self.default_language)
            .ok_or(BskyError::NotAuthenticated)
    }

    /// Drop the identity's session. Returns whether there was one.
    pub async fn logout(&self, identity: &UserIdentity) -> bool {
        let mut state = self.state.write().await;
        if state.sessions.remove(identity).is_none() {
            debug!(identity = %identity, "Logout without session");
            return false;
        }
        self.persist(&state).await;

        info!(identity = %identity, "Logged out");
        true
    }

    pub async fn is_authenticated(&self, identity: &UserIdentity) -> bool {
        self.state.read().await.sessions.contains_key(identity)
    }

    pub async fn current_token(&self, identity: &UserIdentity) -> Result<String> {
        self.state
            .read()
            .await
            .sessions
            .get(identity)
            .map(|c| c.token.clone())
            .ok_or(BskyError::NotAuthenticated)
    }

    pub async fn session(&self, identity: &UserIdentity) -> Option<Session> {
        self.state
            .read()
            .await
            .session(identity, self.default_language)
    }

    /// Like [`session`](Self::session) but fails with `NotAuthenticated`
    pub async fn require_session(&self, identity: &UserIdentity) -> Result<Session> {
        self.session(identity)
            .await
            .ok_or(BskyError::NotAuthenticated)
    }

    /// The identity's language preference, or the configured default
    pub async fn language(&self, identity: &UserIdentity) -> Language {
        self.state
            .read()
            .await
            .languages
            .get(identity)
            .copied()
            .unwrap_or(self.default_language)
    }

    /// Store a language preference. Works whether or not the identity is
    /// logged in; returns the updated session when there is one.
    pub async fn set_language(&self, identity: &UserIdentity, language: Language) -> Option<Session> {
        let mut state = self.state.write().await;
        state.languages.insert(identity.clone(), language);
        self.persist(&state).await;

        debug!(identity = %identity, %language, "Language preference set");
        state.session(identity, self.default_language)
    }

    /// Current state in its persisted shape
    pub async fn snapshot(&self) -> StoredCredentials {
        self.state.read().await.to_stored()
    }

    /// Write the current state out; call on shutdown
    pub async fn flush(&self) {
        let state = self.state.read().await;
        self.persist(&state).await;
    }

    async fn persist(&self, state: &RegistryState) {
        if let Err(e) = self.store.save(&state.to_stored()).await {
            warn!(path = ?self.store.path(), error = %e, "Failed to save credential store");
        }
    }
}
