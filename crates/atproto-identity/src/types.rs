use serde::{Deserialize, Serialize};
use std::fmt;

/// Decentralized identifier of an actor (`did:plc:…`, `did:web:…`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Accepts any non-empty `did:` string; method-specific syntax is the
    /// server's business
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.strip_prefix("did:")?;
        if rest.trim().is_empty() {
            return None;
        }
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Domain-qualified handle such as `alice.bsky.social`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Qualify a user-typed name: a bare name without a `.` gets
    /// `.<default_domain>` appended, anything else is kept as typed.
    pub fn qualify(name: &str, default_domain: &str) -> Self {
        let name = name.trim().trim_start_matches('@');
        if name.contains('.') {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", name, default_domain.trim_start_matches('.')))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
