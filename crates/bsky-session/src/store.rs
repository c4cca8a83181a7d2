//! JSON file persistence for per-user credentials

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

const TOKENS: &str = "tokens";
const HANDLES: &str = "handles";
const LANGUAGES: &str = "languages";

/// The on-disk document: three parallel maps keyed by user identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoredCredentials {
    pub tokens: BTreeMap<String, String>,
    pub handles: BTreeMap<String, String>,
    pub languages: BTreeMap<String, String>,
}

/// Reads and writes [`StoredCredentials`] at a fixed path.
///
/// Writes go straight to the target file; a crash mid-write can leave a
/// truncated document, which the next load treats as empty.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. Never fails: a missing or unreadable file yields an
    /// empty store, and malformed entries are skipped one by one.
    pub async fn load(&self) -> StoredCredentials {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No credential store yet");
                return StoredCredentials::default();
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read credential store");
                return StoredCredentials::default();
            }
        };

        let stored = parse_document(&content);
        info!(
            path = ?self.path,
            tokens = stored.tokens.len(),
            handles = stored.handles.len(),
            languages = stored.languages.len(),
            "Loaded credential store"
        );
        stored
    }

    /// Overwrite the store with `credentials`, creating the directory if needed
    pub async fn save(&self, credentials: &StoredCredentials) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(credentials).map_err(io::Error::other)?;
        fs::write(&self.path, json).await?;
        debug!(path = ?self.path, "Saved credential store");
        Ok(())
    }
}

fn parse_document(content: &str) -> StoredCredentials {
    let doc: Value = match serde_json::from_str(content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Credential store is not valid JSON, starting empty");
            return StoredCredentials::default();
        }
    };

    if !doc.is_object() {
        warn!("Credential store is not a JSON object, starting empty");
        return StoredCredentials::default();
    }

    StoredCredentials {
        tokens: parse_section(&doc, TOKENS),
        handles: parse_section(&doc, HANDLES),
        languages: parse_section(&doc, LANGUAGES),
    }
}

/// One section as identity -> string; entries that are not strings are skipped
fn parse_section(doc: &Value, name: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    let section = match doc.get(name) {
        None | Some(Value::Null) => return entries,
        Some(Value::Object(section)) => section,
        Some(_) => {
            warn!(section = name, "Credential store section is not an object, ignoring");
            return entries;
        }
    };

    for (identity, value) in section {
        match value.as_str() {
            Some(v) if !identity.trim().is_empty() => {
                entries.insert(identity.clone(), v.to_string());
            }
            _ => warn!(section = name, identity = %identity, "Skipping malformed entry"),
        }
    }

    entries
}
