//! Error types for session and feed operations

use std::fmt;

use atproto_identity::ResolutionError;
use bsky_xrpc::XrpcError;

#[derive(Debug)]
pub enum BskyError {
    /// Login rejected, or the login call could not be made
    Auth(XrpcError),
    /// The operation needs a session and there is none
    NotAuthenticated,
    /// A remote call failed
    Transport(XrpcError),
    /// Handle-to-DID lookup failed
    Resolution(ResolutionError),
    /// No saved or authored feed matched, and the reference could not be
    /// rewritten into an `at://` URI. `cause` is set when the rewrite's
    /// handle lookup failed.
    FeedResolution {
        reference: String,
        cause: Option<ResolutionError>,
    },
    InvalidInput(String),
}

impl fmt::Display for BskyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BskyError::Auth(err) => write!(f, "login failed: {}", err),
            BskyError::NotAuthenticated => write!(f, "not logged in"),
            BskyError::Transport(err) => write!(f, "request failed: {}", err),
            BskyError::Resolution(err) => write!(f, "identity resolution failed: {}", err),
            BskyError::FeedResolution {
                reference,
                cause: Some(cause),
            } => write!(f, "no feed found for '{}': {}", reference, cause),
            BskyError::FeedResolution { reference, .. } => {
                write!(f, "no feed found for '{}'", reference)
            }
            BskyError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
        }
    }
}

impl std::error::Error for BskyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BskyError::Auth(err) | BskyError::Transport(err) => Some(err),
            BskyError::Resolution(err) => Some(err),
            BskyError::FeedResolution {
                cause: Some(cause), ..
            } => Some(cause),
            _ => None,
        }
    }
}

impl From<XrpcError> for BskyError {
    fn from(err: XrpcError) -> Self {
        BskyError::Transport(err)
    }
}

impl From<ResolutionError> for BskyError {
    fn from(err: ResolutionError) -> Self {
        BskyError::Resolution(err)
    }
}

pub type Result<T> = std::result::Result<T, BskyError>;
