//! Error types for the XRPC client

use std::fmt;

#[derive(Debug)]
pub enum XrpcError {
    Http(Box<reqwest::Error>),
    /// The server answered with a non-success status. `body` is the raw
    /// error document so callers can show what the server said.
    Status {
        status: u16,
        body: String,
    },
    Parse(String),
}

impl XrpcError {
    /// HTTP status of a rejected call, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            XrpcError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for XrpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrpcError::Http(err) => write!(f, "HTTP error: {}", err),
            XrpcError::Status { status, body } if body.is_empty() => {
                write!(f, "server returned status {}", status)
            }
            XrpcError::Status { status, body } => {
                write!(f, "server returned status {}: {}", status, body)
            }
            XrpcError::Parse(msg) => write!(f, "response parse error: {}", msg),
        }
    }
}

impl std::error::Error for XrpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XrpcError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for XrpcError {
    fn from(err: reqwest::Error) -> Self {
        XrpcError::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for XrpcError {
    fn from(err: serde_json::Error) -> Self {
        XrpcError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XrpcError>;
