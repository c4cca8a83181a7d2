//! AT Protocol Identity
//!
//! Handle qualification and handle-to-DID resolution. Posting and feed
//! path rewriting need the durable DID rather than the display handle.

mod resolver;
mod types;

pub use resolver::{IdentityResolver, ResolutionError};
pub use types::{Did, Handle};
