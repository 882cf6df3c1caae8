//! Error types for the server boundary.

use thiserror::Error;

/// Result type for server boundary operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors crossing the wire to the hydroponics server.
///
/// Every variant here is a transient delivery failure from the control
/// loop's point of view; the emitter logs and drops, it never propagates.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sink rejected {path}: HTTP {status}")]
    Status { path: &'static str, status: u16 },

    #[error("Invalid API base address: {what}")]
    Config { what: &'static str },
}
