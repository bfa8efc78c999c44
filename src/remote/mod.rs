//! Remote capability facade.
//!
//! One uniform async interface over the three backing services: the
//! signed-URL object store, the OCR batch processor, and the
//! generative-text backend. Each operation is a single request and
//! response — no retry, no backoff, no local state beyond the client
//! handle.

pub mod client;
pub mod mock;
pub mod parse;
pub mod types;

pub use client::HttpRemoteServices;
pub use mock::MockRemoteServices;
pub use types::{Concept, RemoteServices};

/// Failures surfaced by the remote facade.
///
/// "Not ready yet" is not an error: `poll_extracted_text` reports it
/// as `Ok(None)` and the tracker treats it as a try-later outcome.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Caller/input error; surfaced to the UI immediately.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Rejected before any work began.
    #[error("Not authenticated with the backend")]
    Unauthenticated,

    /// Transport-level failure (connect, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status.
    #[error("Endpoint error ({status}): {body}")]
    Endpoint { status: u16, body: String },

    /// The endpoint answered 2xx but the body did not decode.
    /// The raw response is kept for diagnosis.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, raw: String },
}
