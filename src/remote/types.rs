use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::RemoteError;

/// The five remote operations the shelf depends on.
///
/// One request/response per call; nothing behind this seam retries.
/// Implementations: [`super::HttpRemoteServices`] for the real
/// backend, [`super::MockRemoteServices`] for tests.
#[async_trait]
pub trait RemoteServices: Send + Sync {
    /// Ask the backend for a pre-authorized upload URL.
    async fn request_upload_destination(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteError>;

    /// Transfer the raw file bytes to a previously issued destination.
    async fn transfer_file(
        &self,
        destination: &str,
        source_location: &str,
        content_type: &str,
    ) -> Result<(), RemoteError>;

    /// Kick off OCR for an uploaded object.
    ///
    /// Success means "accepted", not "completed" — the batch runs
    /// externally and finishes on its own schedule.
    async fn trigger_processing(&self, remote_path: &str) -> Result<(), RemoteError>;

    /// Fetch extracted text for an output object, if it exists yet.
    ///
    /// `Ok(None)` means the batch has not finished — a valid outcome,
    /// distinct from any `Err`.
    async fn poll_extracted_text(
        &self,
        output_path: &str,
    ) -> Result<Option<String>, RemoteError>;

    /// One-shot summary of extracted text.
    async fn summarize(&self, text: &str) -> Result<String, RemoteError>;

    /// Key concepts with short explanations, decoded from the model's
    /// JSON answer.
    async fn extract_concepts(&self, text: &str) -> Result<Vec<Concept>, RemoteError>;
}

/// A key concept extracted from a book's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub concept: String,
    pub explanation: String,
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "• {}: {}", self.concept, self.explanation)
    }
}
