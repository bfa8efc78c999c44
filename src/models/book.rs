use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::BookStatus;
use super::ModelError;

/// A tracked document on the shelf.
///
/// Mutated in place by the lifecycle tracker as it moves through
/// new → uploading → processing → ready/failed. The status and its
/// companion fields are kept paired: `ready` always carries the
/// extracted text, `failed` always carries an error message, and every
/// status past `new` carries the remote upload path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Unique id, derived from the creation instant and file name.
    pub id: String,
    /// Original file name as selected by the user.
    pub display_name: String,
    /// Opaque local-resource identifier of the original file.
    pub source_location: String,
    /// Remote storage path of the raw upload; set once upload begins.
    pub remote_upload_path: Option<String>,
    pub status: BookStatus,
    /// OCR text, populated only when `status` is `ready`.
    pub extracted_text: Option<String>,
    /// Failure message, populated only when `status` is `failed`.
    pub error_message: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Book {
    /// Construct a freshly selected book with status `new`.
    pub fn new(source_location: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let added_at = Utc::now();
        Self {
            id: format!("{}-{}", added_at.timestamp_millis(), display_name),
            display_name,
            source_location: source_location.into(),
            remote_upload_path: None,
            status: BookStatus::New,
            extracted_text: None,
            error_message: None,
            added_at,
        }
    }

    /// Check the status/field pairing invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        let violation = |rule| ModelError::InvariantViolation {
            id: self.id.clone(),
            rule,
        };

        if (self.status == BookStatus::Ready) != self.extracted_text.is_some() {
            return Err(violation("ready-text"));
        }
        if (self.status == BookStatus::Failed) != self.error_message.is_some() {
            return Err(violation("failed-message"));
        }
        if self.status != BookStatus::New && self.remote_upload_path.is_none() {
            return Err(violation("upload-path"));
        }
        Ok(())
    }
}
