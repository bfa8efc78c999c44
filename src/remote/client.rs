//! HTTP implementation of the remote facade.
//!
//! Callable functions speak a small JSON envelope: POST
//! `{base}/<name>` with `{"data": ...}`, answered by `{"result": ...}`
//! on success or `{"error": {"status", "message"}}` on failure.
//! Uploads go straight to the signed URL with a PUT; OCR output comes
//! straight from the storage download endpoint with a GET.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;

use super::parse;
use super::types::{Concept, RemoteServices};
use super::RemoteError;

/// Real backend client over reqwest.
///
/// Holds no mutable state beyond the cached client handle. No explicit
/// request deadline is set; the transport defaults apply.
pub struct HttpRemoteServices {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl HttpRemoteServices {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// POST a callable function and decode its `result` payload.
    async fn call_function<T: DeserializeOwned>(
        &self,
        name: &str,
        data: serde_json::Value,
    ) -> Result<T, RemoteError> {
        let url = format!(
            "{}/{}",
            self.config.functions_base_url.trim_end_matches('/'),
            name
        );

        let mut request = self.client.post(&url).json(&CallableRequest { data });
        if let Some(token) = self.config.auth.bearer_token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(map_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;

        if !status.is_success() {
            tracing::debug!(function = name, status = status.as_u16(), "Callable failed");
            return Err(decode_callable_error(status.as_u16(), &body));
        }

        let envelope: CallableResponse<T> =
            serde_json::from_str(&body).map_err(|e| RemoteError::MalformedResponse {
                message: format!("Callable '{name}' answer did not decode: {e}"),
                raw: body,
            })?;
        Ok(envelope.result)
    }
}

#[derive(Serialize)]
struct CallableRequest {
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct CallableResponse<T> {
    result: T,
}

#[derive(Deserialize)]
struct CallableErrorEnvelope {
    error: CallableError,
}

#[derive(Deserialize)]
struct CallableError {
    status: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct UploadUrlResult {
    url: String,
}

#[derive(Deserialize)]
struct SummaryResult {
    summary: String,
}

#[derive(Deserialize)]
struct ConceptsResult {
    /// The model's raw answer; decoding happens client-side.
    concepts: String,
}

/// Map a callable failure body onto the error taxonomy.
fn decode_callable_error(status: u16, body: &str) -> RemoteError {
    if let Ok(envelope) = serde_json::from_str::<CallableErrorEnvelope>(body) {
        let message = envelope.error.message.unwrap_or_default();
        match envelope.error.status.as_deref() {
            Some("INVALID_ARGUMENT") => return RemoteError::InvalidArgument(message),
            Some("UNAUTHENTICATED") => return RemoteError::Unauthenticated,
            _ => {}
        }
    }
    RemoteError::Endpoint {
        status,
        body: body.to_string(),
    }
}

fn map_transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

#[async_trait]
impl RemoteServices for HttpRemoteServices {
    async fn request_upload_destination(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        if file_name.is_empty() || content_type.is_empty() {
            return Err(RemoteError::InvalidArgument(
                "fileName and contentType are required".into(),
            ));
        }

        let result: UploadUrlResult = self
            .call_function(
                "generateUploadUrl",
                serde_json::json!({
                    "fileName": file_name,
                    "contentType": content_type,
                }),
            )
            .await?;
        Ok(result.url)
    }

    async fn transfer_file(
        &self,
        destination: &str,
        source_location: &str,
        content_type: &str,
    ) -> Result<(), RemoteError> {
        let bytes = tokio::fs::read(source_location).await.map_err(|e| {
            RemoteError::InvalidArgument(format!("Cannot read '{source_location}': {e}"))
        })?;

        let response = self
            .client
            .put(destination)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn trigger_processing(&self, remote_path: &str) -> Result<(), RemoteError> {
        let _: Option<serde_json::Value> = self
            .call_function(
                "processPdf",
                serde_json::json!({ "gcsPath": remote_path }),
            )
            .await?;
        Ok(())
    }

    async fn poll_extracted_text(
        &self,
        output_path: &str,
    ) -> Result<Option<String>, RemoteError> {
        let url = format!(
            "{}/{}",
            self.config.storage_base_url.trim_end_matches('/'),
            output_path
        );

        let response = self.client.get(&url).send().await.map_err(map_transport)?;
        let status = response.status();

        // Output object absent: the batch has not finished. Not an error.
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(map_transport)?;
        parse::parse_ocr_output(&body).map(Some)
    }

    async fn summarize(&self, text: &str) -> Result<String, RemoteError> {
        if text.trim().is_empty() {
            return Err(RemoteError::InvalidArgument("text is required".into()));
        }

        let result: SummaryResult = self
            .call_function("getAiSummary", serde_json::json!({ "text": text }))
            .await?;
        Ok(result.summary)
    }

    async fn extract_concepts(&self, text: &str) -> Result<Vec<Concept>, RemoteError> {
        if text.trim().is_empty() {
            return Err(RemoteError::InvalidArgument("text is required".into()));
        }

        let result: ConceptsResult = self
            .call_function("getAiConcepts", serde_json::json!({ "text": text }))
            .await?;
        parse::parse_concepts(&result.concepts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthPolicy;

    fn test_config() -> RemoteConfig {
        RemoteConfig::new("https://fn.example/", "https://st.example/")
    }

    #[test]
    fn client_constructs() {
        let client = HttpRemoteServices::new(test_config()).unwrap();
        assert_eq!(client.config.auth.user_id(), "guest");
    }

    #[test]
    fn client_constructs_with_required_auth() {
        let config = test_config().with_auth(AuthPolicy::Required {
            user_id: "u-7".into(),
            id_token: "tok".into(),
        });
        let client = HttpRemoteServices::new(config).unwrap();
        assert_eq!(client.config.auth.bearer_token(), Some("tok"));
    }

    #[test]
    fn invalid_argument_status_maps() {
        let body = r#"{"error": {"status": "INVALID_ARGUMENT", "message": "missing fileName"}}"#;
        match decode_callable_error(400, body) {
            RemoteError::InvalidArgument(msg) => assert_eq!(msg, "missing fileName"),
            other => panic!("Expected InvalidArgument, got: {other}"),
        }
    }

    #[test]
    fn unauthenticated_status_maps() {
        let body = r#"{"error": {"status": "UNAUTHENTICATED", "message": "sign in"}}"#;
        assert!(matches!(
            decode_callable_error(401, body),
            RemoteError::Unauthenticated
        ));
    }

    #[test]
    fn unknown_error_status_keeps_status_and_body() {
        let body = r#"{"error": {"status": "INTERNAL", "message": "boom"}}"#;
        match decode_callable_error(500, body) {
            RemoteError::Endpoint { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("Expected Endpoint, got: {other}"),
        }
    }

    #[test]
    fn non_json_error_body_keeps_status_and_body() {
        match decode_callable_error(502, "<html>bad gateway</html>") {
            RemoteError::Endpoint { status, body } => {
                assert_eq!(status, 502);
                assert!(body.contains("bad gateway"));
            }
            other => panic!("Expected Endpoint, got: {other}"),
        }
    }

    #[test]
    fn callable_envelope_decodes() {
        let envelope: CallableResponse<UploadUrlResult> =
            serde_json::from_str(r#"{"result": {"url": "https://signed.example/u"}}"#).unwrap();
        assert_eq!(envelope.result.url, "https://signed.example/u");
    }

    #[test]
    fn callable_null_result_decodes_as_none() {
        let envelope: CallableResponse<Option<serde_json::Value>> =
            serde_json::from_str(r#"{"result": null}"#).unwrap();
        assert!(envelope.result.is_none());
    }
}
