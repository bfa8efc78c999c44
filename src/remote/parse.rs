//! Decoding of remote response bodies: OCR batch output and the
//! generative model's concept list.

use serde::Deserialize;

use super::types::Concept;
use super::RemoteError;

/// OCR batch output: `{"responses": [{"fullTextAnnotation": {"text"}}]}`.
#[derive(Debug, Deserialize)]
struct OcrOutput {
    #[serde(default)]
    responses: Vec<OcrResponse>,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(rename = "fullTextAnnotation")]
    full_text_annotation: Option<FullTextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct FullTextAnnotation {
    text: String,
}

/// Decode OCR batch output and join page-range texts with a blank line.
///
/// A response with no annotation (blank page range) contributes an
/// empty string, matching the processor's output shape.
pub fn parse_ocr_output(raw: &str) -> Result<String, RemoteError> {
    let output: OcrOutput =
        serde_json::from_str(raw).map_err(|e| RemoteError::MalformedResponse {
            message: format!("OCR output did not decode: {e}"),
            raw: raw.to_string(),
        })?;

    Ok(output
        .responses
        .iter()
        .map(|r| {
            r.full_text_annotation
                .as_ref()
                .map(|a| a.text.as_str())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Strip one optional Markdown code fence from a model answer.
///
/// Handles both ```json and bare ``` fences. An unclosed fence leaves
/// the answer untouched; the decode step reports it instead.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") up to the end of the fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    match rest.trim_end().strip_suffix("```") {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Decode a concept list from the model's raw answer.
///
/// The model wraps its JSON in a code fence more often than not; one
/// fence is stripped before decoding. Decode failure keeps the raw
/// answer attached for diagnosis.
pub fn parse_concepts(raw: &str) -> Result<Vec<Concept>, RemoteError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| RemoteError::MalformedResponse {
        message: format!("Concept list did not decode: {e}"),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_output_joins_with_blank_line() {
        let raw = r#"{
            "responses": [
                {"fullTextAnnotation": {"text": "Page one."}},
                {"fullTextAnnotation": {"text": "Page two."}}
            ]
        }"#;
        assert_eq!(parse_ocr_output(raw).unwrap(), "Page one.\n\nPage two.");
    }

    #[test]
    fn ocr_output_single_response() {
        let raw = r#"{"responses": [{"fullTextAnnotation": {"text": "Hello world"}}]}"#;
        assert_eq!(parse_ocr_output(raw).unwrap(), "Hello world");
    }

    #[test]
    fn ocr_response_without_annotation_is_empty() {
        let raw = r#"{
            "responses": [
                {"fullTextAnnotation": {"text": "Cover"}},
                {},
                {"fullTextAnnotation": {"text": "Index"}}
            ]
        }"#;
        assert_eq!(parse_ocr_output(raw).unwrap(), "Cover\n\n\n\nIndex");
    }

    #[test]
    fn ocr_output_with_no_responses() {
        assert_eq!(parse_ocr_output(r#"{"responses": []}"#).unwrap(), "");
        assert_eq!(parse_ocr_output("{}").unwrap(), "");
    }

    #[test]
    fn ocr_garbage_is_malformed() {
        let err = parse_ocr_output("not json at all").unwrap_err();
        match err {
            RemoteError::MalformedResponse { raw, .. } => {
                assert_eq!(raw, "not json at all");
            }
            other => panic!("Expected MalformedResponse, got: {other}"),
        }
    }

    #[test]
    fn fence_with_info_string_is_stripped() {
        let raw = "```json\n[{\"concept\": \"A\", \"explanation\": \"a\"}]\n```";
        assert_eq!(
            strip_code_fence(raw),
            "[{\"concept\": \"A\", \"explanation\": \"a\"}]"
        );
    }

    #[test]
    fn bare_fence_is_stripped() {
        let raw = "```\n[1, 2]\n```";
        assert_eq!(strip_code_fence(raw), "[1, 2]");
    }

    #[test]
    fn unfenced_answer_passes_through() {
        assert_eq!(strip_code_fence("  [1, 2] "), "[1, 2]");
    }

    #[test]
    fn unclosed_fence_is_left_untouched() {
        let raw = "```json\n[1, 2]";
        assert_eq!(strip_code_fence(raw), raw);
    }

    #[test]
    fn fenced_concepts_decode() {
        let raw = "```json\n[\
            {\"concept\": \"Mocking\", \"explanation\": \"Stand-ins for tests\"},\
            {\"concept\": \"OCR\", \"explanation\": \"Text from scans\"}\
        ]\n```";
        let concepts = parse_concepts(raw).unwrap();
        assert_eq!(concepts.len(), 2);
        assert_eq!(concepts[0].concept, "Mocking");
        assert_eq!(concepts[1].explanation, "Text from scans");
    }

    #[test]
    fn unfenced_concepts_decode() {
        let raw = r#"[{"concept": "A", "explanation": "a"}]"#;
        assert_eq!(parse_concepts(raw).unwrap().len(), 1);
    }

    #[test]
    fn malformed_concepts_keep_raw_answer() {
        let raw = "```json\nthis is not a list\n```";
        let err = parse_concepts(raw).unwrap_err();
        match err {
            RemoteError::MalformedResponse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("Expected MalformedResponse, got: {other}"),
        }
    }
}
