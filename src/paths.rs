//! Derived storage-path convention shared by the upload and poll sides.
//!
//! The backend writes OCR output for `uploads/<user>/<name>.pdf` to
//! `processed/<user>/<name>_ocr_output/output-1-to-100.json`. The poll
//! side locates results purely from this formula — there is no
//! side-channel notification — so both sides use these two functions
//! and nothing else.

/// Remote path of the raw upload for a user's file.
pub fn upload_path(user_id: &str, file_name: &str) -> String {
    format!("uploads/{user_id}/{file_name}")
}

/// Output object holding the OCR result for an uploaded file.
///
/// Strips exactly one leading `uploads/` and one trailing `.pdf`;
/// occurrences of either elsewhere in the path are preserved.
pub fn ocr_output_path(upload_path: &str) -> String {
    let stem = upload_path.strip_prefix("uploads/").unwrap_or(upload_path);
    let stem = stem.strip_suffix(".pdf").unwrap_or(stem);
    format!("processed/{stem}_ocr_output/output-1-to-100.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_path_layout() {
        assert_eq!(
            upload_path("guest", "report.pdf"),
            "uploads/guest/report.pdf"
        );
    }

    #[test]
    fn round_trip_for_plain_name() {
        let up = upload_path("guest", "report.pdf");
        assert_eq!(
            ocr_output_path(&up),
            "processed/guest/report_ocr_output/output-1-to-100.json"
        );
    }

    #[test]
    fn file_named_uploads_is_not_mangled() {
        let up = upload_path("u1", "uploads.pdf");
        assert_eq!(
            ocr_output_path(&up),
            "processed/u1/uploads_ocr_output/output-1-to-100.json"
        );
    }

    #[test]
    fn inner_pdf_substring_survives() {
        let up = upload_path("u1", "my.pdf.notes.pdf");
        assert_eq!(
            ocr_output_path(&up),
            "processed/u1/my.pdf.notes_ocr_output/output-1-to-100.json"
        );
    }

    #[test]
    fn inner_uploads_substring_survives() {
        let up = upload_path("u1", "old-uploads-index.pdf");
        assert_eq!(
            ocr_output_path(&up),
            "processed/u1/old-uploads-index_ocr_output/output-1-to-100.json"
        );
    }

    #[test]
    fn name_without_extension_keeps_stem() {
        let up = upload_path("u1", "manuscript");
        assert_eq!(
            ocr_output_path(&up),
            "processed/u1/manuscript_ocr_output/output-1-to-100.json"
        );
    }

    #[test]
    fn foreign_prefix_is_left_alone() {
        // Paths outside the uploads/ convention pass through unprefixed.
        assert_eq!(
            ocr_output_path("archive/u1/report.pdf"),
            "processed/archive/u1/report_ocr_output/output-1-to-100.json"
        );
    }
}
