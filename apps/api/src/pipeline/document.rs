//! Uploaded document and filename sanitization.

use bytes::Bytes;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::pipeline::errors::PipelineError;

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "AUX", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3", "PRN", "NUL",
];

/// An uploaded resume. Identity is the sanitized filename.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub bytes: Bytes,
}

impl Document {
    /// Validates an upload and sanitizes its filename.
    ///
    /// A missing or blank filename, or an empty body, is `MissingInput`.
    pub fn from_upload(filename: Option<&str>, bytes: Bytes) -> Result<Self, PipelineError> {
        let raw = filename
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .ok_or(PipelineError::MissingInput)?;
        if bytes.is_empty() {
            return Err(PipelineError::MissingInput);
        }

        let mut filename = secure_filename(raw);
        if filename.is_empty() {
            filename = format!("{}.pdf", Uuid::new_v4());
        }

        Ok(Self { filename, bytes })
    }
}

/// Reduces a client-supplied filename to a flat, ASCII-only name safe to use
/// as a storage path component.
///
/// Compatibility decomposition runs first so accented letters fold to their
/// ASCII base instead of disappearing.
pub fn secure_filename(raw: &str) -> String {
    let flattened: String = raw
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_').to_string();

    let stem = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if !trimmed.is_empty() && WINDOWS_DEVICE_NAMES.contains(&stem.as_str()) {
        return format!("_{trimmed}");
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(secure_filename("My-Resume.pdf"), "My-Resume.pdf");
        assert_eq!(secure_filename("resume_001.pdf"), "resume_001.pdf");
    }

    #[test]
    fn test_spaces_become_underscores() {
        assert_eq!(secure_filename("My cool resume.pdf"), "My_cool_resume.pdf");
    }

    #[test]
    fn test_path_traversal_flattened() {
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\cv.pdf"), "C_Users_me_cv.pdf");
    }

    #[test]
    fn test_accents_fold_to_ascii() {
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("Ünïcödé CV.pdf"), "Unicode_CV.pdf");
    }

    #[test]
    fn test_non_decomposable_dropped() {
        assert_eq!(secure_filename("简历 cv.pdf"), "cv.pdf");
        assert_eq!(secure_filename("ﬁle.pdf"), "file.pdf");
    }

    #[test]
    fn test_windows_device_name_prefixed() {
        assert_eq!(secure_filename("con.pdf"), "_con.pdf");
        assert_eq!(secure_filename("NUL"), "_NUL");
    }

    #[test]
    fn test_only_punctuation_is_empty() {
        assert_eq!(secure_filename("../.."), "");
    }

    #[test]
    fn test_from_upload_rejects_missing_name() {
        let err = Document::from_upload(None, Bytes::from_static(b"%PDF")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
        let err = Document::from_upload(Some("  "), Bytes::from_static(b"%PDF")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
    }

    #[test]
    fn test_from_upload_rejects_empty_body() {
        let err = Document::from_upload(Some("cv.pdf"), Bytes::new()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
    }

    #[test]
    fn test_from_upload_generates_name_when_sanitized_away() {
        let doc = Document::from_upload(Some("../.."), Bytes::from_static(b"%PDF")).unwrap();
        assert!(doc.filename.ends_with(".pdf"));
        assert_eq!(doc.filename.len(), 36 + 4);
    }
}
