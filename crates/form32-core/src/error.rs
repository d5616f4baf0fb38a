//! Error types for document resolution.
//!
//! Field-level problems (missing candidates, ambiguous checkbox reads,
//! calibration mismatches) are recovered per field and recorded in the
//! provenance trail — they never abort a document. This module covers the
//! document-level failures that do.

use thiserror::Error;

/// Errors that abort resolution of an entire document.
///
/// Everything recoverable at the field level is reported through
/// [`crate::value::UnresolvedReason`] instead.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The input carried no pages at all.
    #[error("document has no pages")]
    EmptyDocument,

    /// A page raster is missing or has zero area; geometry-based resolution
    /// cannot run against it.
    #[error("page {0} has an empty raster image")]
    EmptyPageImage(usize),

    /// Two pages in the input claim the same page index.
    #[error("duplicate page index {0} in document input")]
    DuplicatePageIndex(usize),

    /// The document does not carry the form's required marker text, so the
    /// schema's geometry and anchors cannot be trusted against it.
    #[error("required form markers missing: {0}")]
    MissingMarkers(String),

    /// A calibration value is outside its meaningful range.
    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    /// Report serialization failed.
    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from an integration edge.
    #[error("resolution error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Type alias for [`Result<T, ResolveError>`].
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ResolveError::EmptyDocument.to_string(),
            "document has no pages"
        );
        assert_eq!(
            ResolveError::EmptyPageImage(3).to_string(),
            "page 3 has an empty raster image"
        );
        assert_eq!(
            ResolveError::MissingMarkers("form number".to_string()).to_string(),
            "required form markers missing: form number"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ bad").unwrap_err();
        let err: ResolveError = json_err.into();
        assert!(matches!(err, ResolveError::Json(_)));
    }

    #[test]
    fn test_error_propagation() {
        fn inner() -> Result<()> {
            Err(ResolveError::InvalidCalibration("checked_min".to_string()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        assert!(matches!(
            outer(),
            Err(ResolveError::InvalidCalibration(msg)) if msg == "checked_min"
        ));
    }
}
