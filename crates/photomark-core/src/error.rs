//! Error taxonomy surfaced by an editor instance.

use crate::storage::AcquireError;
use thiserror::Error;

/// Errors scoped to one open editor. None of them are fatal to the host.
///
/// Two simultaneous gestures are not represented here: the recognizer holds
/// a single gesture state, so that conflict cannot be constructed.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Every fallback candidate failed.
    #[error("Image load failed: {0}")]
    ImageLoadFailure(#[from] AcquireError),
    /// Bytes were fetched but are not a drawable image.
    #[error("Image decode failed: {0}")]
    DecodeFailure(String),
    /// Flattening or uploading the canvas failed.
    #[error("Export failed: {0}")]
    ExportFailure(String),
}

impl EditorError {
    /// Whether the user may simply retry the action.
    ///
    /// Export failures leave the annotation log intact, so saving again is
    /// safe. Load and decode failures put the editor in its empty state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EditorError::ExportFailure(_))
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_export_is_retryable() {
        assert!(EditorError::ExportFailure("upload".into()).is_retryable());
        assert!(!EditorError::DecodeFailure("truncated".into()).is_retryable());
        assert!(!EditorError::from(AcquireError::NoCandidates).is_retryable());
    }
}
