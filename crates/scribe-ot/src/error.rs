//! Error types for the transform engine.

use thiserror::Error;

/// Errors produced while accepting or applying transforms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtError {
    /// The delete count was negative.
    #[error("transform contained negative delete ({0})")]
    NegativeDelete(i64),

    /// The position was negative.
    #[error("transform contained negative position ({0})")]
    NegativePosition(i64),

    /// The deleted range extends past the end of the content.
    #[error(
        "transform position ({position}) and deletion ({delete}) surpassed document content length ({length})"
    )]
    OutOfBounds {
        /// Position of the offending transform.
        position: i64,
        /// Delete count of the offending transform.
        delete: i64,
        /// Content length in chars.
        length: usize,
    },

    /// The transform predates the retained history and cannot be rebased.
    #[error("transform version {submitted} is too stale, {missed} missed transforms but only {archived} retained")]
    StaleVersion {
        /// Version declared by the submitter.
        submitted: u64,
        /// Number of transforms the submitter missed.
        missed: u64,
        /// Number of transforms still retained.
        archived: usize,
    },

    /// The transform claims a version the server has never issued.
    #[error("transform version {submitted} greater than expected document version ({expected})")]
    FutureVersion {
        /// Version declared by the submitter.
        submitted: u64,
        /// Highest version the server would accept.
        expected: u64,
    },

    /// A batch submission carried no transforms.
    #[error("submitted empty batch of transforms")]
    EmptyBatch,
}

impl OtError {
    /// Whether the transform itself was malformed, as opposed to being
    /// submitted against the wrong version.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::NegativeDelete(_) | Self::NegativePosition(_) | Self::OutOfBounds { .. } | Self::EmptyBatch
        )
    }

    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeDelete(_) | Self::NegativePosition(_) | Self::EmptyBatch => "malformed_transform",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::StaleVersion { .. } => "stale_version",
            Self::FutureVersion { .. } => "future_version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(OtError::NegativeDelete(-1).error_code(), "malformed_transform");
        assert_eq!(
            OtError::StaleVersion { submitted: 1, missed: 4, archived: 2 }.error_code(),
            "stale_version"
        );
        assert_eq!(
            OtError::FutureVersion { submitted: 9, expected: 2 }.error_code(),
            "future_version"
        );
    }

    #[test]
    fn test_malformed_classification() {
        assert!(OtError::NegativeDelete(-3).is_malformed());
        assert!(OtError::OutOfBounds { position: 4, delete: 2, length: 3 }.is_malformed());
        assert!(!OtError::FutureVersion { submitted: 9, expected: 2 }.is_malformed());
    }
}
