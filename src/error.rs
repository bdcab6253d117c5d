//! Unified error handling for scribed.
//!
//! Each layer has its own error enum with automatic conversions into the
//! layer above and a static code for metric labels.

use crate::store::StoreError;
use scribe_ot::OtError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Document Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document id is empty")]
    EmptyId,

    #[error("document id is {0} bytes long")]
    IdTooLong(usize),

    #[error("document id contains characters that are not URL safe: {0}")]
    InvalidId(String),
}

impl DocumentError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::IdTooLong(_) | Self::InvalidId(_) => "invalid_document_id",
        }
    }
}

// ============================================================================
// Binder Errors (document actor boundary)
// ============================================================================

/// Errors returned by a document actor.
///
/// Cloneable so that a single storage failure can be both returned to the
/// caller that triggered it and reported to the curator.
#[derive(Debug, Clone, Error)]
pub enum BinderError {
    #[error("storage failure: {0}")]
    Storage(#[source] Arc<StoreError>),

    #[error(transparent)]
    Transform(#[from] OtError),

    #[error("document {0} is closed")]
    Closed(String),

    #[error("document did not respond within {0:?}")]
    Timeout(Duration),
}

impl From<StoreError> for BinderError {
    fn from(err: StoreError) -> Self {
        Self::Storage(Arc::new(err))
    }
}

impl BinderError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(err) => err.error_code(),
            Self::Transform(err) => err.error_code(),
            Self::Closed(_) => "binder_closed",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Whether the document could not be found in storage.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(err) if matches!(**err, StoreError::NotFound(_)))
    }
}

// ============================================================================
// Curator Errors (registry)
// ============================================================================

#[derive(Debug, Clone, Error)]
pub enum CuratorError {
    #[error(transparent)]
    Binder(#[from] BinderError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("curator is closed")]
    Closed,
}

impl CuratorError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Binder(err) => err.error_code(),
            Self::Document(err) => err.error_code(),
            Self::Closed => "curator_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binder_error_codes() {
        let err = BinderError::from(StoreError::NotFound("doc".into()));
        assert_eq!(err.error_code(), "not_found");
        assert!(err.is_not_found());

        let err = BinderError::from(OtError::FutureVersion { submitted: 5, expected: 2 });
        assert_eq!(err.error_code(), "future_version");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_curator_error_wraps() {
        let err: CuratorError = DocumentError::EmptyId.into();
        assert_eq!(err.error_code(), "invalid_document_id");
        let err: CuratorError = BinderError::Closed("doc".into()).into();
        assert_eq!(err.error_code(), "binder_closed");
    }

    #[test]
    fn test_storage_error_clones_share_source() {
        let err = BinderError::from(StoreError::NotFound("doc".into()));
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert!(std::error::Error::source(&copy).is_some());
    }
}
