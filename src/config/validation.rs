//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::{Config, StoreKind};
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("binder.flush_period_ms must be greater than zero")]
    ZeroFlushPeriod,
    #[error("binder.kick_period_ms must be greater than zero")]
    ZeroKickPeriod,
    #[error("binder.mailbox_capacity must be greater than zero")]
    ZeroMailbox,
    #[error("storage.name is required for the mock store")]
    MissingMockName,
    #[error("storage.directory is required for the file store")]
    MissingStoreDirectory,
    #[error("storage.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.binder.flush_period_ms == 0 {
        errors.push(ValidationError::ZeroFlushPeriod);
    }
    if config.binder.kick_period_ms == 0 {
        errors.push(ValidationError::ZeroKickPeriod);
    }
    if config.binder.mailbox_capacity == 0 {
        errors.push(ValidationError::ZeroMailbox);
    }

    let storage = &config.storage;
    match storage.kind {
        StoreKind::Mock if storage.name.is_empty() => {
            errors.push(ValidationError::MissingMockName);
        }
        StoreKind::File if storage.directory.is_empty() => {
            errors.push(ValidationError::MissingStoreDirectory);
        }
        StoreKind::Sqlite => {
            if let Some(parent) = Path::new(&storage.path).parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                errors.push(ValidationError::DatabasePathInvalid(storage.path.clone()));
            }
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
