//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "scribed".to_string()
}

// =============================================================================
// Binder Defaults
// =============================================================================

/// How long applied transforms stay available for rebasing.
pub fn default_retention_period_secs() -> u64 {
    60
}

pub fn default_flush_period_ms() -> u64 {
    50
}

pub fn default_kick_period_ms() -> u64 {
    10
}

pub fn default_mailbox_capacity() -> usize {
    100
}

pub fn default_close_inactivity_period_secs() -> u64 {
    300
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_store_directory() -> String {
    "documents".to_string()
}

pub fn default_store_path() -> String {
    "scribed.db".to_string()
}

pub fn default_mock_content() -> String {
    "Open this page multiple times to see the edits appear in all of them.".to_string()
}
