//! Document storage configuration.

use serde::Deserialize;

use super::defaults::{default_mock_content, default_store_directory, default_store_path};

/// Which persistence backend documents live in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Kept in process memory, lost on restart.
    #[default]
    Memory,
    /// Memory store seeded with one demo document.
    Mock,
    /// One JSON file per document in `directory`.
    File,
    /// SQLite database at `path`.
    Sqlite,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default, rename = "type")]
    pub kind: StoreKind,
    /// Id of the seeded document for the mock store.
    #[serde(default)]
    pub name: String,
    /// Content of the seeded document for the mock store.
    #[serde(default = "default_mock_content")]
    pub mock_content: String,
    #[serde(default = "default_store_directory")]
    pub directory: String,
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            name: String::new(),
            mock_content: default_mock_content(),
            directory: default_store_directory(),
            path: default_store_path(),
        }
    }
}
