//! Documents and their identifiers.

use crate::error::DocumentError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Longest id accepted from callers.
pub const MAX_ID_LEN: usize = 128;

/// A text document as persisted by a [`DocumentStore`](crate::DocumentStore).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Create a document with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let description = description.into();
        Self {
            id: generate_id(&title, &description),
            title,
            description,
            content: content.into(),
        }
    }

    /// Replace the id with a freshly generated one.
    pub fn with_fresh_id(mut self) -> Self {
        self.id = generate_id(&self.title, &self.description);
        self
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        validate_id(&self.id)
    }
}

/// Generate a unique, URL safe document id.
///
/// The id is a hash of the title, description, a random nonce and the current
/// time, followed by the time itself so that ids sort roughly by creation.
pub fn generate_id(title: &str, description: &str) -> String {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let nonce: u64 = rand::random();

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(nonce.to_be_bytes());
    hasher.update(now.to_be_bytes());

    format!("{}-{}", URL_SAFE_NO_PAD.encode(hasher.finalize()), now)
}

/// Check that an id is safe to use in URLs and as a file name.
pub fn validate_id(id: &str) -> Result<(), DocumentError> {
    if id.is_empty() {
        return Err(DocumentError::EmptyId);
    }
    if id.len() > MAX_ID_LEN {
        return Err(DocumentError::IdTooLong(id.len()));
    }
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(DocumentError::InvalidId(id.to_string()));
    }
    Ok(())
}
