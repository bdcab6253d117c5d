//! Transform representation and the rebase function.

use crate::error::OtError;

/// A single edit to a text document.
///
/// Starting from the content as of `version - 1`, remove `delete` chars at
/// `position` and then insert `insert` at the same position. Positions and
/// counts are signed on the wire so that bad input can be rejected rather than
/// silently wrapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Offset in chars at which the edit starts.
    pub position: i64,
    /// Number of chars removed at `position`.
    #[cfg_attr(feature = "serde", serde(rename = "num_delete"))]
    pub delete: i64,
    /// Text inserted at `position` after the deletion.
    #[cfg_attr(feature = "serde", serde(default))]
    pub insert: String,
    /// The version this transform expects to create.
    pub version: u64,
    /// Unix milliseconds at which the engine accepted the transform.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "received", default, skip_serializing_if = "is_unset")
    )]
    pub received_at: i64,
}

#[cfg(feature = "serde")]
fn is_unset(ts: &i64) -> bool {
    *ts == 0
}

impl Transform {
    /// Create a transform that has not yet been accepted.
    pub fn new(position: i64, delete: i64, insert: impl Into<String>, version: u64) -> Self {
        Self {
            position,
            delete,
            insert: insert.into(),
            version,
            received_at: 0,
        }
    }

    /// Length of the inserted text in chars.
    #[inline]
    pub fn insert_len(&self) -> i64 {
        self.insert.chars().count() as i64
    }

    /// Offset one past the last deleted char, saturating at `i64::MAX`.
    #[inline]
    pub fn delete_end(&self) -> i64 {
        self.position.saturating_add(self.delete)
    }

    /// Net change in content length once applied.
    #[inline]
    pub fn length_delta(&self) -> i64 {
        self.insert_len().saturating_sub(self.delete)
    }

    /// Reject transforms with negative offsets or counts.
    pub fn validate(&self) -> Result<(), OtError> {
        if self.delete < 0 {
            return Err(OtError::NegativeDelete(self.delete));
        }
        if self.position < 0 {
            return Err(OtError::NegativePosition(self.position));
        }
        Ok(())
    }

    /// Check that the deleted range lies within content of `length` chars.
    pub fn check_bounds(&self, length: usize) -> Result<(), OtError> {
        self.validate()?;
        let within = self
            .position
            .checked_add(self.delete)
            .is_some_and(|end| end <= length as i64);
        if !within {
            return Err(OtError::OutOfBounds {
                position: self.position,
                delete: self.delete,
                length,
            });
        }
        Ok(())
    }

    /// Splice this transform into `content`.
    ///
    /// On error `content` is left untouched.
    pub fn apply(&self, content: &mut String) -> Result<(), OtError> {
        self.check_bounds(content.chars().count())?;

        let start = byte_offset(content, self.position as usize);
        let end = byte_offset(content, self.delete_end() as usize);
        content.replace_range(start..end, &self.insert);
        Ok(())
    }
}

/// Byte offset of the `chars`-th char, or the end of the string.
fn byte_offset(content: &str, chars: usize) -> usize {
    content
        .char_indices()
        .nth(chars)
        .map_or(content.len(), |(idx, _)| idx)
}

/// Adjust `sub` so that applying it after `pre` preserves its original intent.
///
/// `sub` was built without knowledge of `pre`. When a transform has missed
/// several others, call this once per missed transform in the order they were
/// accepted, oldest first.
pub fn rebase(sub: &mut Transform, pre: &Transform) {
    let pre_len = pre.insert_len();

    if pre.position <= sub.position {
        if pre_len > 0 && pre.delete == 0 {
            sub.position = sub.position.saturating_add(pre_len);
        } else if pre.delete > 0 && pre.delete_end() <= sub.position {
            sub.position = sub.position.saturating_add(pre_len - pre.delete);
        } else if pre.delete > 0 {
            // pre deleted into or past our anchor
            let overhang = sub.delete.min(pre.delete_end() - sub.position);
            sub.delete -= overhang;
            sub.position = pre.position.saturating_add(pre_len);
        }
    } else if sub.delete > 0 && sub.delete_end() > pre.position {
        let gap = pre.position - sub.position;
        let excess = (sub.delete - gap).max(0);

        if excess > pre.delete {
            // Our deletion swallows pre entirely, so carry its text along.
            sub.delete = sub.delete.saturating_add(pre_len - pre.delete);
            sub.insert.push_str(&pre.insert);
        } else {
            sub.delete = gap;
        }
    }
}
