//! Version-indexed transform history for a single document.
//!
//! The [`Model`] keeps two runs of accepted transforms:
//!
//! - **applied**: already merged into the materialized content, pruned by age
//! - **unapplied**: accepted since the last flush, merged on the next flush
//!
//! Together they form the archive that late transforms are rebased against.
//! Every accepted transform bumps the version by one, so the archive tail of
//! length `n` is exactly the set of transforms a client at `version - n` has
//! not seen.

use crate::error::OtError;
use crate::transform::{rebase, Transform};
use crate::INITIAL_VERSION;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

/// Transform model surrounding one document session.
#[derive(Debug, Clone)]
pub struct Model {
    doc_id: String,
    version: u64,
    applied: VecDeque<Transform>,
    unapplied: Vec<Transform>,
    /// Transforms that left the archive through pruning or a failed flush.
    discarded: u64,
    /// Content length in chars with every unapplied transform merged.
    /// Unknown until the first flush.
    projected_len: Option<usize>,
}

impl Model {
    /// Create a fresh model at [`INITIAL_VERSION`].
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            version: INITIAL_VERSION,
            applied: VecDeque::new(),
            unapplied: Vec::new(),
            discarded: 0,
            projected_len: None,
        }
    }

    /// Identifier of the document this model tracks.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Current version of the document.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Transforms merged into content and still retained, oldest first.
    pub fn applied(&self) -> &VecDeque<Transform> {
        &self.applied
    }

    /// Transforms accepted since the last flush, oldest first.
    pub fn unapplied(&self) -> &[Transform] {
        &self.unapplied
    }

    /// Number of transforms available for rebasing.
    #[inline]
    pub fn archived_len(&self) -> usize {
        self.applied.len() + self.unapplied.len()
    }

    fn archive(&self) -> impl Iterator<Item = &Transform> {
        self.applied.iter().chain(self.unapplied.iter())
    }

    /// Push a single transform, rebasing it against everything it missed.
    ///
    /// Returns the corrected transform, which is what other clients must
    /// apply, along with the new document version.
    pub fn push(&mut self, ot: Transform) -> Result<(Transform, u64), OtError> {
        let mut ot = self.rebased(ot, self.version + 1)?;
        if let Some(length) = self.projected_len {
            ot.check_bounds(length)?;
        }

        self.commit(&mut ot, Utc::now().timestamp_millis());
        Ok((ot, self.version))
    }

    /// Push an ordered batch of transforms.
    ///
    /// Each element is rebased against the existing archive using its own
    /// declared version; elements are not rebased against each other. Either
    /// every element is accepted, with consecutive versions, or none is.
    pub fn push_batch(&mut self, ots: Vec<Transform>) -> Result<Vec<Transform>, OtError> {
        if ots.is_empty() {
            return Err(OtError::EmptyBatch);
        }

        let expected = self.version + 1;
        let mut fixed = ots
            .into_iter()
            .map(|ot| self.rebased(ot, expected))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(mut length) = self.projected_len {
            for ot in &fixed {
                ot.check_bounds(length)?;
                length = shifted(length, ot);
            }
        }

        let now = Utc::now().timestamp_millis();
        for ot in &mut fixed {
            self.commit(ot, now);
        }
        Ok(fixed)
    }

    fn rebased(&self, mut ot: Transform, expected: u64) -> Result<Transform, OtError> {
        ot.validate()?;

        let archived = self.archived_len();
        let diff = i128::from(expected) - i128::from(ot.version);
        if diff > archived as i128 {
            return Err(OtError::StaleVersion {
                submitted: ot.version,
                missed: u64::try_from(diff).unwrap_or(u64::MAX),
                archived,
            });
        }
        if diff < 0 {
            return Err(OtError::FutureVersion {
                submitted: ot.version,
                expected,
            });
        }

        let missed = diff as usize;
        for pre in self.archive().skip(archived - missed) {
            rebase(&mut ot, pre);
        }
        Ok(ot)
    }

    fn commit(&mut self, ot: &mut Transform, received_at: i64) {
        self.version += 1;
        ot.version = self.version;
        ot.received_at = received_at;
        self.projected_len = self.projected_len.map(|length| shifted(length, ot));
        self.unapplied.push(ot.clone());
    }

    /// Apply all unapplied transforms to `content` and prune expired history.
    ///
    /// Returns whether any transform was applied. On error `content` is left
    /// as it was and the pending transforms are discarded.
    pub fn flush(&mut self, content: &mut String, retention: Duration) -> Result<bool, OtError> {
        self.flush_at(content, retention, Utc::now())
    }

    /// [`Model::flush`] with an explicit clock, pruning applied transforms
    /// received at or before `now - retention`.
    pub fn flush_at(
        &mut self,
        content: &mut String,
        retention: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, OtError> {
        let pending = std::mem::take(&mut self.unapplied);

        let mut scratch = content.clone();
        for ot in &pending {
            if let Err(err) = ot.apply(&mut scratch) {
                self.discarded += pending.len() as u64;
                self.projected_len = Some(content.chars().count());
                return Err(err);
            }
        }

        let retention_ms = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now.timestamp_millis().saturating_sub(retention_ms);
        let expired = self
            .applied
            .iter()
            .take_while(|ot| ot.received_at <= cutoff)
            .count();
        self.applied.drain(..expired);
        self.discarded += expired as u64;

        let changed = !pending.is_empty();
        self.applied.extend(pending);
        self.projected_len = Some(scratch.chars().count());
        *content = scratch;

        debug_assert_eq!(
            self.version,
            INITIAL_VERSION + self.discarded + self.archived_len() as u64
        );
        Ok(changed)
    }

    /// Transforms needed to bring a client at `version` up to date.
    ///
    /// Returns them oldest first together with the current version.
    pub fn get_transforms(&self, version: u64) -> Result<(Vec<Transform>, u64), OtError> {
        let diff = i128::from(self.version) - i128::from(version);
        if diff < 0 {
            return Err(OtError::FutureVersion {
                submitted: version,
                expected: self.version,
            });
        }

        let archived = self.archived_len();
        if diff > archived as i128 {
            return Err(OtError::StaleVersion {
                submitted: version,
                missed: diff as u64,
                archived,
            });
        }

        let transforms = self
            .archive()
            .skip(archived - diff as usize)
            .cloned()
            .collect();
        Ok((transforms, self.version))
    }

    /// Current version of the document.
    pub fn get_version(&self) -> u64 {
        self.version
    }
}

fn shifted(length: usize, ot: &Transform) -> usize {
    (length as i64 + ot.length_delta()).max(0) as usize
}
