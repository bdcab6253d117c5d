//! Subscriber side of a document.

use super::{BinderHandle, Subscription, TransformBatch};
use crate::document::Document;
use crate::error::BinderError;
use scribe_ot::Transform;
use std::time::Duration;
use tokio::sync::mpsc;

/// A subscription to one document.
///
/// Holds the document as it was when the subscription was made, the version
/// of that snapshot, and the stream of transforms accepted since. Applying
/// each received batch in order to the snapshot reproduces the document.
///
/// The stream ends when the document closes or when this subscriber falls
/// too far behind and is disconnected. Dropping the portal unsubscribes.
#[derive(Debug)]
pub struct Portal {
    document: Document,
    version: u64,
    rx: mpsc::Receiver<TransformBatch>,
    handle: BinderHandle,
}

impl Portal {
    pub(super) fn new(subscription: Subscription, handle: BinderHandle) -> Self {
        Self {
            document: subscription.document,
            version: subscription.version,
            rx: subscription.rx,
            handle,
        }
    }

    pub fn doc_id(&self) -> &str {
        self.handle.doc_id()
    }

    /// Snapshot of the document at [`Portal::version`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn handle(&self) -> &BinderHandle {
        &self.handle
    }

    /// Wait for the next broadcast. `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<TransformBatch> {
        self.rx.recv().await
    }

    /// Take a broadcast if one is already waiting.
    pub fn try_recv(&mut self) -> Option<TransformBatch> {
        self.rx.try_recv().ok()
    }

    /// Submit a transform, giving up after `timeout`.
    pub async fn submit(&self, transform: Transform, timeout: Duration) -> Result<u64, BinderError> {
        tokio::time::timeout(timeout, self.handle.submit(transform))
            .await
            .map_err(|_| BinderError::Timeout(timeout))?
    }

    /// Submit an ordered batch, giving up after `timeout`.
    pub async fn submit_batch(
        &self,
        transforms: Vec<Transform>,
        timeout: Duration,
    ) -> Result<Vec<Transform>, BinderError> {
        tokio::time::timeout(timeout, self.handle.submit_batch(transforms))
            .await
            .map_err(|_| BinderError::Timeout(timeout))?
    }

    /// Retained transforms newer than `version`, for catching up after a gap.
    pub async fn transforms_since(
        &self,
        version: u64,
    ) -> Result<(Vec<Transform>, u64), BinderError> {
        self.handle.transforms_since(version).await
    }
}
