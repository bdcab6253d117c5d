//! Cloneable handle used to talk to a running binder.

use super::{BinderEvent, BinderState, Portal};
use crate::error::BinderError;
use scribe_ot::Transform;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Address of a document actor.
///
/// Every request is a message on the actor's mailbox. Once the actor has
/// stopped all requests fail with [`BinderError::Closed`].
#[derive(Debug, Clone)]
pub struct BinderHandle {
    doc_id: Arc<str>,
    generation: u64,
    tx: mpsc::Sender<BinderEvent>,
    state: watch::Receiver<BinderState>,
}

impl BinderHandle {
    pub(super) fn new(
        doc_id: &str,
        generation: u64,
        tx: mpsc::Sender<BinderEvent>,
        state: watch::Receiver<BinderState>,
    ) -> Self {
        Self {
            doc_id: Arc::from(doc_id),
            generation,
            tx,
            state,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// Distinguishes successive binders for the same document.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> BinderState {
        *self.state.borrow()
    }

    /// Whether the actor has stopped accepting requests.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed() || self.state() != BinderState::Running
    }

    fn closed(&self) -> BinderError {
        BinderError::Closed(self.doc_id.to_string())
    }

    async fn request<T>(
        &self,
        event: impl FnOnce(oneshot::Sender<Result<T, BinderError>>) -> BinderEvent,
    ) -> Result<T, BinderError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(event(reply_tx))
            .await
            .map_err(|_| self.closed())?;
        reply_rx.await.map_err(|_| self.closed())?
    }

    /// Attach a new subscriber, flushing first so the snapshot is current.
    pub async fn subscribe(&self) -> Result<Portal, BinderError> {
        let subscription = self
            .request(|reply_tx| BinderEvent::Subscribe { reply_tx })
            .await?;
        Ok(Portal::new(subscription, self.clone()))
    }

    /// Submit a transform, returning the version it was accepted at.
    pub async fn submit(&self, transform: Transform) -> Result<u64, BinderError> {
        self.request(|reply_tx| BinderEvent::Submit {
            transform,
            reply_tx,
        })
        .await
    }

    /// Submit an ordered batch, returning the corrected transforms.
    pub async fn submit_batch(
        &self,
        transforms: Vec<Transform>,
    ) -> Result<Vec<Transform>, BinderError> {
        self.request(|reply_tx| BinderEvent::SubmitBatch {
            transforms,
            reply_tx,
        })
        .await
    }

    /// Retained transforms newer than `version`, plus the current version.
    pub async fn transforms_since(
        &self,
        version: u64,
    ) -> Result<(Vec<Transform>, u64), BinderError> {
        self.request(|reply_tx| BinderEvent::Transforms { version, reply_tx })
            .await
    }

    /// Stop the actor and wait until its final flush has finished.
    ///
    /// Safe to call more than once and from several tasks.
    pub async fn close(&self) {
        let _ = self.tx.send(BinderEvent::Close).await;
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == BinderState::Closed).await;
    }
}
