use crate::document::Document;
use crate::error::BinderError;
use scribe_ot::Transform;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Transforms delivered to subscribers in one broadcast, in version order.
pub type TransformBatch = Arc<[Transform]>;

/// Lifecycle of a document actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    /// Accepting requests.
    Running,
    /// Loop stopped, final flush in progress.
    Closing,
    /// Fully stopped. Nothing is written after this point.
    Closed,
}

/// Events that can be sent to a Binder.
#[derive(Debug)]
pub enum BinderEvent {
    /// Attach a new subscriber.
    Subscribe {
        reply_tx: oneshot::Sender<Result<Subscription, BinderError>>,
    },
    /// Submit a single transform. Replies with the new version.
    Submit {
        transform: Transform,
        reply_tx: oneshot::Sender<Result<u64, BinderError>>,
    },
    /// Submit an ordered batch. Replies with the corrected transforms.
    SubmitBatch {
        transforms: Vec<Transform>,
        reply_tx: oneshot::Sender<Result<Vec<Transform>, BinderError>>,
    },
    /// Fetch retained transforms newer than `version`.
    Transforms {
        version: u64,
        reply_tx: oneshot::Sender<Result<(Vec<Transform>, u64), BinderError>>,
    },
    /// Stop the actor.
    Close,
}

/// What a new subscriber receives from the actor.
#[derive(Debug)]
pub struct Subscription {
    pub document: Document,
    pub version: u64,
    pub rx: mpsc::Receiver<TransformBatch>,
}

/// Reported to the owner of a binder that stopped because of an error.
#[derive(Debug, Clone)]
pub struct BinderFailure {
    pub doc_id: String,
    /// Identifies which binder instance for `doc_id` failed.
    pub generation: u64,
    pub error: BinderError,
}

/// Why a binder stopped without being asked to.
#[derive(Debug, Clone)]
pub enum BinderExit {
    /// Storage or the model failed.
    Failed(BinderFailure),
    /// No live subscriber for a whole inactivity period.
    Inactive { doc_id: String, generation: u64 },
}

impl BinderExit {
    pub fn doc_id(&self) -> &str {
        match self {
            Self::Failed(failure) => &failure.doc_id,
            Self::Inactive { doc_id, .. } => doc_id,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Self::Failed(failure) => failure.generation,
            Self::Inactive { generation, .. } => *generation,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Subscriber {
    pub id: u64,
    pub tx: mpsc::Sender<TransformBatch>,
}
