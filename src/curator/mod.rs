//! Registry of open documents.
//!
//! The `Curator` maps document ids to running binders, creating them on first
//! access and tearing them down when they fail or go idle. All binders share
//! one [`BinderContext`], so they report exits to the curator's supervision
//! loop.

mod supervisor;

use crate::binder::{Binder, BinderContext, BinderHandle, Portal};
use crate::config::BinderConfig;
use crate::document::{self, Document};
use crate::error::{BinderError, CuratorError};
use crate::store::DocumentStore;
use crate::telemetry::spans;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info};

/// Process-wide owner of every open document.
///
/// Must be created inside a Tokio runtime. Call [`Curator::close`] before
/// dropping it to flush every document.
pub struct Curator {
    binders: Arc<DashMap<String, BinderHandle>>,
    ctx: BinderContext,
    generation: AtomicU64,
    closed: AtomicBool,
    close_tx: Mutex<Option<mpsc::Sender<oneshot::Sender<()>>>>,
}

impl Curator {
    pub fn new(config: BinderConfig, store: Arc<dyn DocumentStore>) -> Self {
        let (ctx, exits) = BinderContext::new(config, store);
        let (close_tx, close_rx) = mpsc::channel(1);
        let binders = Arc::new(DashMap::new());

        tokio::spawn(
            supervisor::run(binders.clone(), exits, close_rx).instrument(spans::curator()),
        );

        Self {
            binders,
            ctx,
            generation: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            close_tx: Mutex::new(Some(close_tx)),
        }
    }

    fn ensure_open(&self) -> Result<(), CuratorError> {
        if self.is_closed() {
            return Err(CuratorError::Closed);
        }
        Ok(())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed)
    }

    /// Subscribe to an existing document, opening it if nobody has yet.
    pub async fn find_or_create(&self, doc_id: &str) -> Result<Portal, CuratorError> {
        self.ensure_open()?;
        document::validate_id(doc_id)?;

        let existing = self.binders.get(doc_id).map(|entry| entry.value().clone());
        if let Some(handle) = existing {
            match handle.subscribe().await {
                Ok(portal) => return Ok(portal),
                Err(BinderError::Closed(_)) => {
                    debug!(doc_id, generation = handle.generation(), "Replacing closed binder");
                    self.binders
                        .remove_if(doc_id, |_, h| h.generation() == handle.generation());
                }
                Err(err) => return Err(err.into()),
            }
        }

        let handle = Binder::bind_existing(doc_id, self.next_generation(), &self.ctx).await?;
        let handle = self.register(handle).await?;
        Ok(handle.subscribe().await?)
    }

    /// Store a new document under a fresh id and subscribe to it.
    ///
    /// Any id already set on `document` is replaced.
    pub async fn create_new(&self, document: Document) -> Result<Portal, CuratorError> {
        self.ensure_open()?;
        let document = document.with_fresh_id();
        document.validate()?;

        let handle = Binder::bind_new(document, self.next_generation(), &self.ctx).await?;
        info!(doc_id = handle.doc_id(), "Document created");
        let handle = self.register(handle).await?;
        Ok(handle.subscribe().await?)
    }

    /// Insert a freshly spawned binder, deferring to a live one that won a race.
    async fn register(&self, handle: BinderHandle) -> Result<BinderHandle, CuratorError> {
        let (winner, redundant) = match self.binders.entry(handle.doc_id().to_string()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => (entry.get().clone(), Some(handle)),
            Entry::Occupied(mut entry) => {
                entry.insert(handle.clone());
                (handle, None)
            }
            Entry::Vacant(entry) => {
                entry.insert(handle.clone());
                (handle, None)
            }
        };

        if let Some(redundant) = redundant {
            debug!(doc_id = redundant.doc_id(), "Lost registration race, closing duplicate binder");
            redundant.close().await;
        } else {
            info!(doc_id = winner.doc_id(), generation = winner.generation(), "Binder registered");
        }

        // The supervision loop may have emptied the registry while we spawned.
        if self.closed.load(Ordering::Acquire) {
            winner.close().await;
            self.binders.remove_if(winner.doc_id(), |_, h| h.generation() == winner.generation());
            return Err(CuratorError::Closed);
        }
        Ok(winner)
    }

    /// Whether [`Curator::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of documents with a registered binder.
    pub fn open_documents(&self) -> usize {
        self.binders.len()
    }

    /// Registered binder for `doc_id`, if any.
    pub fn binder(&self, doc_id: &str) -> Option<BinderHandle> {
        self.binders.get(doc_id).map(|entry| entry.value().clone())
    }

    /// Close every binder and stop the supervision loop.
    ///
    /// Waits until every document has been flushed. Later lookups fail with
    /// [`CuratorError::Closed`].
    pub async fn close(&self) {
        self.closed.store(true, Ordering::Release);

        let Some(close_tx) = self.close_tx.lock().take() else {
            return;
        };
        let (ack_tx, ack_rx) = oneshot::channel();
        if close_tx.send(ack_tx).await.is_ok() {
            let _ = ack_rx.await;
        }
        info!("Curator closed");
    }
}
