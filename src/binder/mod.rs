//! Actor model for document sessions.
//!
//! This module implements the [`Binder`], which owns one open document in an
//! isolated Tokio task.
//!
//! # Architecture
//!
//! - **State Ownership**: The binder owns the transform [`Model`], the
//!   authoritative copy of the document and the list of subscribers.
//! - **Message Passing**: All interactions are [`BinderEvent`]s on one
//!   mailbox, multiplexed with a periodic flush timer.
//! - **Failure**: A flush that cannot reach storage stops the actor and is
//!   reported as a [`BinderFailure`] to whoever spawned it.
//! - **Inactivity**: A binder left without live subscribers for a whole
//!   inactivity period closes itself and reports [`BinderExit::Inactive`].

mod handle;
mod handlers;
mod portal;
mod types;

pub use handle::BinderHandle;
pub use portal::Portal;
pub use types::{BinderEvent, BinderExit, BinderFailure, BinderState, Subscription, TransformBatch};

use types::Subscriber;

use crate::config::BinderConfig;
use crate::document::Document;
use crate::error::BinderError;
use crate::store::DocumentStore;
use crate::telemetry::spans;
use scribe_ot::Model;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep};
use tracing::{Instrument, error, info, warn};

/// Everything a binder needs from its owner.
#[derive(Clone)]
pub struct BinderContext {
    pub config: BinderConfig,
    pub store: Arc<dyn DocumentStore>,
    pub exits: mpsc::UnboundedSender<BinderExit>,
}

impl BinderContext {
    /// Create a context along with the receiving end of its exit reports.
    pub fn new(
        config: BinderConfig,
        store: Arc<dyn DocumentStore>,
    ) -> (Self, mpsc::UnboundedReceiver<BinderExit>) {
        let (exits, exits_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                store,
                exits,
            },
            exits_rx,
        )
    }
}

/// The document actor.
///
/// Owns the state of a single document and processes events sequentially.
pub struct Binder {
    doc_id: String,
    generation: u64,
    config: BinderConfig,
    model: Model,
    document: Document,
    store: Arc<dyn DocumentStore>,
    subscribers: Vec<Subscriber>,
    next_subscriber: u64,
    exits: mpsc::UnboundedSender<BinderExit>,
    state: watch::Sender<BinderState>,
    /// Content has changed since the last successful store.
    dirty: bool,
    /// A failure has already been reported.
    failed: bool,
}

impl Binder {
    /// Load `doc_id` from storage and start serving it.
    pub async fn bind_existing(
        doc_id: &str,
        generation: u64,
        ctx: &BinderContext,
    ) -> Result<BinderHandle, BinderError> {
        let document = ctx.store.fetch(doc_id).await?;
        Self::spawn(document, generation, ctx)
    }

    /// Persist a brand new document and start serving it.
    pub async fn bind_new(
        document: Document,
        generation: u64,
        ctx: &BinderContext,
    ) -> Result<BinderHandle, BinderError> {
        ctx.store.create(&document.id, &document).await?;
        Self::spawn(document, generation, ctx)
    }

    fn spawn(
        document: Document,
        generation: u64,
        ctx: &BinderContext,
    ) -> Result<BinderHandle, BinderError> {
        let (binder, state_rx) = Self::new(document, generation, ctx)?;
        let (tx, rx) = mpsc::channel(ctx.config.mailbox_capacity.max(1));
        let handle = BinderHandle::new(&binder.doc_id, generation, tx, state_rx);

        let span = spans::binder(&binder.doc_id, generation);
        crate::metrics::binder_opened();
        tokio::spawn(binder.run(rx).instrument(span));

        Ok(handle)
    }

    fn new(
        mut document: Document,
        generation: u64,
        ctx: &BinderContext,
    ) -> Result<(Self, watch::Receiver<BinderState>), BinderError> {
        let mut model = Model::new(document.id.clone());
        // Nothing is pending yet; this teaches the model the content length.
        model.flush(&mut document.content, ctx.config.retention_period())?;

        let (state, state_rx) = watch::channel(BinderState::Running);
        let binder = Self {
            doc_id: document.id.clone(),
            generation,
            config: ctx.config.clone(),
            model,
            document,
            store: ctx.store.clone(),
            subscribers: Vec::new(),
            next_subscriber: 0,
            exits: ctx.exits.clone(),
            state,
            dirty: false,
            failed: false,
        };
        Ok((binder, state_rx))
    }

    /// The main actor loop.
    async fn run(mut self, mut rx: mpsc::Receiver<BinderEvent>) {
        let period = self.config.flush_period();
        let mut flush_timer = interval_at(Instant::now() + period, period);
        flush_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let idle_period = self.config.close_inactivity_period();
        let idle_timer = sleep(idle_period.unwrap_or_default());
        tokio::pin!(idle_timer);
        let mut inactive = false;

        info!(version = self.model.version(), "Binder started");

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    None | Some(BinderEvent::Close) => break,
                    Some(event) => {
                        if let Err(err) = self.handle_event(event, &mut flush_timer).await {
                            self.report(err);
                            break;
                        }
                        if let Some(idle) = idle_period {
                            idle_timer.as_mut().reset(Instant::now() + idle);
                        }
                    }
                },
                _ = flush_timer.tick() => {
                    if let Err(err) = self.flush().await {
                        self.report(err);
                        break;
                    }
                }
                _ = &mut idle_timer, if idle_period.is_some() => {
                    if !self.has_live_subscribers() {
                        info!("Binder inactive, closing");
                        inactive = true;
                        break;
                    }
                    if let Some(idle) = idle_period {
                        idle_timer.as_mut().reset(Instant::now() + idle);
                    }
                }
            }
        }

        self.shutdown(rx).await;

        if inactive && !self.failed {
            self.notify(BinderExit::Inactive {
                doc_id: self.doc_id.clone(),
                generation: self.generation,
            });
        }
    }

    async fn handle_event(
        &mut self,
        event: BinderEvent,
        flush_timer: &mut Interval,
    ) -> Result<(), BinderError> {
        match event {
            BinderEvent::Subscribe { reply_tx } => {
                self.handle_subscribe(reply_tx, flush_timer).await?;
            }
            BinderEvent::Submit {
                transform,
                reply_tx,
            } => {
                self.handle_submit(transform, reply_tx).await;
            }
            BinderEvent::SubmitBatch {
                transforms,
                reply_tx,
            } => {
                self.handle_submit_batch(transforms, reply_tx).await;
            }
            BinderEvent::Transforms { version, reply_tx } => {
                self.handle_transforms(version, reply_tx);
            }
            BinderEvent::Close => {}
        }
        Ok(())
    }

    fn report(&mut self, error: BinderError) {
        error!(error = %error, "Binder failed");
        if self.failed {
            return;
        }
        self.failed = true;
        crate::metrics::record_flush_failure();

        self.notify(BinderExit::Failed(BinderFailure {
            doc_id: self.doc_id.clone(),
            generation: self.generation,
            error,
        }));
    }

    fn notify(&self, exit: BinderExit) {
        if self.exits.send(exit).is_err() {
            warn!("Nobody is listening for binder exits");
        }
    }

    /// Stop accepting work, end every subscriber stream and flush one last time.
    async fn shutdown(&mut self, rx: mpsc::Receiver<BinderEvent>) {
        self.state.send_replace(BinderState::Closing);
        // Requests still queued see their reply channel dropped.
        drop(rx);

        let subscribers = self.subscribers.len();
        self.subscribers.clear();
        crate::metrics::subscribers_changed(-(subscribers as i64));

        if let Err(err) = self.flush().await {
            self.report(err);
        }

        crate::metrics::binder_closed();
        self.state.send_replace(BinderState::Closed);
        info!(version = self.model.version(), subscribers, "Binder closed");
    }
}

#[cfg(test)]
impl Binder {
    /// Add a subscriber without going through the mailbox.
    pub(crate) fn attach(&mut self) -> mpsc::Receiver<TransformBatch> {
        let (tx, rx) = mpsc::channel(1);
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.subscribers.push(Subscriber { id, tx });
        rx
    }
}
