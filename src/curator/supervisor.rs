//! Curator supervision loop.
//!
//! Tears down binders that fail or go idle and closes everything on request.

use crate::binder::{BinderExit, BinderHandle};
use dashmap::DashMap;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

pub(super) async fn run(
    binders: Arc<DashMap<String, BinderHandle>>,
    mut exits: mpsc::UnboundedReceiver<BinderExit>,
    mut close_rx: mpsc::Receiver<oneshot::Sender<()>>,
) {
    info!("Curator started");

    loop {
        tokio::select! {
            ack = close_rx.recv() => {
                close_all(&binders).await;
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
                break;
            }
            Some(exit) = exits.recv() => {
                handle_exit(&binders, exit).await;
            }
        }
    }
}

async fn close_all(binders: &DashMap<String, BinderHandle>) {
    let handles: Vec<BinderHandle> = binders.iter().map(|entry| entry.value().clone()).collect();
    binders.clear();

    info!(count = handles.len(), "Closing all binders");
    join_all(handles.iter().map(|handle| handle.close())).await;
}

/// Remove the binder that exited, unless it was already replaced.
async fn handle_exit(binders: &DashMap<String, BinderHandle>, exit: BinderExit) {
    let doc_id = exit.doc_id().to_string();
    let generation = exit.generation();

    match &exit {
        BinderExit::Failed(failure) => {
            error!(doc_id = %doc_id, generation, error = %failure.error, "Binder failed, removing");
        }
        BinderExit::Inactive { .. } => {
            info!(doc_id = %doc_id, generation, "Binder inactive, removing");
        }
    }

    match binders.remove_if(&doc_id, |_, handle| handle.generation() == generation) {
        Some((_, handle)) => {
            handle.close().await;
            debug!(doc_id = %doc_id, generation, "Binder removed");
        }
        None if matches!(exit, BinderExit::Inactive { .. }) => {
            debug!(doc_id = %doc_id, generation, "Inactive binder already replaced");
        }
        None => {
            warn!(doc_id = %doc_id, generation, "Registry race: failed binder was not registered");
        }
    }
}
