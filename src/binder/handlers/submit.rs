use super::super::Binder;
use crate::error::BinderError;
use scribe_ot::{OtError, Transform};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

impl Binder {
    pub(crate) async fn handle_submit(
        &mut self,
        transform: Transform,
        reply_tx: oneshot::Sender<Result<u64, BinderError>>,
    ) {
        match self.model.push(transform) {
            Ok((fixed, version)) => {
                debug!(version, position = fixed.position, delete = fixed.delete, "Transform accepted");
                crate::metrics::record_accepted(1);
                let _ = reply_tx.send(Ok(version));
                self.broadcast(Arc::from(vec![fixed])).await;
            }
            Err(err) => {
                self.rejected(&err);
                let _ = reply_tx.send(Err(err.into()));
            }
        }
    }

    pub(crate) async fn handle_submit_batch(
        &mut self,
        transforms: Vec<Transform>,
        reply_tx: oneshot::Sender<Result<Vec<Transform>, BinderError>>,
    ) {
        match self.model.push_batch(transforms) {
            Ok(fixed) => {
                debug!(count = fixed.len(), version = self.model.version(), "Batch accepted");
                crate::metrics::record_accepted(fixed.len());
                let batch: Arc<[Transform]> = Arc::from(fixed.clone());
                let _ = reply_tx.send(Ok(fixed));
                self.broadcast(batch).await;
            }
            Err(err) => {
                self.rejected(&err);
                let _ = reply_tx.send(Err(err.into()));
            }
        }
    }

    pub(crate) fn handle_transforms(
        &self,
        version: u64,
        reply_tx: oneshot::Sender<Result<(Vec<Transform>, u64), BinderError>>,
    ) {
        let result = self.model.get_transforms(version).map_err(BinderError::from);
        let _ = reply_tx.send(result);
    }

    fn rejected(&self, err: &OtError) {
        debug!(error = %err, version = self.model.version(), "Transform rejected");
        crate::metrics::record_rejected(err.error_code());
    }
}
