use super::super::Binder;
use crate::error::BinderError;
use std::time::Instant;
use tracing::debug;

impl Binder {
    /// Merge pending transforms into the document and write it out.
    ///
    /// The document is written whenever it differs from the stored copy,
    /// including after an earlier write failed.
    pub(crate) async fn flush(&mut self) -> Result<(), BinderError> {
        let started = Instant::now();
        let retention = self.config.retention_period();

        if self.model.flush(&mut self.document.content, retention)? {
            self.dirty = true;
        }
        if !self.dirty {
            return Ok(());
        }

        self.store.store(&self.doc_id, &self.document).await?;
        self.dirty = false;

        crate::metrics::record_flush(started.elapsed().as_secs_f64());
        debug!(version = self.model.version(), "Document flushed");
        Ok(())
    }
}
