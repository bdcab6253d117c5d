use super::super::{Binder, Subscriber, Subscription};
use crate::error::BinderError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Interval;
use tracing::info;

impl Binder {
    /// Flush, then attach a subscriber with a snapshot of the flushed content.
    ///
    /// A flush failure is returned to the caller and to the run loop, which
    /// treats it as fatal.
    pub(crate) async fn handle_subscribe(
        &mut self,
        reply_tx: oneshot::Sender<Result<Subscription, BinderError>>,
        flush_timer: &mut Interval,
    ) -> Result<(), BinderError> {
        if let Err(err) = self.flush().await {
            let _ = reply_tx.send(Err(err.clone()));
            return Err(err);
        }
        flush_timer.reset();

        let (tx, rx) = mpsc::channel(1);
        let id = self.next_subscriber;
        self.next_subscriber += 1;

        let subscription = Subscription {
            document: self.document.clone(),
            version: self.model.version(),
            rx,
        };
        if reply_tx.send(Ok(subscription)).is_err() {
            return Ok(());
        }

        self.subscribers.push(Subscriber { id, tx });
        crate::metrics::subscribers_changed(1);
        info!(subscriber = id, subscribers = self.subscribers.len(), "Subscriber joined");
        Ok(())
    }
}
