//! Transform fan-out to subscribers.
//!
//! Every subscriber shares one delivery deadline per broadcast. A subscriber
//! that has not made room by then is dropped, which ends its stream once it
//! drains what it already holds.

use super::super::{Binder, TransformBatch};
use futures_util::future::join_all;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

impl Binder {
    pub(crate) async fn broadcast(&mut self, batch: TransformBatch) {
        if self.subscribers.is_empty() {
            return;
        }

        let deadline = Instant::now() + self.config.kick_period();
        let outcomes = join_all(
            self.subscribers
                .iter()
                .map(|sub| timeout_at(deadline, sub.tx.send(batch.clone()))),
        )
        .await;

        let mut kicked = 0;
        let mut departed = 0;
        let mut outcomes = outcomes.into_iter();
        self.subscribers.retain(|sub| match outcomes.next() {
            Some(Ok(Ok(()))) | None => true,
            Some(Ok(Err(_))) => {
                debug!(subscriber = sub.id, "Subscriber departed");
                departed += 1;
                false
            }
            Some(Err(_)) => {
                warn!(subscriber = sub.id, "Kicking slow subscriber");
                kicked += 1;
                false
            }
        });

        crate::metrics::record_fanout(self.subscribers.len());
        crate::metrics::record_kicked(kicked);
        crate::metrics::subscribers_changed(-((kicked + departed) as i64));
    }

    /// Forget subscribers whose portal is gone and report whether any remain.
    pub(crate) fn has_live_subscribers(&mut self) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| !sub.tx.is_closed());

        let departed = before - self.subscribers.len();
        if departed > 0 {
            debug!(departed, "Dropped departed subscribers");
            crate::metrics::subscribers_changed(-(departed as i64));
        }
        !self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::tests::detached_binder;
    use scribe_ot::Transform;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_broadcast_kicks_full_subscriber() {
        let (mut binder, _exits) = detached_binder("hello");
        let mut reader = binder.attach();
        let mut stuck = binder.attach();

        let first: Arc<[Transform]> = Arc::from(vec![Transform::new(0, 0, "a", 2)]);
        binder.broadcast(first.clone()).await;
        assert_eq!(reader.recv().await.unwrap(), first);
        assert_eq!(binder.subscribers.len(), 2);

        let second: Arc<[Transform]> = Arc::from(vec![Transform::new(0, 0, "b", 3)]);
        binder.broadcast(second.clone()).await;
        assert_eq!(binder.subscribers.len(), 1);
        assert_eq!(reader.recv().await.unwrap(), second);

        assert_eq!(stuck.recv().await.unwrap(), first);
        assert!(stuck.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_drops_departed_subscriber() {
        let (mut binder, _exits) = detached_binder("hello");
        let gone = binder.attach();
        drop(gone);

        binder
            .broadcast(Arc::from(vec![Transform::new(0, 0, "a", 2)]))
            .await;
        assert!(binder.subscribers.is_empty());
    }

    #[tokio::test]
    async fn test_live_subscribers_ignore_departed() {
        let (mut binder, _exits) = detached_binder("hello");
        assert!(!binder.has_live_subscribers());

        let gone = binder.attach();
        let _kept = binder.attach();
        drop(gone);
        assert!(binder.has_live_subscribers());
        assert_eq!(binder.subscribers.len(), 1);
    }
}
