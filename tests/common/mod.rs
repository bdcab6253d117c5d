//! Integration test common infrastructure.
//!
//! Provides stores with controllable failures, binder configurations tuned
//! for fast tests and helpers for reading portal streams.

#![allow(dead_code)]

use async_trait::async_trait;
use scribed::binder::{BinderExit, BinderFailure};
use scribed::store::MemoryStore;
use scribed::{BinderConfig, Document, DocumentStore, Portal, StoreError, Transform};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Time allowed for anything the tests wait on.
pub const WAIT: Duration = Duration::from_secs(2);

/// Binder configuration with periodic flushing effectively disabled.
pub fn config(kick_period_ms: u64) -> BinderConfig {
    BinderConfig {
        retention_period_secs: 60,
        flush_period_ms: 60_000,
        kick_period_ms,
        mailbox_capacity: 32,
        close_inactivity_period_secs: 0,
    }
}

/// Binder configuration that flushes every `flush_period_ms`.
pub fn flushing_config(flush_period_ms: u64) -> BinderConfig {
    BinderConfig {
        flush_period_ms,
        ..config(200)
    }
}

/// Memory store whose writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn seeded(id: &str, content: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::mock(id, content),
            ..Self::default()
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful `store` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn content(&self, id: &str) -> String {
        self.inner.fetch(id).await.expect("document missing").content
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("disk unplugged")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn create(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        self.check()?;
        self.inner.create(id, doc).await
    }

    async fn store(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        self.check()?;
        self.inner.store(id, doc).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Document, StoreError> {
        self.inner.fetch(id).await
    }
}

/// Next broadcast, failing the test if none arrives in time.
pub async fn next_batch(portal: &mut Portal) -> Arc<[Transform]> {
    tokio::time::timeout(WAIT, portal.recv())
        .await
        .expect("timed out waiting for broadcast")
        .expect("portal stream ended")
}

/// Next exit report, failing the test if none arrives in time.
pub async fn next_exit(exits: &mut mpsc::UnboundedReceiver<BinderExit>) -> BinderExit {
    tokio::time::timeout(WAIT, exits.recv())
        .await
        .expect("no exit reported")
        .expect("exit channel closed")
}

/// Next exit report, which must be a failure.
pub async fn next_failure(exits: &mut mpsc::UnboundedReceiver<BinderExit>) -> BinderFailure {
    match next_exit(exits).await {
        BinderExit::Failed(failure) => failure,
        other => panic!("expected a failure, got {other:?}"),
    }
}

/// Drain the stream until it ends, returning how many batches were left.
pub async fn drain_until_closed(portal: &mut Portal) -> usize {
    let mut remaining = 0;
    loop {
        match tokio::time::timeout(WAIT, portal.recv()).await {
            Ok(Some(_)) => remaining += 1,
            Ok(None) => return remaining,
            Err(_) => panic!("portal stream did not end"),
        }
    }
}

/// Apply broadcast transforms to a local copy, as a client would.
pub fn apply_all(content: &mut String, batch: &[Transform]) {
    for ot in batch {
        ot.apply(content).expect("broadcast transform did not apply");
    }
}

/// Poll `check` until it holds or the test times out.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
