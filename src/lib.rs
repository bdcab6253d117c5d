//! scribed - Scribe Daemon
//!
//! Core of a real-time collaborative text editor. Clients edit the same
//! document concurrently; every edit is an operational transform that is
//! rebased against the edits it missed and applied in one total order.
//!
//! # Architecture
//!
//! - [`Curator`]: process-wide registry of open documents. Creates binders on
//!   demand, hands out [`Portal`]s and tears down binders that fail.
//! - [`Binder`]: one actor per open document. Owns the transform model, the
//!   document mirror and the subscriber list, and persists through a
//!   [`DocumentStore`].
//! - [`Portal`]: a subscription. Carries a snapshot of the document and the
//!   channels used to submit transforms and receive broadcasts.
//!
//! Transports (websocket, HTTP, ...) sit on top of [`Curator`] and [`Portal`]
//! and are not part of this crate.

pub mod binder;
pub mod config;
pub mod curator;
pub mod document;
pub mod error;
pub mod http;
pub mod metrics;
pub mod store;
pub mod telemetry;

pub use binder::{Binder, BinderHandle, Portal, TransformBatch};
pub use config::{BinderConfig, Config};
pub use curator::Curator;
pub use document::Document;
pub use error::{BinderError, CuratorError};
pub use scribe_ot::{Model, OtError, Transform};
pub use store::{DocumentStore, StoreError};
