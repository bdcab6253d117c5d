//! # scribe-ot
//!
//! Operational transform engine for collaborative editing of plain text.
//!
//! ## Features
//!
//! - [`Transform`]: a single edit (delete then insert at a position)
//! - [`rebase`]: adjusts a speculative edit for one edit it did not know about
//! - [`Model`]: version-indexed history with push, flush and history queries
//!
//! All offsets and lengths are counted in Unicode scalar values (`char`).
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe_ot::{Model, Transform};
//! use std::time::Duration;
//!
//! let mut content = String::from("hello world");
//! let mut model = Model::new("doc");
//!
//! // Two clients edit version 1 concurrently.
//! model.push(Transform::new(6, 5, "universe", 2)).unwrap();
//! let (fixed, version) = model.push(Transform::new(0, 0, "super ", 2)).unwrap();
//! assert_eq!(version, 3);
//! assert_eq!(fixed.position, 0);
//!
//! model.flush(&mut content, Duration::from_secs(60)).unwrap();
//! assert_eq!(content, "super hello universe");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod transform;

pub use error::OtError;
pub use model::Model;
pub use transform::{rebase, Transform};

/// The first version of every document.
pub const INITIAL_VERSION: u64 = 1;
