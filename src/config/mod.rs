//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct and loading (Config, ServerConfig)
//! - [`binder`]: Per-document actor timing (BinderConfig)
//! - [`storage`]: Document persistence backend selection (StoreConfig)
//! - [`validation`]: Startup checks for obviously broken values

mod binder;
mod defaults;
mod storage;
mod types;
mod validation;

pub use binder::BinderConfig;
pub use storage::{StoreConfig, StoreKind};
pub use types::{Config, ConfigError, ServerConfig};
pub use validation::{ValidationError, validate};
