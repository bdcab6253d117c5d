//! Binder event handlers.
//!
//! Each submodule handles a category of [`BinderEvent`](super::BinderEvent)
//! messages processed by [`Binder`](super::Binder).

pub mod broadcast;
pub mod flush;
pub mod submit;
pub mod subscribe;
