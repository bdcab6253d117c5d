//! Standardized span constructors for document observability.

pub mod spans {
    use tracing::{Span, info_span};

    /// Span wrapping the lifetime of one document actor.
    pub fn binder(doc_id: &str, generation: u64) -> Span {
        info_span!("binder", doc_id = %doc_id, generation = generation)
    }

    /// Span wrapping the curator supervision loop.
    pub fn curator() -> Span {
        info_span!("curator")
    }
}
