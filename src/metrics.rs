//! Prometheus metrics collection for scribed.
//!
//! Tracks document actor lifecycle, transform throughput and storage health.
//! Metrics are exposed on an HTTP endpoint when `server.metrics_port` is set.
//!
//! - `scribe_open_binders` - Documents with a live actor (gauge)
//! - `scribe_subscribers` - Portals attached across all documents (gauge)
//! - `scribe_transforms_rejected_total{reason}` - Rejected submissions by error code
//! - `scribe_broadcast_fanout` - Recipients per broadcast (histogram)
//! - `scribe_flush_duration_seconds` - Time to flush a document (histogram)

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Transforms accepted by any document.
pub static TRANSFORMS_ACCEPTED: OnceLock<IntCounter> = OnceLock::new();

/// Transforms rejected, labelled by error code.
pub static TRANSFORMS_REJECTED: OnceLock<IntCounterVec> = OnceLock::new();

/// Subscribers disconnected for missing a broadcast deadline.
pub static SUBSCRIBERS_KICKED: OnceLock<IntCounter> = OnceLock::new();

/// Flushes that wrote a changed document to storage.
pub static FLUSHES: OnceLock<IntCounter> = OnceLock::new();

/// Flushes that failed and shut their document down.
pub static FLUSH_FAILURES: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

pub static OPEN_BINDERS: OnceLock<IntGauge> = OnceLock::new();

pub static SUBSCRIBERS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

/// Broadcast fan-out: how many subscribers received each batch.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Flush latency including the storage write.
pub static FLUSH_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded. Recording
/// before `init` is a no-op.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(TRANSFORMS_ACCEPTED, IntCounter::new("scribe_transforms_accepted_total", "Transforms accepted"));
    register!(TRANSFORMS_REJECTED, IntCounterVec::new(Opts::new("scribe_transforms_rejected_total", "Transforms rejected by reason"), &["reason"]));
    register!(SUBSCRIBERS_KICKED, IntCounter::new("scribe_subscribers_kicked_total", "Subscribers kicked for missing a broadcast deadline"));
    register!(FLUSHES, IntCounter::new("scribe_flushes_total", "Document flushes written to storage"));
    register!(FLUSH_FAILURES, IntCounter::new("scribe_flush_failures_total", "Document flushes that failed"));
    register!(OPEN_BINDERS, IntGauge::new("scribe_open_binders", "Documents with a running binder"));
    register!(SUBSCRIBERS, IntGauge::new("scribe_subscribers", "Attached portals"));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("scribe_broadcast_fanout", "Recipients per broadcast")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0])));
    register!(FLUSH_LATENCY, Histogram::with_opts(
        HistogramOpts::new("scribe_flush_duration_seconds", "Document flush latency")
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
fn inc(metric: &OnceLock<IntCounter>) {
    if let Some(c) = metric.get() {
        c.inc();
    }
}

#[inline]
fn add_gauge(metric: &OnceLock<IntGauge>, delta: i64) {
    if let Some(g) = metric.get() {
        g.add(delta);
    }
}

#[inline]
pub fn record_accepted(count: usize) {
    if let Some(c) = TRANSFORMS_ACCEPTED.get() {
        c.inc_by(count as u64);
    }
}

/// Record a rejected submission under its error code.
#[inline]
pub fn record_rejected(reason: &str) {
    if let Some(c) = TRANSFORMS_REJECTED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

#[inline]
pub fn record_kicked(count: usize) {
    if let Some(c) = SUBSCRIBERS_KICKED.get() {
        c.inc_by(count as u64);
    }
}

/// Record a flush that wrote to storage.
#[inline]
pub fn record_flush(duration_secs: f64) {
    inc(&FLUSHES);
    if let Some(h) = FLUSH_LATENCY.get() {
        h.observe(duration_secs);
    }
}

#[inline]
pub fn record_flush_failure() {
    inc(&FLUSH_FAILURES);
}

/// Record how many subscribers received a broadcast.
#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn binder_opened() {
    add_gauge(&OPEN_BINDERS, 1);
}

#[inline]
pub fn binder_closed() {
    add_gauge(&OPEN_BINDERS, -1);
}

#[inline]
pub fn subscribers_changed(delta: i64) {
    add_gauge(&SUBSCRIBERS, delta);
}
