//! Observability: filter telemetry (metrics) and sink abstractions.
//!
//! Counters are thread-local and ephemeral; nothing here is persisted.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
