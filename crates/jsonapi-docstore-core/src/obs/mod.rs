//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not access storage directly; repositories report what
//! they did through `MetricsEvent`s.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, ResourceCounters};
pub use sink::{
    ExecKind, GlobalMetricsSink, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all,
};
