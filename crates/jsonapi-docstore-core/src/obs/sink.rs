//! Metrics sink boundary.
//!
//! Repository logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{
    db::query::CapabilityRejection,
    obs::metrics::{self, EventReport},
};

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Save,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        resource: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        resource: &'a str,
        rows_touched: u64,
    },
    Rejected {
        resource: &'a str,
        rejection: &'a CapabilityRejection,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// GlobalMetricsSink
///
/// Default process-wide sink that writes into global metrics state.
/// Used by every repository that was not given a sink of its own.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, resource } => {
                metrics::with_state_mut(|m| {
                    let entry = m.resources.entry(resource.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.load_calls = m.ops.load_calls.saturating_add(1);
                            entry.load_calls = entry.load_calls.saturating_add(1);
                        }
                        ExecKind::Save => {
                            m.ops.save_calls = m.ops.save_calls.saturating_add(1);
                            entry.save_calls = entry.save_calls.saturating_add(1);
                        }
                        ExecKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                resource,
                rows_touched,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.resources.entry(resource.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                        }
                        ExecKind::Save => {
                            m.ops.rows_saved = m.ops.rows_saved.saturating_add(rows_touched);
                            entry.rows_saved = entry.rows_saved.saturating_add(rows_touched);
                        }
                        ExecKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                        }
                    }
                });
            }

            MetricsEvent::Rejected {
                resource,
                rejection,
            } => {
                metrics::with_state_mut(|m| {
                    match rejection {
                        CapabilityRejection::RelationshipTraversal { .. } => {
                            m.ops.rejected_traversal = m.ops.rejected_traversal.saturating_add(1);
                        }
                        CapabilityRejection::AttributeComparison { .. } => {
                            m.ops.rejected_comparison =
                                m.ops.rejected_comparison.saturating_add(1);
                        }
                    }

                    let entry = m.resources.entry(resource.to_string()).or_default();
                    entry.rejected = entry.rejected.saturating_add(1);
                });
            }
        }
    }
}

/// Snapshot the current process-wide metrics.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::with_state(Clone::clone)
}

/// Reset all process-wide metrics.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

///
/// Span
///
/// RAII guard that emits start/finish events for one repository call.
/// Finish accounting happens on drop, so early returns and cancellation
/// are counted too.
///

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    resource: &'a str,
    rows: u64,
}

impl<'a> Span<'a> {
    #[must_use]
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, resource: &'a str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, resource });

        Self {
            sink,
            kind,
            resource,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            resource: self.resource,
            rows_touched: self.rows,
        });
    }
}

///
/// TESTS
///
