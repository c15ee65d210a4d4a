use parking_lot::{Mutex, const_mutex};
use serde::Serialize;
use std::collections::BTreeMap;

///
/// EventReport
/// Process-wide counters accumulated by the global sink.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub ops: EventOps,
    pub resources: BTreeMap<String, ResourceCounters>,
}

impl EventReport {
    const fn new() -> Self {
        Self {
            ops: EventOps::new(),
            resources: BTreeMap::new(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Repository entrypoints
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,

    // Documents touched
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,

    // Capability rejections, by rule
    pub rejected_traversal: u64,
    pub rejected_comparison: u64,
}

impl EventOps {
    const fn new() -> Self {
        Self {
            load_calls: 0,
            save_calls: 0,
            delete_calls: 0,
            rows_loaded: 0,
            rows_saved: 0,
            rows_deleted: 0,
            rejected_traversal: 0,
            rejected_comparison: 0,
        }
    }
}

///
/// ResourceCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ResourceCounters {
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub rejected: u64,
}

static EVENT_STATE: Mutex<EventReport> = const_mutex(EventReport::new());

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventReport) -> R) -> R {
    f(&EVENT_STATE.lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventReport) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventReport::new());
}
