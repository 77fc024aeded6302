use crate::error::FilterErrorKind;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters for filter compilation and evaluation.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub rejections: BTreeMap<FilterErrorKind, u64>,
    pub entities: BTreeMap<String, EntityCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            rejections: BTreeMap::new(),
            entities: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Compilation
    pub filters_compiled: u64,
    pub filters_rejected: u64,

    // In-memory evaluation
    pub records_scanned: u64,
    pub records_matched: u64,

    // Predicate builder
    pub predicates_built: u64,
    pub predicates_universal: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub filters_compiled: u64,
    pub filters_rejected: u64,
    pub records_scanned: u64,
    pub records_matched: u64,
    pub predicates_built: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(millis).unwrap_or_default()
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `window_start_ms`.
    pub counters: Option<EventState>,
    /// Per-entity counters and selectivity.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub filters_compiled: u64,
    pub filters_rejected: u64,
    pub records_scanned: u64,
    pub records_matched: u64,
    pub predicates_built: u64,
    pub match_ratio: f64,
}

/// Build a report, or an empty one when the window began before `window_start_ms`.
#[must_use]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|requested| requested > snap.window_start_ms) {
        return EventReport::default();
    }

    report_from(snap)
}

#[expect(clippy::cast_precision_loss)]
fn report_from(snap: EventState) -> EventReport {
    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(entity, ops)| EntitySummary {
            entity: entity.clone(),
            filters_compiled: ops.filters_compiled,
            filters_rejected: ops.filters_rejected,
            records_scanned: ops.records_scanned,
            records_matched: ops.records_matched,
            predicates_built: ops.predicates_built,
            match_ratio: if ops.records_scanned > 0 {
                ops.records_matched as f64 / ops.records_scanned as f64
            } else {
                0.0
            },
        })
        .collect();

    // busiest entities first
    entity_counters.sort_by(|a, b| match b.records_scanned.cmp(&a.records_scanned) {
        Ordering::Equal => a.entity.cmp(&b.entity),
        other => other,
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

///
/// TESTS
///
