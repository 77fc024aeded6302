//! Metrics sink boundary.
//!
//! Filter logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between filter execution
//! and the global metrics state.
use crate::{error::FilterErrorKind, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent<'a> {
    FilterCompiled {
        entity: &'a str,
    },
    FilterRejected {
        entity: &'a str,
        kind: FilterErrorKind,
    },
    RecordsEvaluated {
        entity: &'a str,
        scanned: u64,
        matched: u64,
    },
    PredicateBuilt {
        entity: &'a str,
        universal: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::FilterCompiled { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.filters_compiled = m.ops.filters_compiled.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.filters_compiled = entry.filters_compiled.saturating_add(1);
                });
            }

            MetricsEvent::FilterRejected { entity, kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.filters_rejected = m.ops.filters_rejected.saturating_add(1);
                    let by_kind = m.rejections.entry(kind).or_default();
                    *by_kind = by_kind.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.filters_rejected = entry.filters_rejected.saturating_add(1);
                });
            }

            MetricsEvent::RecordsEvaluated {
                entity,
                scanned,
                matched,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.records_scanned = m.ops.records_scanned.saturating_add(scanned);
                    m.ops.records_matched = m.ops.records_matched.saturating_add(matched);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.records_scanned = entry.records_scanned.saturating_add(scanned);
                    entry.records_matched = entry.records_matched.saturating_add(matched);
                });
            }

            MetricsEvent::PredicateBuilt { entity, universal } => {
                metrics::with_state_mut(|m| {
                    m.ops.predicates_built = m.ops.predicates_built.saturating_add(1);
                    if universal {
                        m.ops.predicates_universal = m.ops.predicates_universal.saturating_add(1);
                    }
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.predicates_built = entry.predicates_built.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a live `&dyn MetricsSink` in `with_metrics_sink`,
        //   which restores the previous slot on every exit, including unwind.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        // - Only a shared reference is materialized, matching the borrow handed to `with_metrics_sink`.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope and `Guard`
    //   restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists it.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    const COMPILED: MetricsEvent<'static> = MetricsEvent::FilterCompiled {
        entity: "obs::tests",
    };

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        record(COMPILED);
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(COMPILED);
            with_metrics_sink(&inner, || record(COMPILED));
            record(COMPILED);
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(COMPILED);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn global_sink_accumulates_per_entity() {
        metrics_reset_all();

        record(MetricsEvent::RecordsEvaluated {
            entity: "transaction",
            scanned: 50,
            matched: 5,
        });
        record(MetricsEvent::FilterRejected {
            entity: "transaction",
            kind: FilterErrorKind::UnknownField,
        });
        record(MetricsEvent::PredicateBuilt {
            entity: "transaction",
            universal: true,
        });

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters");
        assert_eq!(counters.ops.records_scanned, 50);
        assert_eq!(counters.ops.records_matched, 5);
        assert_eq!(counters.ops.predicates_universal, 1);
        assert_eq!(
            counters.rejections.get(&FilterErrorKind::UnknownField),
            Some(&1)
        );

        let entity = counters
            .entities
            .get("transaction")
            .expect("entity counters should be present");
        assert_eq!(entity.filters_rejected, 1);
        assert_eq!(entity.predicates_built, 1);
    }

    #[test]
    fn metrics_report_window_start_after_window_returns_empty() {
        metrics_reset_all();
        let window_start = metrics::with_state(|m| m.window_start_ms);
        record(COMPILED);

        let report = metrics_report(Some(window_start.saturating_add(1)));
        assert!(report.counters.is_none());
        assert!(report.entity_counters.is_empty());
    }
}
