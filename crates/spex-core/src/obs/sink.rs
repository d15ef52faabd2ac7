//! Event sink boundary.
//!
//! This module is the only bridge between engine logic and the
//! thread-local metrics state.
use crate::{criterion::Outcome, obs::metrics};
use derive_more::Display;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn EventSink>> = RefCell::new(None);
}

///
/// StepKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum StepKind {
    Query,
    Filter,
    Count,
    Select,
    Verify,
}

///
/// EngineEvent
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    ElementBuilt { properties: u64 },
    SpecRun,
    SpecRejected { issues: u64 },
    StepFinish { kind: StepKind, rows_out: u64 },
    Evaluated { outcome: Outcome },
    DocumentMigrated { from: u32, to: u32 },
}

///
/// EventSink
///

pub trait EventSink {
    fn record(&self, event: EngineEvent);
}

/// GlobalEventSink
/// Default sink writing into the thread-local metrics state.

pub(crate) struct GlobalEventSink;

impl EventSink for GlobalEventSink {
    fn record(&self, event: EngineEvent) {
        match event {
            EngineEvent::ElementBuilt { properties } => metrics::with_state_mut(|m| {
                m.ops.elements_built = m.ops.elements_built.saturating_add(1);
                m.ops.properties_built = m.ops.properties_built.saturating_add(properties);
            }),

            EngineEvent::SpecRun => metrics::with_state_mut(|m| {
                m.ops.spec_runs = m.ops.spec_runs.saturating_add(1);
            }),

            EngineEvent::SpecRejected { .. } => metrics::with_state_mut(|m| {
                m.ops.spec_rejections = m.ops.spec_rejections.saturating_add(1);
            }),

            EngineEvent::StepFinish { kind, rows_out } => metrics::with_state_mut(|m| {
                let entry = m.steps.entry(kind.to_string()).or_default();
                entry.calls = entry.calls.saturating_add(1);
                entry.rows_out = entry.rows_out.saturating_add(rows_out);
            }),

            EngineEvent::Evaluated { outcome } => metrics::with_state_mut(|m| {
                let slot = match outcome {
                    Outcome::Passed => &mut m.ops.evaluations_passed,
                    Outcome::Failed => &mut m.ops.evaluations_failed,
                    Outcome::Errored => &mut m.ops.evaluations_errored,
                };
                *slot = slot.saturating_add(1);
            }),

            EngineEvent::DocumentMigrated { from, to } => metrics::with_state_mut(|m| {
                m.ops.documents_migrated = m.ops.documents_migrated.saturating_add(1);
                m.ops.migrations_applied = m
                    .ops
                    .migrations_applied
                    .saturating_add(u64::from(to.saturating_sub(from)));
            }),
        }
    }
}

pub(crate) const GLOBAL_EVENT_SINK: GlobalEventSink = GlobalEventSink;

pub(crate) fn record(event: EngineEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` comes from a live `&dyn EventSink` installed by `with_event_sink`.
        // - `with_event_sink` restores the previous slot on every exit, unwind included.
        // - `record` dereferences synchronously and never stores `ptr`.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_EVENT_SINK.record(event);
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

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary event sink override on this thread.
pub fn with_event_sink<T>(sink: &dyn EventSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn EventSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - The erased pointer is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - Only shared access is ever produced from it.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn EventSink, *const dyn EventSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// StepSpan
/// RAII guard counting rows produced by one step; reports on drop, so a
/// partially consumed stream still accounts for what it yielded.
///

pub(crate) struct StepSpan {
    kind: StepKind,
    rows: u64,
}

impl StepSpan {
    pub(crate) const fn new(kind: StepKind) -> Self {
        Self { kind, rows: 0 }
    }

    pub(crate) const fn add_row(&mut self) {
        self.rows = self.rows.saturating_add(1);
    }
}

impl Drop for StepSpan {
    fn drop(&mut self) {
        record(EngineEvent::StepFinish {
            kind: self.kind,
            rows_out: self.rows,
        });
    }
}
