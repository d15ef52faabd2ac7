use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters for engine activity on this thread.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub steps: BTreeMap<String, StepCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            steps: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Registry
    pub elements_built: u64,
    pub properties_built: u64,

    // Runs
    pub spec_runs: u64,
    pub spec_rejections: u64,

    // Verify outcomes
    pub evaluations_passed: u64,
    pub evaluations_failed: u64,
    pub evaluations_errored: u64,

    // Documents
    pub documents_migrated: u64,
    pub migrations_applied: u64,
}

///
/// StepCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StepCounters {
    pub calls: u64,
    pub rows_out: u64,
}

///
/// StepSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct StepSummary {
    pub step: String,
    pub calls: u64,
    pub rows_out: u64,
    pub avg_rows_out: f64,
}

///
/// EventReport
/// Event/counter report; counters are absent when the window started
/// after the current state was opened.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub step_counters: Vec<StepSummary>,
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

/// Reset all counters and open a new window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snapshot = with_state(Clone::clone);
    if let Some(requested) = window_start_ms
        && requested > snapshot.window_start_ms
    {
        return EventReport::default();
    }

    let mut step_counters = snapshot
        .steps
        .iter()
        .map(|(step, counters)| StepSummary {
            step: step.clone(),
            calls: counters.calls,
            rows_out: counters.rows_out,
            avg_rows_out: average(counters.rows_out, counters.calls),
        })
        .collect::<Vec<_>>();

    // busiest steps first, then by name for stable output
    step_counters.sort_by(|a, b| {
        b.avg_rows_out
            .partial_cmp(&a.avg_rows_out)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.step.cmp(&b.step))
    });

    EventReport {
        counters: Some(snapshot),
        step_counters,
    }
}

#[expect(clippy::cast_precision_loss)]
fn average(total: u64, calls: u64) -> f64 {
    if calls == 0 {
        0.0
    } else {
        total as f64 / calls as f64
    }
}

fn now_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(nanos).unwrap_or_default()
}
