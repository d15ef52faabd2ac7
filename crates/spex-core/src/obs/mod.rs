//! Observability: engine telemetry counters and the sink boundary.
//!
//! Engine code never touches `metrics` directly; every counter update
//! flows through `EngineEvent` and `EventSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, StepCounters, StepSummary};
pub use sink::{EngineEvent, EventSink, StepKind, metrics_report, metrics_reset_all, with_event_sink};
