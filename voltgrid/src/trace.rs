//! Solve Tracing
//!
//! An injected collector for structured solve events. The solver stays a
//! pure function: callers that want to observe the phases pass a
//! [`SolveTrace`] and assert on the recorded events, instead of depending on
//! log side effects. `tracing` remains the ambient, human-oriented layer.

use serde::Serialize;

use crate::snapshot::GridPos;

/// One structured event emitted during a solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TraceEvent {
    GraphBuilt {
        positions: usize,
        connections: usize,
    },
    SourcesLocated {
        count: usize,
    },
    SourceSelected {
        position: GridPos,
        voltage: f64,
    },
    PathwaysFound {
        count: usize,
    },
    ParallelGroupsDetected {
        count: usize,
    },
    BranchSolved {
        components: usize,
        grounded: bool,
        current: f64,
    },
    WirePassesSettled {
        passes: usize,
    },
}

/// Caller-owned event collector.
#[derive(Debug, Clone, Default)]
pub struct SolveTrace {
    events: Vec<TraceEvent>,
}

impl SolveTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Record into an optional collector without consuming it.
pub(crate) fn record(trace: &mut Option<&mut SolveTrace>, event: TraceEvent) {
    if let Some(collector) = trace.as_deref_mut() {
        collector.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_in_order() {
        let mut trace = SolveTrace::new();
        trace.record(TraceEvent::SourcesLocated { count: 1 });
        trace.record(TraceEvent::PathwaysFound { count: 2 });

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.events()[0], TraceEvent::SourcesLocated { count: 1 });
    }

    #[test]
    fn test_optional_recording() {
        let mut collector = SolveTrace::new();
        let mut some: Option<&mut SolveTrace> = Some(&mut collector);
        record(&mut some, TraceEvent::PathwaysFound { count: 1 });

        let mut none: Option<&mut SolveTrace> = None;
        record(&mut none, TraceEvent::PathwaysFound { count: 1 });

        assert_eq!(collector.len(), 1);
    }
}
