//! Voltgrid - grid-circuit topology extraction and steady-state solver
//!
//! This library turns a snapshot of components placed on a spatial grid,
//! connected by wires (plus an optional digital pin-state map), into
//! per-component and per-wire electrical results.
//!
//! # Quick Start
//!
//! ```
//! use voltgrid::prelude::*;
//! use voltgrid::modules::ModuleKind;
//! use voltgrid::snapshot::{GridCell, GridPos, Wire};
//!
//! let mut snapshot = GridSnapshot::new("blink");
//! snapshot.add_cell(GridCell::new(GridPos::new(0, 0), "bat1", ModuleKind::Battery, 0));
//! snapshot.add_cell(GridCell::new(GridPos::new(0, 1), "bat1", ModuleKind::Battery, 1));
//! snapshot.add_cell(
//!     GridCell::new(GridPos::new(3, 0), "r1", ModuleKind::Resistor, 0).with_resistance(1000.0),
//! );
//! snapshot.add_wire(Wire::new("w1").with_segment(GridPos::new(0, 0), GridPos::new(3, 0)));
//! snapshot.add_wire(Wire::new("w2").with_segment(GridPos::new(3, 0), GridPos::new(0, 1)));
//!
//! let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());
//! assert!(result.component_states.contains_key("r1"));
//! ```
//!
//! # Pipeline
//!
//! Snapshot → topology graph → source location → branch walk → parallel
//! grouping → per-branch solve (constitutive models) → wire back-propagation.
//!
//! The solve is a pure, synchronous computation: one immutable snapshot in,
//! one result out, no interior state between calls. Degenerate circuits (no
//! source, no path to ground) come back as best-effort results with advisory
//! strings in `summary.errors`; there is no fatal failure mode.

pub mod core;
pub mod models;
pub mod modules;
pub mod snapshot;
pub mod solver;
pub mod topology;
pub mod trace;

// Re-export main types
pub use crate::core::{
    discover_snapshot_files, load_pin_states, load_snapshot, CircuitCore, CircuitError,
    SolveOptions, SolveResult, DEFAULT_LED_CURRENT, DEFAULT_LED_FORWARD_VOLTAGE,
    DEFAULT_WIRE_UPDATE_PASSES,
};
pub use crate::models::{ComponentModel, ComponentStatus};
pub use crate::modules::{ModuleDefinition, ModuleKind, ModuleRegistry, PinRole, PinSpec};
pub use crate::snapshot::{GridSnapshot, PinStates};
pub use crate::solver::{CircuitSummary, ComponentState};
pub use crate::trace::{SolveTrace, TraceEvent};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CircuitCore, CircuitError, CircuitSummary, ComponentState, ComponentStatus, GridSnapshot,
        PinStates, SolveOptions, SolveResult, SolveTrace,
    };
}
