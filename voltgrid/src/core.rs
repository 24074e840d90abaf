//! Core solve facade shared by the CLI and embedding applications.
//! No GUI or app-state dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::modules::ModuleRegistry;
use crate::snapshot::{GridSnapshot, PinStates, Wire};
use crate::solver::{wires, CircuitSolver, CircuitSummary, ComponentState, SolveOutcome};
use crate::topology::{
    detect_parallel_branches, locate_power_sources, PathwayFinder, TopologyGraph,
};
use crate::trace::{self, SolveTrace, TraceEvent};

/// Iteration cap for wire-voltage back-propagation. A heuristic bound, not a
/// proven fixed point; downstream display behavior depends on the exact cap.
pub const DEFAULT_WIRE_UPDATE_PASSES: usize = 10;

/// Default LED forward voltage, in volts.
pub const DEFAULT_LED_FORWARD_VOLTAGE: f64 = 2.0;

/// Default LED rated current, in amperes (20 mA).
pub const DEFAULT_LED_CURRENT: f64 = 0.02;

#[derive(Debug, thiserror::Error)]
pub enum CircuitError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Options for solve runs.
#[derive(Clone, Debug)]
pub struct SolveOptions {
    /// Wire back-propagation pass cap; see [`DEFAULT_WIRE_UPDATE_PASSES`].
    pub wire_update_passes: usize,
    pub default_led_forward_voltage: f64,
    pub default_led_current: f64,
    /// Connect touching occupied cells when the snapshot has no wires.
    pub grid_adjacency_fallback: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            wire_update_passes: DEFAULT_WIRE_UPDATE_PASSES,
            default_led_forward_voltage: DEFAULT_LED_FORWARD_VOLTAGE,
            default_led_current: DEFAULT_LED_CURRENT,
            grid_adjacency_fallback: true,
        }
    }
}

/// Complete output of one solve: per-component states, annotated wires, the
/// grid with display fields refreshed, and aggregate diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub component_states: BTreeMap<String, ComponentState>,
    pub wires: Vec<Wire>,
    pub grid: GridSnapshot,
    pub summary: CircuitSummary,
    pub solved_at: DateTime<Utc>,
}

/// Core solve API used by the CLI and embedding applications.
pub struct CircuitCore;

impl CircuitCore {
    /// Solve one snapshot with the built-in module registry.
    pub fn solve(
        snapshot: &GridSnapshot,
        pin_states: &PinStates,
        options: &SolveOptions,
    ) -> SolveResult {
        let registry = ModuleRegistry::with_builtin_modules();
        Self::solve_with(snapshot, pin_states, options, &registry, None)
    }

    /// Solve and record structured phase events into `trace`.
    pub fn solve_traced(
        snapshot: &GridSnapshot,
        pin_states: &PinStates,
        options: &SolveOptions,
        collector: &mut SolveTrace,
    ) -> SolveResult {
        let registry = ModuleRegistry::with_builtin_modules();
        Self::solve_with(snapshot, pin_states, options, &registry, Some(collector))
    }

    /// Solve with an explicit registry and optional trace collector.
    ///
    /// Never fails: degenerate circuits come back as a full best-effort
    /// result with advisory strings in `summary.errors`.
    pub fn solve_with(
        snapshot: &GridSnapshot,
        pin_states: &PinStates,
        options: &SolveOptions,
        registry: &ModuleRegistry,
        trace: Option<&mut SolveTrace>,
    ) -> SolveResult {
        let mut trace = trace;
        tracing::info!(
            "solving snapshot '{}': {} cell(s), {} wire(s)",
            snapshot.metadata.project_name,
            snapshot.cells.len(),
            snapshot.wires.len()
        );

        let graph = TopologyGraph::from_snapshot(snapshot, options);
        trace::record(
            &mut trace,
            TraceEvent::GraphBuilt {
                positions: graph.position_count(),
                connections: graph.connection_count(),
            },
        );

        let sources = locate_power_sources(snapshot, registry);
        trace::record(
            &mut trace,
            TraceEvent::SourcesLocated {
                count: sources.len(),
            },
        );

        let mut errors: Vec<String> = Vec::new();
        if sources.is_empty() {
            errors.push("no power source found in circuit".to_string());
            let outcome = SolveOutcome {
                summary: CircuitSummary {
                    errors: errors.clone(),
                    ..CircuitSummary::default()
                },
                ..SolveOutcome::default()
            };
            let solved_wires =
                wires::update_wire_states(snapshot, registry, &outcome, options, &mut trace);
            return SolveResult {
                component_states: BTreeMap::new(),
                wires: solved_wires,
                grid: refresh_grid(snapshot, &BTreeMap::new()),
                summary: outcome.summary,
                solved_at: Utc::now(),
            };
        }

        let source = &sources[0];
        if sources.len() > 1 {
            errors.push(format!(
                "multiple power sources found; solving from the source at {}",
                source.position
            ));
        }
        trace::record(
            &mut trace,
            TraceEvent::SourceSelected {
                position: source.position,
                voltage: source.voltage,
            },
        );

        let pathway = PathwayFinder::new(&graph, snapshot, registry).find(source.position);
        trace::record(
            &mut trace,
            TraceEvent::PathwaysFound {
                count: pathway.branches.len(),
            },
        );

        let parallels = detect_parallel_branches(&graph, snapshot);
        trace::record(
            &mut trace,
            TraceEvent::ParallelGroupsDetected {
                count: parallels.len(),
            },
        );

        let solver = CircuitSolver::new(snapshot, registry, pin_states, options);
        let mut outcome = solver.solve(source, &pathway, &parallels, &mut trace);

        // Facade-level advisories come first, branch-level ones after.
        errors.append(&mut outcome.summary.errors);
        outcome.summary.errors = errors;

        let solved_wires =
            wires::update_wire_states(snapshot, registry, &outcome, options, &mut trace);
        let grid = refresh_grid(snapshot, &outcome.states);

        SolveResult {
            component_states: outcome.states,
            wires: solved_wires,
            grid,
            summary: outcome.summary,
            solved_at: Utc::now(),
        }
    }
}

/// Refresh per-cell display fields from the solved component states.
fn refresh_grid(
    snapshot: &GridSnapshot,
    states: &BTreeMap<String, ComponentState>,
) -> GridSnapshot {
    let mut grid = snapshot.clone();
    for cell in &mut grid.cells {
        match states.get(&cell.component_id) {
            Some(state) => {
                cell.voltage = Some(state.output_voltage);
                cell.current = Some(state.output_current);
                cell.resistance = cell.properties.resistance;
                cell.is_powered = state.is_powered;
            }
            None => {
                cell.voltage = None;
                cell.current = None;
                cell.resistance = cell.properties.resistance;
                cell.is_powered = false;
            }
        }
    }
    grid
}

/// Load a grid snapshot from a JSON file.
pub fn load_snapshot(path: &Path) -> Result<GridSnapshot, CircuitError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| CircuitError::Parse(e.to_string()))
}

/// Load a pin-state map from a JSON file.
pub fn load_pin_states(path: &Path) -> Result<PinStates, CircuitError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| CircuitError::Parse(e.to_string()))
}

/// Recursively discover snapshot JSON files in a directory.
pub fn discover_snapshot_files(dir: &Path) -> Result<Vec<PathBuf>, CircuitError> {
    let mut files = Vec::new();
    walk_dir(dir, &mut files, 0)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>, depth: usize) -> Result<(), CircuitError> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "node_modules" || name == "target" || name == "build"
            {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                if ext == "json" {
                    files.push(path);
                }
            }
        }
    }
    Ok(())
}
