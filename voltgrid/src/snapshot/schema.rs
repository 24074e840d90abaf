//! Grid Snapshot Data Types
//!
//! The immutable input contract supplied by the grid-editor collaborator:
//! occupied cells with component identity/kind/pin-role data, wire segment
//! lists, and the optional pin-state map from the firmware emulator. All
//! types are serde-serializable; the editor and emulator speak JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::modules::{ModuleDefinition, ModuleKind};

/// A position on the component grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonally adjacent positions.
    pub fn neighbors4(&self) -> [GridPos; 4] {
        [
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x - 1, self.y),
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x, self.y - 1),
        ]
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Metadata about the snapshot source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Project name
    pub project_name: String,

    /// Timestamp of when the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Original file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            project_name: "Untitled".to_string(),
            timestamp: Utc::now(),
            schema_version: default_schema_version(),
            source_file: None,
        }
    }
}

/// Per-component electrical property overrides supplied by the editor.
/// Every field is optional; missing values fall back to the module
/// definition's pin nominals or the solver defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentProperties {
    /// Source nominal voltage (battery/power supply), in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    /// Source current capacity, in amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_current: Option<f64>,

    /// Resistance in ohms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,

    /// LED forward voltage, in volts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_voltage: Option<f64>,

    /// LED rated current, in amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated_current: Option<f64>,

    /// Motor running current, in amperes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_current: Option<f64>,
}

impl ComponentProperties {
    pub fn is_empty(&self) -> bool {
        self.voltage.is_none()
            && self.max_current.is_none()
            && self.resistance.is_none()
            && self.forward_voltage.is_none()
            && self.rated_current.is_none()
            && self.running_current.is_none()
    }

    /// Merge, preferring values already present in `self`.
    pub fn merged_with(mut self, other: &ComponentProperties) -> Self {
        self.voltage = self.voltage.or(other.voltage);
        self.max_current = self.max_current.or(other.max_current);
        self.resistance = self.resistance.or(other.resistance);
        self.forward_voltage = self.forward_voltage.or(other.forward_voltage);
        self.rated_current = self.rated_current.or(other.rated_current);
        self.running_current = self.running_current.or(other.running_current);
        self
    }
}

/// One occupied cell of the grid.
///
/// A component occupying an N-cell footprint owns exactly N grid positions,
/// each with a distinct `cell_index` in `[0, N)` indexing into its module
/// definition's pin table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub position: GridPos,

    /// Identity of the owning component (stable across solves).
    pub component_id: String,

    #[serde(default)]
    pub kind: ModuleKind,

    /// Which pin-role cell of the component this position represents.
    #[serde(default)]
    pub cell_index: usize,

    /// Inline module definition override; falls back to the registry entry
    /// for `kind` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<ModuleDefinition>,

    #[serde(default, skip_serializing_if = "ComponentProperties::is_empty")]
    pub properties: ComponentProperties,

    // Solved display fields, refreshed on every solve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,

    #[serde(default)]
    pub is_powered: bool,
}

impl GridCell {
    pub fn new(
        position: GridPos,
        component_id: impl Into<String>,
        kind: ModuleKind,
        cell_index: usize,
    ) -> Self {
        Self {
            position,
            component_id: component_id.into(),
            kind,
            cell_index,
            module: None,
            properties: ComponentProperties::default(),
            voltage: None,
            current: None,
            resistance: None,
            is_powered: false,
        }
    }

    pub fn with_module(mut self, module: ModuleDefinition) -> Self {
        self.module = Some(module);
        self
    }

    pub fn with_properties(mut self, properties: ComponentProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_resistance(mut self, ohms: f64) -> Self {
        self.properties.resistance = Some(ohms);
        self
    }
}

/// One straight wire segment between two grid positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireSegment {
    pub from: GridPos,
    pub to: GridPos,
}

impl WireSegment {
    pub fn new(from: GridPos, to: GridPos) -> Self {
        Self { from, to }
    }
}

fn generate_wire_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An electrically transparent connector: an ordered list of segments.
/// Resistance/gauge constrain only legality checks, never the voltage solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    /// Stable wire id; generated when the editor does not supply one.
    #[serde(default = "generate_wire_id")]
    pub id: String,

    #[serde(default)]
    pub segments: Vec<WireSegment>,

    // Solved fields, refreshed on every solve.
    #[serde(default)]
    pub voltage: f64,

    #[serde(default)]
    pub current: f64,

    #[serde(default)]
    pub power: f64,

    #[serde(default)]
    pub is_powered: bool,

    #[serde(default)]
    pub is_grounded: bool,
}

impl Wire {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            segments: Vec::new(),
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            is_powered: false,
            is_grounded: false,
        }
    }

    pub fn with_segment(mut self, from: GridPos, to: GridPos) -> Self {
        self.segments.push(WireSegment::new(from, to));
        self
    }

    /// Every segment endpoint, in order, with duplicates removed.
    pub fn endpoints(&self) -> Vec<GridPos> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            for pos in [segment.from, segment.to] {
                if !seen.contains(&pos) {
                    seen.push(pos);
                }
            }
        }
        seen
    }

    pub fn touches(&self, pos: GridPos) -> bool {
        self.segments
            .iter()
            .any(|s| s.from == pos || s.to == pos)
    }
}

/// Logic level reported by the firmware emulator for one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicLevel {
    High,
    Low,
}

/// State of one emulated pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinState {
    pub state: LogicLevel,
}

/// Map from numeric pin id to logic state, supplied by the firmware
/// emulation collaborator. Digital pins are keyed directly; analog pins are
/// offset by +100 (see [`crate::modules::pin_id_from_name`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinStates(pub HashMap<u32, PinState>);

impl PinStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_high(&mut self, pin_id: u32) {
        self.0.insert(
            pin_id,
            PinState {
                state: LogicLevel::High,
            },
        );
    }

    pub fn set_low(&mut self, pin_id: u32) {
        self.0.insert(
            pin_id,
            PinState {
                state: LogicLevel::Low,
            },
        );
    }

    /// HIGH only when the pin is present in the map and driven high; an
    /// absent pin blocks like a LOW one.
    pub fn is_high(&self, pin_id: u32) -> bool {
        matches!(
            self.0.get(&pin_id),
            Some(PinState {
                state: LogicLevel::High
            })
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The immutable solver input: occupied cells plus wires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    #[serde(default)]
    pub metadata: SnapshotMetadata,

    #[serde(default)]
    pub cells: Vec<GridCell>,

    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl GridSnapshot {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            metadata: SnapshotMetadata {
                project_name: project_name.into(),
                ..SnapshotMetadata::default()
            },
            cells: Vec::new(),
            wires: Vec::new(),
        }
    }

    pub fn add_cell(&mut self, cell: GridCell) {
        self.cells.push(cell);
    }

    pub fn add_wire(&mut self, wire: Wire) {
        self.wires.push(wire);
    }

    /// The occupied cell at a position, if any.
    pub fn cell_at(&self, pos: GridPos) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.position == pos)
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cell_at(pos).is_some()
    }

    /// All cells owned by a component, ordered by `cell_index`.
    pub fn component_cells(&self, component_id: &str) -> Vec<&GridCell> {
        let mut cells: Vec<&GridCell> = self
            .cells
            .iter()
            .filter(|c| c.component_id == component_id)
            .collect();
        cells.sort_by_key(|c| c.cell_index);
        cells
    }

    /// Kind of a component, `Unknown` if the id is absent.
    pub fn component_kind(&self, component_id: &str) -> ModuleKind {
        self.cells
            .iter()
            .find(|c| c.component_id == component_id)
            .map(|c| c.kind)
            .unwrap_or(ModuleKind::Unknown)
    }

    /// Properties of a component merged across its cells (first value wins
    /// in `cell_index` order).
    pub fn component_properties(&self, component_id: &str) -> ComponentProperties {
        self.component_cells(component_id)
            .into_iter()
            .fold(ComponentProperties::default(), |acc, cell| {
                acc.merged_with(&cell.properties)
            })
    }

    /// Distinct component ids, in first-appearance order.
    pub fn component_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for cell in &self.cells {
            if !ids.contains(&cell.component_id.as_str()) {
                ids.push(&cell.component_id);
            }
        }
        ids
    }

    pub fn occupied_positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.iter().map(|c| c.position)
    }
}
