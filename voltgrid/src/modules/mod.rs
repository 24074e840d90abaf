//! Component module definitions.
//!
//! A *module definition* is the pin-role table for one component kind: which
//! cell of the component's footprint is a supply pin, a ground pin, a GPIO,
//! or a plain terminal, and what nominal voltage/current each pin carries.
//! Definitions ship embedded in the library (see [`builtin`]) and can be
//! supplemented from user JSON files or overridden inline per grid cell.

pub mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::snapshot::GridCell;

/// Offset added to analog pin numbers when deriving numeric pin ids
/// (`A0` maps to 100, `A3` to 103).
pub const ANALOG_PIN_OFFSET: u32 = 100;

/// Kind of component occupying grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Battery,
    PowerSupply,
    Resistor,
    Led,
    Motor,
    Microcontroller,
    /// Any component type this library does not model. Deserializes
    /// permissively; the solver produces no state for it.
    #[serde(other)]
    Unknown,
}

impl Default for ModuleKind {
    fn default() -> Self {
        ModuleKind::Unknown
    }
}

impl ModuleKind {
    /// Dedicated power components. Only these can seed a solve; a
    /// microcontroller supply pin is never an unconditional source.
    pub fn is_power_module(&self) -> bool {
        matches!(self, ModuleKind::Battery | ModuleKind::PowerSupply)
    }

    pub fn is_resistor(&self) -> bool {
        matches!(self, ModuleKind::Resistor)
    }

    pub fn is_microcontroller(&self) -> bool {
        matches!(self, ModuleKind::Microcontroller)
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleKind::Battery => write!(f, "battery"),
            ModuleKind::PowerSupply => write!(f, "power supply"),
            ModuleKind::Resistor => write!(f, "resistor"),
            ModuleKind::Led => write!(f, "LED"),
            ModuleKind::Motor => write!(f, "motor"),
            ModuleKind::Microcontroller => write!(f, "microcontroller"),
            ModuleKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Electrical role of a single pin cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinRole {
    /// VCC / positive supply terminal.
    Positive,
    /// GND / negative return terminal.
    Negative,
    /// Digital general-purpose pin, gated by logic state.
    Gpio,
    /// Analog pin, gated by logic state with the +100 id offset.
    Analog,
    /// Generic passive terminal.
    Terminal,
}

impl Default for PinRole {
    fn default() -> Self {
        PinRole::Terminal
    }
}

impl PinRole {
    /// Pins whose conduction depends on an externally supplied logic state.
    pub fn is_logic_gated(&self) -> bool {
        matches!(self, PinRole::Gpio | PinRole::Analog)
    }
}

/// One pin of a module definition, indexed by the owning cell's `cell_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinSpec {
    /// Pin name (e.g. "VCC", "GND", "D2", "A0").
    pub name: String,

    #[serde(default)]
    pub role: PinRole,

    /// Nominal voltage on this pin, in volts.
    #[serde(default)]
    pub voltage: f64,

    /// Current capacity of this pin, in amperes.
    #[serde(default)]
    pub current: f64,

    #[serde(default)]
    pub is_powerable: bool,

    #[serde(default)]
    pub is_groundable: bool,
}

impl PinSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: PinRole::Terminal,
            voltage: 0.0,
            current: 0.0,
            is_powerable: false,
            is_groundable: false,
        }
    }

    pub fn with_role(mut self, role: PinRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_voltage(mut self, voltage: f64) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = current;
        self
    }

    pub fn powerable(mut self) -> Self {
        self.is_powerable = true;
        self
    }

    pub fn groundable(mut self) -> Self {
        self.is_groundable = true;
        self
    }

    /// Repair the powerable/groundable invariant. A pin may not be both; a
    /// groundable pin at 0 V wins over the powerable flag.
    pub fn normalized(mut self) -> Self {
        if self.is_powerable && self.is_groundable {
            tracing::warn!(
                "pin {} flagged both powerable and groundable; keeping groundable",
                self.name
            );
            self.is_powerable = false;
        }
        self
    }
}

/// The pin-role table for one component kind. `cell_index` on a grid cell
/// indexes into `pins`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub kind: ModuleKind,

    /// Human-readable module name (e.g. "9V Battery").
    pub name: String,

    #[serde(default)]
    pub pins: Vec<PinSpec>,
}

impl ModuleDefinition {
    pub fn new(kind: ModuleKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            pins: Vec::new(),
        }
    }

    pub fn with_pin(mut self, pin: PinSpec) -> Self {
        self.pins.push(pin);
        self
    }

    pub fn pin(&self, cell_index: usize) -> Option<&PinSpec> {
        self.pins.get(cell_index)
    }

    /// Footprint size in grid cells.
    pub fn cell_count(&self) -> usize {
        self.pins.len()
    }

    fn normalize(mut self) -> Self {
        self.pins = self.pins.into_iter().map(PinSpec::normalized).collect();
        self
    }
}

/// Derive the numeric pin id used to key the external pin-state map.
///
/// Digital pins are keyed directly (`"7"`, `"D7"`, `"GPIO7"` all map to 7);
/// analog pins are offset by [`ANALOG_PIN_OFFSET`] (`"A0"` maps to 100).
/// Unparseable names yield `None` and behave as absent from the map.
pub fn pin_id_from_name(name: &str) -> Option<u32> {
    let upper = name.trim().to_uppercase();
    if let Some(rest) = upper.strip_prefix("GPIO") {
        return rest.parse().ok();
    }
    if let Some(rest) = upper.strip_prefix('A') {
        return rest.parse::<u32>().ok().map(|n| n + ANALOG_PIN_OFFSET);
    }
    if let Some(rest) = upper.strip_prefix('D') {
        return rest.parse().ok();
    }
    upper.parse().ok()
}

/// Registry of module definitions keyed by component kind.
///
/// Resolution order for a grid cell's pin: the cell's inline definition
/// override first, then the registry entry for its kind.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    definitions: HashMap<ModuleKind, ModuleDefinition>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the embedded standard definitions.
    pub fn with_builtin_modules() -> Self {
        let mut registry = Self::new();
        for definition in builtin::builtin_modules() {
            registry.add_definition(definition);
        }
        registry
    }

    pub fn add_definition(&mut self, definition: ModuleDefinition) {
        let definition = definition.normalize();
        self.definitions.insert(definition.kind, definition);
    }

    pub fn get(&self, kind: ModuleKind) -> Option<&ModuleDefinition> {
        self.definitions.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.definitions.values()
    }

    /// Resolve the pin spec backing a grid cell, honoring the cell-level
    /// inline override. Missing pin data makes the cell non-conductive
    /// (`None`), never an error.
    pub fn pin_for(&self, cell: &GridCell) -> Option<PinSpec> {
        if let Some(ref module) = cell.module {
            return module.pin(cell.cell_index).cloned().map(PinSpec::normalized);
        }
        self.get(cell.kind)
            .and_then(|def| def.pin(cell.cell_index))
            .cloned()
    }
}
