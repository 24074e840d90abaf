//! Source/Ground Location
//!
//! Scans the snapshot for cells that can seed a solve (dedicated power
//! components only) and cells that can sink it. Microcontroller supply and
//! GPIO pins never qualify as sources here; their contribution is gated by
//! logic state inside the constitutive models.

use crate::modules::{ModuleRegistry, PinRole};
use crate::snapshot::{GridCell, GridPos, GridSnapshot};

/// A grid position that can drive the circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSource {
    pub position: GridPos,
    pub component_id: String,
    /// Source nominal voltage, in volts.
    pub voltage: f64,
    /// Maximum current the source can supply, in amperes.
    pub max_current: f64,
}

/// A grid position that can return current to the source.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundPoint {
    pub position: GridPos,
    pub component_id: String,
}

/// True when the cell's pin can sink current: GND/negative role or an
/// explicitly groundable pin, at 0 V nominal.
pub fn is_groundable_cell(cell: &GridCell, registry: &ModuleRegistry) -> bool {
    match registry.pin_for(cell) {
        Some(pin) => {
            (pin.role == PinRole::Negative || pin.is_groundable) && pin.voltage == 0.0
        }
        None => false,
    }
}

/// Locate every power-source cell, sorted by grid position for determinism.
///
/// A cell qualifies only when its owning component is a dedicated power
/// module, its pin role is positive and powerable, and the nominal voltage
/// (component properties override the pin nominal) is greater than zero.
pub fn locate_power_sources(
    snapshot: &GridSnapshot,
    registry: &ModuleRegistry,
) -> Vec<PowerSource> {
    let mut sources = Vec::new();

    for cell in &snapshot.cells {
        if !cell.kind.is_power_module() {
            continue;
        }
        let pin = match registry.pin_for(cell) {
            Some(pin) => pin,
            None => continue,
        };
        if pin.role != PinRole::Positive || !pin.is_powerable {
            continue;
        }

        let properties = snapshot.component_properties(&cell.component_id);
        let voltage = properties.voltage.unwrap_or(pin.voltage);
        if voltage <= 0.0 {
            continue;
        }

        let max_current = properties.max_current.unwrap_or(pin.current);
        sources.push(PowerSource {
            position: cell.position,
            component_id: cell.component_id.clone(),
            voltage,
            // A zero capacity means the editor left it unspecified.
            max_current: if max_current > 0.0 {
                max_current
            } else {
                f64::INFINITY
            },
        });
    }

    sources.sort_by_key(|s| s.position);
    tracing::debug!("located {} power source cell(s)", sources.len());
    sources
}

/// Locate every groundable cell, sorted by grid position.
pub fn locate_ground_points(
    snapshot: &GridSnapshot,
    registry: &ModuleRegistry,
) -> Vec<GroundPoint> {
    let mut grounds: Vec<GroundPoint> = snapshot
        .cells
        .iter()
        .filter(|cell| is_groundable_cell(cell, registry))
        .map(|cell| GroundPoint {
            position: cell.position,
            component_id: cell.component_id.clone(),
        })
        .collect();

    grounds.sort_by_key(|g| g.position);
    grounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ModuleKind;
    use crate::snapshot::ComponentProperties;

    fn build_snapshot() -> (GridSnapshot, ModuleRegistry) {
        let mut snapshot = GridSnapshot::new("test");
        // Battery: VCC at (0,0), GND at (0,1)
        snapshot.add_cell(GridCell::new(
            GridPos::new(0, 0),
            "bat1",
            ModuleKind::Battery,
            0,
        ));
        snapshot.add_cell(GridCell::new(
            GridPos::new(0, 1),
            "bat1",
            ModuleKind::Battery,
            1,
        ));
        // Microcontroller VCC at (4,0) must never qualify
        snapshot.add_cell(GridCell::new(
            GridPos::new(4, 0),
            "mcu1",
            ModuleKind::Microcontroller,
            0,
        ));
        (snapshot, ModuleRegistry::with_builtin_modules())
    }

    #[test]
    fn test_battery_positive_cell_is_source() {
        let (snapshot, registry) = build_snapshot();
        let sources = locate_power_sources(&snapshot, &registry);

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].component_id, "bat1");
        assert_eq!(sources[0].position, GridPos::new(0, 0));
        assert!((sources[0].voltage - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_microcontroller_is_never_a_source() {
        let (snapshot, registry) = build_snapshot();
        let sources = locate_power_sources(&snapshot, &registry);
        assert!(sources.iter().all(|s| s.component_id != "mcu1"));
    }

    #[test]
    fn test_properties_override_nominal_voltage() {
        let (mut snapshot, registry) = build_snapshot();
        snapshot.cells[0].properties = ComponentProperties {
            voltage: Some(5.0),
            ..ComponentProperties::default()
        };

        let sources = locate_power_sources(&snapshot, &registry);
        assert!((sources[0].voltage - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ground_points() {
        let (snapshot, registry) = build_snapshot();
        let grounds = locate_ground_points(&snapshot, &registry);

        // Battery GND and microcontroller GND would both qualify, but only
        // the battery GND cell is present in this snapshot.
        assert_eq!(grounds.len(), 1);
        assert_eq!(grounds[0].position, GridPos::new(0, 1));
    }

    #[test]
    fn test_zero_voltage_source_skipped() {
        let (mut snapshot, registry) = build_snapshot();
        snapshot.cells[0].properties = ComponentProperties {
            voltage: Some(0.0),
            ..ComponentProperties::default()
        };

        let sources = locate_power_sources(&snapshot, &registry);
        assert!(sources.is_empty());
    }
}
