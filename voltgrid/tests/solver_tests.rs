//! Tests for the electrical laws the solver must reproduce.

use voltgrid::modules::ModuleKind;
use voltgrid::prelude::*;
use voltgrid::snapshot::{GridCell, GridPos, Wire};

fn pos(x: i32, y: i32) -> GridPos {
    GridPos::new(x, y)
}

fn battery(snapshot: &mut GridSnapshot, id: &str, volts: f64, vcc: GridPos, gnd: GridPos) {
    let mut cell = GridCell::new(vcc, id, ModuleKind::Battery, 0);
    cell.properties.voltage = Some(volts);
    snapshot.add_cell(cell);
    snapshot.add_cell(GridCell::new(gnd, id, ModuleKind::Battery, 1));
}

fn resistor(snapshot: &mut GridSnapshot, id: &str, ohms: f64, a: GridPos, b: GridPos) {
    snapshot.add_cell(GridCell::new(a, id, ModuleKind::Resistor, 0).with_resistance(ohms));
    snapshot.add_cell(GridCell::new(b, id, ModuleKind::Resistor, 1));
}

fn led(snapshot: &mut GridSnapshot, id: &str, anode: GridPos, cathode: GridPos) {
    snapshot.add_cell(GridCell::new(anode, id, ModuleKind::Led, 0));
    snapshot.add_cell(GridCell::new(cathode, id, ModuleKind::Led, 1));
}

fn wire(snapshot: &mut GridSnapshot, id: &str, from: GridPos, to: GridPos) {
    snapshot.add_wire(Wire::new(id).with_segment(from, to));
}

/// 5V battery, 1k + 2k in series, return wire to GND.
fn build_series_circuit() -> GridSnapshot {
    let mut snapshot = GridSnapshot::new("series");
    battery(&mut snapshot, "bat1", 5.0, pos(0, 0), pos(0, 1));
    resistor(&mut snapshot, "r1", 1000.0, pos(2, 0), pos(3, 0));
    resistor(&mut snapshot, "r2", 2000.0, pos(5, 0), pos(6, 0));
    wire(&mut snapshot, "w1", pos(0, 0), pos(2, 0));
    wire(&mut snapshot, "w2", pos(3, 0), pos(5, 0));
    wire(&mut snapshot, "w3", pos(6, 0), pos(0, 1));
    snapshot
}

#[test]
fn test_series_resistance_law() {
    let snapshot = build_series_circuit();
    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    assert!((result.summary.total_resistance - 3000.0).abs() < 1e-9);

    let expected_current = 5.0 / 3000.0;
    assert!((result.summary.total_current - expected_current).abs() < 1e-9);

    let r1 = &result.component_states["r1"];
    let r2 = &result.component_states["r2"];
    assert!((r1.voltage_drop.unwrap() - expected_current * 1000.0).abs() < 1e-9);
    assert!((r2.voltage_drop.unwrap() - expected_current * 2000.0).abs() < 1e-9);
    assert!((r1.output_voltage - (5.0 - expected_current * 1000.0)).abs() < 1e-9);
}

#[test]
fn test_parallel_resistance_law() {
    let mut snapshot = GridSnapshot::new("parallel");
    battery(&mut snapshot, "bat1", 5.0, pos(0, 0), pos(0, 1));
    resistor(&mut snapshot, "r1", 1000.0, pos(2, 0), pos(3, 0));
    resistor(&mut snapshot, "r2", 1000.0, pos(2, 2), pos(3, 2));
    // Both resistors strapped across the junctions (1,0) and (4,0).
    wire(&mut snapshot, "w1", pos(0, 0), pos(1, 0));
    wire(&mut snapshot, "w2", pos(1, 0), pos(2, 0));
    wire(&mut snapshot, "w3", pos(1, 0), pos(2, 2));
    wire(&mut snapshot, "w4", pos(3, 0), pos(4, 0));
    wire(&mut snapshot, "w5", pos(3, 2), pos(4, 0));
    wire(&mut snapshot, "w6", pos(4, 0), pos(0, 1));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    assert!((result.summary.total_resistance - 500.0).abs() < 1e-9);
    assert!((result.summary.total_current - 0.01).abs() < 1e-9);

    // Both members get a state from the parallel pass.
    assert!(result.component_states.contains_key("r1"));
    assert!(result.component_states.contains_key("r2"));
}

#[test]
fn test_led_threshold_behavior() {
    let mut snapshot = GridSnapshot::new("led");
    battery(&mut snapshot, "bat1", 5.0, pos(0, 0), pos(0, 1));
    resistor(&mut snapshot, "r1", 150.0, pos(2, 0), pos(3, 0));
    led(&mut snapshot, "led1", pos(5, 0), pos(6, 0));
    wire(&mut snapshot, "w1", pos(0, 0), pos(2, 0));
    wire(&mut snapshot, "w2", pos(3, 0), pos(5, 0));
    wire(&mut snapshot, "w3", pos(6, 0), pos(0, 1));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    let led_state = &result.component_states["led1"];
    // 5V across 150R leaves exactly the 2.0V forward voltage at the LED.
    assert_eq!(led_state.is_on, Some(true));
    assert_eq!(led_state.status, ComponentStatus::On);
    assert!((led_state.forward_voltage.unwrap() - 2.0).abs() < 1e-12);
    assert!(led_state.output_voltage.abs() < 1e-9);
    assert!((result.summary.total_current - 0.02).abs() < 1e-9);
}

#[test]
fn test_led_below_threshold_stays_off() {
    let mut snapshot = GridSnapshot::new("dim");
    battery(&mut snapshot, "bat1", 1.5, pos(0, 0), pos(0, 1));
    led(&mut snapshot, "led1", pos(2, 0), pos(3, 0));
    wire(&mut snapshot, "w1", pos(0, 0), pos(2, 0));
    wire(&mut snapshot, "w2", pos(3, 0), pos(0, 1));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    let led_state = &result.component_states["led1"];
    assert_eq!(led_state.is_on, Some(false));
    assert_eq!(led_state.status, ComponentStatus::Off);
}

#[test]
fn test_no_continuity_branch_is_inert() {
    let mut snapshot = GridSnapshot::new("open");
    battery(&mut snapshot, "bat1", 5.0, pos(0, 0), pos(0, 1));
    resistor(&mut snapshot, "r1", 1000.0, pos(2, 0), pos(3, 0));
    // One wire out, no return to ground.
    wire(&mut snapshot, "w1", pos(0, 0), pos(2, 0));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    let r1 = &result.component_states["r1"];
    assert_eq!(r1.status, ComponentStatus::Unpowered);
    assert_eq!(r1.output_current, 0.0);
    assert_eq!(result.summary.total_current, 0.0);
    assert!(result
        .summary
        .errors
        .iter()
        .any(|e| e.contains("no conductive path to ground")));
}

#[test]
fn test_no_power_source_reports_error() {
    let mut snapshot = GridSnapshot::new("dead");
    resistor(&mut snapshot, "r1", 470.0, pos(2, 0), pos(3, 0));
    led(&mut snapshot, "led1", pos(5, 0), pos(6, 0));
    wire(&mut snapshot, "w1", pos(3, 0), pos(5, 0));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    assert!(result.component_states.is_empty());
    assert!(!result.summary.errors.is_empty());
    assert!(result
        .summary
        .errors
        .iter()
        .any(|e| e.contains("no power source")));
    assert_eq!(result.summary.total_voltage, 0.0);
}

#[test]
fn test_idempotent_solves() {
    let snapshot = build_series_circuit();
    let pin_states = PinStates::new();
    let options = SolveOptions::default();

    let first = CircuitCore::solve(&snapshot, &pin_states, &options);
    let second = CircuitCore::solve(&snapshot, &pin_states, &options);

    assert_eq!(first.component_states, second.component_states);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.wires, second.wires);
}

#[test]
fn test_multiple_sources_advisory() {
    let mut snapshot = build_series_circuit();
    battery(&mut snapshot, "bat2", 9.0, pos(10, 10), pos(10, 11));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    assert!(result
        .summary
        .errors
        .iter()
        .any(|e| e.contains("multiple power sources")));
    // The position-ordered first source still drives the solve.
    assert!((result.summary.total_voltage - 5.0).abs() < 1e-12);
}

#[test]
fn test_unknown_component_kind_is_skipped() {
    let mut snapshot = build_series_circuit();
    let json = r#"{
        "position": {"x": 3, "y": 5},
        "component_id": "mystery1",
        "kind": "flux_capacitor",
        "cell_index": 0
    }"#;
    let cell: GridCell = serde_json::from_str(json).expect("permissive parse");
    snapshot.add_cell(cell);
    wire(&mut snapshot, "w9", pos(3, 0), pos(3, 5));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    // No state entry for the unknown component, and the rest still solves.
    assert!(!result.component_states.contains_key("mystery1"));
    assert!(result.component_states.contains_key("r1"));
}

#[test]
fn test_touching_components_conduct_without_wires() {
    let mut snapshot = GridSnapshot::new("touching");
    battery(&mut snapshot, "bat1", 5.0, pos(0, 0), pos(3, 0));
    // Resistor cells bridge the battery terminals by direct adjacency.
    resistor(&mut snapshot, "r1", 1000.0, pos(1, 0), pos(2, 0));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    let r1 = &result.component_states["r1"];
    assert!(r1.is_powered);
    assert!((result.summary.total_current - 0.005).abs() < 1e-9);
}
