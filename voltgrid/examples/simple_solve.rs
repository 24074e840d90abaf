//! Minimal example: build a battery + resistor + LED loop in code and print
//! the solved states.
//!
//! Run with: `cargo run --example simple_solve`

use voltgrid::modules::ModuleKind;
use voltgrid::prelude::*;
use voltgrid::snapshot::{GridCell, GridPos, Wire};

fn main() {
    let mut snapshot = GridSnapshot::new("simple");

    // 5V battery: VCC at (0,0), GND at (0,1).
    let mut vcc = GridCell::new(GridPos::new(0, 0), "bat1", ModuleKind::Battery, 0);
    vcc.properties.voltage = Some(5.0);
    snapshot.add_cell(vcc);
    snapshot.add_cell(GridCell::new(GridPos::new(0, 1), "bat1", ModuleKind::Battery, 1));

    // 150R current limiter.
    snapshot.add_cell(
        GridCell::new(GridPos::new(2, 0), "r1", ModuleKind::Resistor, 0).with_resistance(150.0),
    );
    snapshot.add_cell(GridCell::new(GridPos::new(3, 0), "r1", ModuleKind::Resistor, 1));

    // LED.
    snapshot.add_cell(GridCell::new(GridPos::new(5, 0), "led1", ModuleKind::Led, 0));
    snapshot.add_cell(GridCell::new(GridPos::new(6, 0), "led1", ModuleKind::Led, 1));

    snapshot.add_wire(Wire::new("w1").with_segment(GridPos::new(0, 0), GridPos::new(2, 0)));
    snapshot.add_wire(Wire::new("w2").with_segment(GridPos::new(3, 0), GridPos::new(5, 0)));
    snapshot.add_wire(Wire::new("w3").with_segment(GridPos::new(6, 0), GridPos::new(0, 1)));

    let result = CircuitCore::solve(&snapshot, &PinStates::new(), &SolveOptions::default());

    println!(
        "total: {:.2} V, {:.1} mA, {:.0} ohm",
        result.summary.total_voltage,
        result.summary.total_current * 1000.0,
        result.summary.total_resistance
    );
    for (id, state) in &result.component_states {
        println!(
            "  {:6} {:?}  out {:.2} V  {:.1} mA  {:.1} mW",
            id,
            state.status,
            state.output_voltage,
            state.output_current * 1000.0,
            state.power * 1000.0
        );
    }
    for error in &result.summary.errors {
        println!("  advisory: {}", error);
    }
}
