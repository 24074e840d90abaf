//! GPIO gating example: an LED driven through a microcontroller pin that
//! only conducts while the emulated firmware holds it HIGH.
//!
//! Run with: `cargo run --example gpio_gating`

use voltgrid::modules::ModuleKind;
use voltgrid::prelude::*;
use voltgrid::snapshot::{GridCell, GridPos, Wire};

fn build_snapshot() -> GridSnapshot {
    let mut snapshot = GridSnapshot::new("gpio-demo");

    snapshot.add_cell(GridCell::new(GridPos::new(0, 0), "psu1", ModuleKind::PowerSupply, 0));
    snapshot.add_cell(GridCell::new(GridPos::new(0, 1), "psu1", ModuleKind::PowerSupply, 1));

    // Microcontroller: only the D2 (index 2) and D3 (index 3) cells are wired.
    snapshot.add_cell(GridCell::new(GridPos::new(2, 2), "mcu1", ModuleKind::Microcontroller, 2));
    snapshot.add_cell(GridCell::new(GridPos::new(2, 3), "mcu1", ModuleKind::Microcontroller, 3));

    snapshot.add_cell(
        GridCell::new(GridPos::new(5, 0), "r1", ModuleKind::Resistor, 0).with_resistance(150.0),
    );
    snapshot.add_cell(GridCell::new(GridPos::new(6, 0), "r1", ModuleKind::Resistor, 1));
    snapshot.add_cell(GridCell::new(GridPos::new(8, 0), "led1", ModuleKind::Led, 0));
    snapshot.add_cell(GridCell::new(GridPos::new(9, 0), "led1", ModuleKind::Led, 1));

    snapshot.add_wire(Wire::new("w1").with_segment(GridPos::new(0, 0), GridPos::new(2, 2)));
    snapshot.add_wire(Wire::new("w2").with_segment(GridPos::new(2, 3), GridPos::new(5, 0)));
    snapshot.add_wire(Wire::new("w3").with_segment(GridPos::new(6, 0), GridPos::new(8, 0)));
    snapshot.add_wire(Wire::new("w4").with_segment(GridPos::new(9, 0), GridPos::new(0, 1)));
    snapshot
}

fn main() {
    let snapshot = build_snapshot();
    let options = SolveOptions::default();

    for (label, high) in [("D2 LOW", false), ("D2 HIGH", true)] {
        let mut pin_states = PinStates::new();
        if high {
            pin_states.set_high(2);
        } else {
            pin_states.set_low(2);
        }

        let result = CircuitCore::solve(&snapshot, &pin_states, &options);
        let led = &result.component_states["led1"];
        println!(
            "{:8} -> LED {}  ({:.2} V in, {:.1} mA)",
            label,
            if led.is_on == Some(true) { "on" } else { "off" },
            result.component_states["mcu1"].output_voltage,
            led.output_current * 1000.0
        );
    }
}
