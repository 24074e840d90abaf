//! Wire-State Back-Propagation
//!
//! Annotates every wire with the voltage of the circuit node it belongs to,
//! for observability only; wires never influence the solve. A wire touching
//! a powered source cell inherits the source voltage directly; otherwise it
//! takes the maximum output voltage among touching components (ties go to
//! the component closest to the source along the dominant branch), or among
//! wires sharing an endpoint. Grounded wires read 0 V unless a source drives
//! them directly.
//!
//! The pass loop is a bounded heuristic, not a proven fixed point: it runs
//! at most `SolveOptions::wire_update_passes` times and stops early when a
//! pass changes nothing.

use crate::core::SolveOptions;
use crate::modules::ModuleRegistry;
use crate::snapshot::{GridCell, GridSnapshot, Wire};
use crate::solver::SolveOutcome;
use crate::topology::is_groundable_cell;
use crate::trace::{self, SolveTrace, TraceEvent};

/// Compute solved wire annotations. The input wires are never mutated.
pub fn update_wire_states(
    snapshot: &GridSnapshot,
    registry: &ModuleRegistry,
    outcome: &SolveOutcome,
    options: &SolveOptions,
    trace: &mut Option<&mut SolveTrace>,
) -> Vec<Wire> {
    let mut wires: Vec<Wire> = snapshot
        .wires
        .iter()
        .map(|w| Wire {
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            is_powered: false,
            is_grounded: false,
            ..w.clone()
        })
        .collect();

    // Cells touching each wire's segment endpoints, resolved once.
    let touching: Vec<Vec<&GridCell>> = wires
        .iter()
        .map(|wire| {
            wire.endpoints()
                .into_iter()
                .filter_map(|pos| snapshot.cell_at(pos))
                .collect()
        })
        .collect();

    let total_current = outcome.summary.total_current;
    let mut passes_used = 0;

    for _ in 0..options.wire_update_passes {
        passes_used += 1;
        let mut changed = false;

        for index in 0..wires.len() {
            let mut source_voltage: Option<f64> = None;
            let mut grounded = false;
            // (voltage, dominant-branch rank); higher voltage wins, lower
            // rank breaks ties: closest to source wins.
            let mut best: Option<(f64, usize)> = None;

            for cell in &touching[index] {
                let pin = match registry.pin_for(cell) {
                    Some(pin) => pin,
                    None => continue,
                };
                if is_groundable_cell(cell, registry) {
                    grounded = true;
                }
                let state = match outcome.states.get(&cell.component_id) {
                    Some(state) => state,
                    None => continue,
                };
                if cell.kind.is_power_module()
                    && pin.is_powerable
                    && state.is_powered
                    && !pin.is_groundable
                {
                    let v = state.output_voltage;
                    source_voltage = Some(source_voltage.map_or(v, |s: f64| s.max(v)));
                }
                let rank = outcome
                    .branch_rank
                    .get(&cell.component_id)
                    .copied()
                    .unwrap_or(usize::MAX);
                let candidate = (state.output_voltage, rank);
                best = Some(match best {
                    None => candidate,
                    Some((v, r)) => {
                        if candidate.0 > v || (candidate.0 == v && candidate.1 < r) {
                            candidate
                        } else {
                            (v, r)
                        }
                    }
                });
            }

            // Wires sharing an endpoint equalize toward the maximum. This is
            // what makes additional passes observable.
            let mut neighbor_voltage = 0.0_f64;
            let endpoints = wires[index].endpoints();
            for (other_index, other) in wires.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                if endpoints.iter().any(|&pos| other.touches(pos)) {
                    neighbor_voltage = neighbor_voltage.max(other.voltage);
                }
            }

            let mut voltage = match source_voltage {
                Some(v) => v,
                None => best.map(|(v, _)| v).unwrap_or(0.0).max(neighbor_voltage),
            };
            if grounded && source_voltage.is_none() {
                voltage = 0.0;
            }
            let is_powered = voltage > 0.0;
            let current = if is_powered || grounded {
                total_current
            } else {
                0.0
            };
            let power = voltage * current;

            let wire = &mut wires[index];
            if wire.voltage != voltage
                || wire.current != current
                || wire.is_powered != is_powered
                || wire.is_grounded != grounded
            {
                changed = true;
            }
            wire.voltage = voltage;
            wire.current = current;
            wire.power = power;
            wire.is_powered = is_powered;
            wire.is_grounded = grounded;
        }

        if !changed {
            break;
        }
    }

    trace::record(
        trace,
        TraceEvent::WirePassesSettled {
            passes: passes_used,
        },
    );
    tracing::debug!("wire states settled after {} pass(es)", passes_used);

    wires
}
