//! Circuit Solver
//!
//! Orchestrates the per-branch solve: continuity checking, series/parallel
//! resistance aggregation, fixed-drop accounting, current limiting, and the
//! sequential voltage walk that feeds each component's output into the next
//! component's constitutive model.
//!
//! Branches forked at a junction are solved independently with the same
//! entry context; no cross-branch voltage feedback is modeled. Parallel
//! resistor groups are solved after the series walks, so group members end
//! with their parallel-pass state.

pub mod wires;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::SolveOptions;
use crate::models::{ComponentModel, ComponentStatus, ModelInput};
use crate::modules::{ModuleKind, ModuleRegistry};
use crate::snapshot::{GridSnapshot, PinStates};
use crate::topology::{
    is_groundable_cell, Branch, BranchPathway, ParallelBranch, PowerSource,
};
use crate::trace::{self, SolveTrace, TraceEvent};

/// The solver's output for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentState {
    pub component_id: String,
    pub kind: ModuleKind,
    pub output_voltage: f64,
    pub output_current: f64,
    pub power: f64,
    pub status: ComponentStatus,
    pub is_powered: bool,
    pub is_grounded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_drop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_on: Option<bool>,
}

/// Aggregate diagnostics for one solve.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitSummary {
    pub total_voltage: f64,
    pub total_current: f64,
    pub total_resistance: f64,
    pub total_power: f64,
    /// Component-id sequences of every discovered branch, discovery order.
    pub pathways: Vec<Vec<String>>,
    /// Advisory, human-readable; never a failure of the solve itself.
    pub errors: Vec<String>,
}

/// Everything the branch stage produces; consumed by the wire updater and
/// the facade.
#[derive(Debug, Clone, Default)]
pub struct SolveOutcome {
    pub states: BTreeMap<String, ComponentState>,
    pub summary: CircuitSummary,
    /// Parallel groups with solved voltage/current.
    pub parallel_branches: Vec<ParallelBranch>,
    /// Component rank along the dominant branch; lower is closer to the
    /// source. Used by the wire updater's tie-break.
    pub branch_rank: HashMap<String, usize>,
}

struct BranchSolution {
    states: Vec<(String, ComponentState)>,
    total_resistance: f64,
    effective_voltage: f64,
    current: f64,
    grounded: bool,
    component_ids: Vec<String>,
}

/// Per-snapshot solver. Pure: borrows its inputs, owns no state.
pub struct CircuitSolver<'a> {
    snapshot: &'a GridSnapshot,
    registry: &'a ModuleRegistry,
    pin_states: &'a PinStates,
    options: &'a SolveOptions,
}

impl<'a> CircuitSolver<'a> {
    pub fn new(
        snapshot: &'a GridSnapshot,
        registry: &'a ModuleRegistry,
        pin_states: &'a PinStates,
        options: &'a SolveOptions,
    ) -> Self {
        Self {
            snapshot,
            registry,
            pin_states,
            options,
        }
    }

    /// Solve every branch rooted at `source`, then the parallel groups.
    pub fn solve(
        &self,
        source: &PowerSource,
        pathway: &BranchPathway,
        parallels: &[ParallelBranch],
        trace: &mut Option<&mut SolveTrace>,
    ) -> SolveOutcome {
        let mut outcome = SolveOutcome::default();
        outcome.summary.total_voltage = source.voltage;
        outcome.summary.pathways = pathway
            .branches
            .iter()
            .map(|b| b.component_ids().iter().map(|s| s.to_string()).collect())
            .collect();

        let mut solutions: Vec<BranchSolution> = pathway
            .branches
            .iter()
            .map(|branch| self.solve_branch(source, branch, parallels))
            .collect();

        for solution in &solutions {
            trace::record(
                trace,
                TraceEvent::BranchSolved {
                    components: solution.states.len(),
                    grounded: solution.grounded,
                    current: solution.current,
                },
            );
            tracing::debug!(
                "branch solved: {} component(s), grounded={}, current={:.6} A",
                solution.states.len(),
                solution.grounded,
                solution.current
            );
        }

        if !pathway.branches.is_empty() && !pathway.has_grounded_branch() {
            outcome.summary.errors.push(
                "circuit has no conductive path to ground; components are unpowered".to_string(),
            );
        }

        // Apply states so the dominant branch wins shared components:
        // ungrounded branches first, then grounded by ascending length.
        solutions.sort_by_key(|s| (s.grounded, s.states.len()));
        for solution in &solutions {
            for (id, state) in &solution.states {
                outcome.states.insert(id.clone(), state.clone());
            }
        }

        if let Some(dominant) = solutions.last() {
            outcome.summary.total_resistance = dominant.total_resistance;
            outcome.summary.total_current = dominant.current;
            outcome.summary.total_power = dominant.effective_voltage * dominant.current;
            outcome.branch_rank = dominant
                .component_ids
                .iter()
                .enumerate()
                .map(|(rank, id)| (id.clone(), rank))
                .collect();

            // Parallel groups carry the dominant branch's effective voltage.
            if dominant.grounded {
                outcome.parallel_branches =
                    self.solve_parallels(dominant.effective_voltage, parallels, &mut outcome.states);
            } else {
                outcome.parallel_branches = parallels.to_vec();
            }
        } else {
            outcome.parallel_branches = parallels.to_vec();
        }

        outcome
    }

    /// Continuity, aggregation, current limiting, and the voltage walk for
    /// one branch.
    fn solve_branch(
        &self,
        source: &PowerSource,
        branch: &Branch,
        parallels: &[ParallelBranch],
    ) -> BranchSolution {
        let component_ids: Vec<String> = branch
            .component_ids()
            .iter()
            .map(|s| s.to_string())
            .collect();

        // Groups that touch this branch contribute combined resistance; the
        // members they absorb leave the series sum.
        let relevant_groups: Vec<&ParallelBranch> = parallels
            .iter()
            .filter(|g| component_ids.iter().any(|id| g.contains(id)))
            .collect();
        let absorbed: HashSet<&str> = relevant_groups
            .iter()
            .flat_map(|g| g.component_ids.iter().map(|s| s.as_str()))
            .collect();

        let mut series_resistance = 0.0;
        let mut total_drop = 0.0;
        let mut led_requirement: Option<f64> = None;
        let mut motor_requirement = 0.0;

        for id in &component_ids {
            let kind = self.snapshot.component_kind(id);
            let properties = self.snapshot.component_properties(id);
            match kind {
                ModuleKind::Resistor => {
                    if !absorbed.contains(id.as_str()) {
                        series_resistance += properties.resistance.unwrap_or(0.0);
                    }
                }
                ModuleKind::Led => {
                    total_drop += properties
                        .forward_voltage
                        .unwrap_or(self.options.default_led_forward_voltage);
                    let rated = properties
                        .rated_current
                        .unwrap_or(self.options.default_led_current);
                    // Series LEDs: the lowest rating binds.
                    led_requirement = Some(match led_requirement {
                        Some(existing) => existing.min(rated),
                        None => rated,
                    });
                }
                ModuleKind::Motor => {
                    total_drop += properties.voltage.unwrap_or(0.0);
                    motor_requirement += properties.running_current.unwrap_or(0.0);
                }
                _ => {}
            }
        }

        let parallel_resistance: f64 = relevant_groups
            .iter()
            .map(|g| g.combined_resistance)
            .sum();
        let total_resistance = series_resistance + parallel_resistance;

        let effective_voltage = (source.voltage - total_drop).max(0.0);
        let resistor_current = if total_resistance > 0.0 {
            effective_voltage / total_resistance
        } else {
            0.0
        };

        let load_requirement = if led_requirement.is_some() || motor_requirement > 0.0 {
            led_requirement.unwrap_or(0.0) + motor_requirement
        } else {
            resistor_current
        };
        let current = load_requirement
            .min(resistor_current)
            .min(source.max_current);

        if !branch.grounded {
            // Inert branch: a normal terminal state, not an error.
            let states = component_ids
                .iter()
                .filter(|id| {
                    ComponentModel::for_kind(self.snapshot.component_kind(id.as_str())).is_some()
                })
                .map(|id| (id.clone(), self.unpowered_state(id)))
                .collect();
            return BranchSolution {
                states,
                total_resistance,
                effective_voltage: 0.0,
                current: 0.0,
                grounded: false,
                component_ids,
            };
        }

        // Sequential voltage walk.
        let mut states = Vec::new();
        let mut voltage = source.voltage;
        let mut current_flow = current;

        for step in &branch.steps {
            let kind = self.snapshot.component_kind(&step.component_id);
            let model = match ComponentModel::for_kind(kind) {
                Some(model) => model,
                None => continue,
            };
            let properties = self.snapshot.component_properties(&step.component_id);
            let pin = self
                .snapshot
                .cell_at(step.entry)
                .and_then(|cell| self.registry.pin_for(cell));

            let output = model.calculate(&ModelInput {
                properties: &properties,
                pin: pin.as_ref(),
                pin_states: self.pin_states,
                input_voltage: voltage,
                input_current: current_flow,
                options: self.options,
            });

            states.push((
                step.component_id.clone(),
                ComponentState {
                    component_id: step.component_id.clone(),
                    kind,
                    output_voltage: output.output_voltage,
                    output_current: output.output_current,
                    power: output.power,
                    status: output.status,
                    is_powered: output.is_powered,
                    is_grounded: self.component_is_grounded(&step.component_id),
                    voltage_drop: output.voltage_drop,
                    forward_voltage: output.forward_voltage,
                    is_on: output.is_on,
                },
            ));

            voltage = output.output_voltage;
            current_flow = output.output_current;
        }

        BranchSolution {
            states,
            total_resistance,
            effective_voltage,
            current,
            grounded: true,
            component_ids,
        }
    }

    /// Apply the resistor model to every parallel-group member with the
    /// group's own voltage/current, independent of the series walk.
    fn solve_parallels(
        &self,
        effective_voltage: f64,
        parallels: &[ParallelBranch],
        states: &mut BTreeMap<String, ComponentState>,
    ) -> Vec<ParallelBranch> {
        let mut solved = Vec::with_capacity(parallels.len());

        for group in parallels {
            let mut group = group.clone();
            group.voltage = effective_voltage;
            group.current = if group.combined_resistance > 0.0 {
                effective_voltage / group.combined_resistance
            } else {
                0.0
            };

            for id in &group.component_ids {
                let kind = self.snapshot.component_kind(id);
                let model = match ComponentModel::for_kind(kind) {
                    Some(model) => model,
                    None => continue,
                };
                let properties = self.snapshot.component_properties(id);
                // Each member leg carries its own share of the group current.
                let member_resistance = properties.resistance.unwrap_or(0.0);
                let member_current = if member_resistance > 0.0 {
                    effective_voltage / member_resistance
                } else {
                    group.current
                };
                let output = model.calculate(&ModelInput {
                    properties: &properties,
                    pin: None,
                    pin_states: self.pin_states,
                    input_voltage: group.voltage,
                    input_current: member_current,
                    options: self.options,
                });
                states.insert(
                    id.clone(),
                    ComponentState {
                        component_id: id.clone(),
                        kind,
                        output_voltage: output.output_voltage,
                        output_current: output.output_current,
                        power: output.power,
                        status: output.status,
                        is_powered: output.is_powered,
                        is_grounded: self.component_is_grounded(id),
                        voltage_drop: output.voltage_drop,
                        forward_voltage: output.forward_voltage,
                        is_on: output.is_on,
                    },
                );
            }

            solved.push(group);
        }

        solved
    }

    fn unpowered_state(&self, component_id: &str) -> ComponentState {
        ComponentState {
            component_id: component_id.to_string(),
            kind: self.snapshot.component_kind(component_id),
            output_voltage: 0.0,
            output_current: 0.0,
            power: 0.0,
            status: ComponentStatus::Unpowered,
            is_powered: false,
            is_grounded: self.component_is_grounded(component_id),
            voltage_drop: None,
            forward_voltage: None,
            is_on: None,
        }
    }

    fn component_is_grounded(&self, component_id: &str) -> bool {
        self.snapshot
            .component_cells(component_id)
            .iter()
            .any(|cell| is_groundable_cell(cell, self.registry))
    }
}
