//! Pathway/Branch Finding
//!
//! A depth-first walk over the adjacency graph starting at a power-source
//! position. The walk uses an explicit work-stack and a visited set owned by
//! the walk context, so stack depth stays bounded on large grids and the
//! enumeration is testable in isolation.
//!
//! Semantics:
//! - the visited set is keyed by grid position; it prevents revisits and
//!   terminates cycles;
//! - an occupied position appends its component to the current branch,
//!   deduplicated by component id;
//! - entering one pin of a multi-pin component exposes every other
//!   connection point of that component as a continuation, so a component is
//!   entered once but all of its exit pins are explored;
//! - a fork clones the partial branch per continuation; each dead end emits
//!   one branch.

use std::collections::HashSet;

use crate::modules::ModuleRegistry;
use crate::snapshot::{GridPos, GridSnapshot};
use crate::topology::graph::TopologyGraph;
use crate::topology::sources::is_groundable_cell;

/// One component encountered along a branch, with the position the walk
/// entered it through (GPIO gating needs the entry pin).
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStep {
    pub component_id: String,
    pub entry: GridPos,
}

/// An ordered sequence of components from the source to a dead end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Branch {
    pub steps: Vec<BranchStep>,
    /// Whether the walk touched a groundable pin along this branch.
    pub grounded: bool,
}

impl Branch {
    pub fn component_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.component_id.as_str()).collect()
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.steps.iter().any(|s| s.component_id == component_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// All branches discovered from one source position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BranchPathway {
    pub branches: Vec<Branch>,
}

impl BranchPathway {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn has_grounded_branch(&self) -> bool {
        self.branches.iter().any(|b| b.grounded)
    }
}

/// Work-stack walker over one topology graph.
pub struct PathwayFinder<'a> {
    graph: &'a TopologyGraph,
    snapshot: &'a GridSnapshot,
    registry: &'a ModuleRegistry,
}

struct Frame {
    pos: GridPos,
    path: Vec<BranchStep>,
    grounded: bool,
}

impl<'a> PathwayFinder<'a> {
    pub fn new(
        graph: &'a TopologyGraph,
        snapshot: &'a GridSnapshot,
        registry: &'a ModuleRegistry,
    ) -> Self {
        Self {
            graph,
            snapshot,
            registry,
        }
    }

    /// Enumerate every branch reachable from `start`.
    pub fn find(&self, start: GridPos) -> BranchPathway {
        let mut visited: HashSet<GridPos> = HashSet::new();
        let mut branches: Vec<Branch> = Vec::new();
        let mut stack = vec![Frame {
            pos: start,
            path: Vec::new(),
            grounded: false,
        }];

        while let Some(Frame {
            pos,
            mut path,
            mut grounded,
        }) = stack.pop()
        {
            if !visited.insert(pos) {
                // Cycle, or a position a sibling branch already claimed:
                // this continuation terminates here.
                if !path.is_empty() {
                    branches.push(Branch {
                        steps: path,
                        grounded,
                    });
                }
                continue;
            }

            let cell = self.snapshot.cell_at(pos);
            if let Some(cell) = cell {
                if is_groundable_cell(cell, self.registry) {
                    grounded = true;
                }
                if !path.iter().any(|s| s.component_id == cell.component_id) {
                    path.push(BranchStep {
                        component_id: cell.component_id.clone(),
                        entry: pos,
                    });
                }
            }

            let mut next: Vec<GridPos> = Vec::new();
            for neighbor in self.graph.neighbors(pos) {
                if visited.contains(&neighbor) || next.contains(&neighbor) {
                    continue;
                }
                let same_component = match (cell, self.snapshot.cell_at(neighbor)) {
                    (Some(here), Some(there)) => here.component_id == there.component_id,
                    _ => false,
                };
                if same_component {
                    // Reached through the whole-component fan-out below.
                    continue;
                }
                next.push(neighbor);
            }

            // A multi-pin component is entered once; every other connection
            // point it exposes on the graph continues the walk.
            if let Some(cell) = cell {
                for exit in self
                    .graph
                    .positions_of_component(self.snapshot, &cell.component_id)
                {
                    if exit != pos && !visited.contains(&exit) && !next.contains(&exit) {
                        next.push(exit);
                    }
                }
            }

            if next.is_empty() {
                if !path.is_empty() {
                    branches.push(Branch {
                        steps: path,
                        grounded,
                    });
                }
            } else {
                // Reverse so the first continuation is walked first.
                for neighbor in next.into_iter().rev() {
                    stack.push(Frame {
                        pos: neighbor,
                        path: path.clone(),
                        grounded,
                    });
                }
            }
        }

        tracing::debug!("pathway walk from {} found {} branch(es)", start, branches.len());
        BranchPathway { branches }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SolveOptions;
    use crate::modules::ModuleKind;
    use crate::snapshot::{GridCell, Wire};

    fn pos(x: i32, y: i32) -> GridPos {
        GridPos::new(x, y)
    }

    /// Battery (VCC (0,0), GND (0,1)) -> resistor (2,0)-(3,0) -> LED
    /// (5,0)-(6,0) -> back to battery GND.
    fn build_loop_snapshot() -> GridSnapshot {
        let mut snapshot = GridSnapshot::new("loop");
        snapshot.add_cell(GridCell::new(pos(0, 0), "bat1", ModuleKind::Battery, 0));
        snapshot.add_cell(GridCell::new(pos(0, 1), "bat1", ModuleKind::Battery, 1));
        snapshot.add_cell(
            GridCell::new(pos(2, 0), "r1", ModuleKind::Resistor, 0).with_resistance(1000.0),
        );
        snapshot.add_cell(
            GridCell::new(pos(3, 0), "r1", ModuleKind::Resistor, 1).with_resistance(1000.0),
        );
        snapshot.add_cell(GridCell::new(pos(5, 0), "led1", ModuleKind::Led, 0));
        snapshot.add_cell(GridCell::new(pos(6, 0), "led1", ModuleKind::Led, 1));

        snapshot.add_wire(Wire::new("w1").with_segment(pos(0, 0), pos(2, 0)));
        snapshot.add_wire(Wire::new("w2").with_segment(pos(3, 0), pos(5, 0)));
        snapshot.add_wire(Wire::new("w3").with_segment(pos(6, 0), pos(0, 1)));
        snapshot
    }

    fn find(snapshot: &GridSnapshot, start: GridPos) -> BranchPathway {
        let registry = ModuleRegistry::with_builtin_modules();
        let graph = TopologyGraph::from_snapshot(snapshot, &SolveOptions::default());
        PathwayFinder::new(&graph, snapshot, &registry).find(start)
    }

    #[test]
    fn test_linear_loop_yields_ordered_branch() {
        let snapshot = build_loop_snapshot();
        let pathway = find(&snapshot, pos(0, 0));

        let main = pathway
            .branches
            .iter()
            .find(|b| b.len() == 3)
            .expect("main branch through resistor and LED");
        assert_eq!(main.component_ids(), vec!["bat1", "r1", "led1"]);
        assert!(main.grounded, "loop returns to the battery GND cell");
    }

    #[test]
    fn test_cycle_terminates() {
        let snapshot = build_loop_snapshot();
        // Bounded output even though the circuit is a loop.
        let pathway = find(&snapshot, pos(0, 0));
        assert!(pathway.branches.len() <= 4);
    }

    #[test]
    fn test_fork_yields_multiple_branches() {
        let mut snapshot = GridSnapshot::new("fork");
        snapshot.add_cell(GridCell::new(pos(0, 0), "bat1", ModuleKind::Battery, 0));
        snapshot.add_cell(GridCell::new(pos(0, 1), "bat1", ModuleKind::Battery, 1));
        snapshot.add_cell(
            GridCell::new(pos(3, 0), "r1", ModuleKind::Resistor, 0).with_resistance(470.0),
        );
        snapshot.add_cell(
            GridCell::new(pos(3, 2), "r2", ModuleKind::Resistor, 0).with_resistance(220.0),
        );

        // Fork at (1,0): one arm to each resistor.
        snapshot.add_wire(Wire::new("w1").with_segment(pos(0, 0), pos(1, 0)));
        snapshot.add_wire(Wire::new("w2").with_segment(pos(1, 0), pos(3, 0)));
        snapshot.add_wire(Wire::new("w3").with_segment(pos(1, 0), pos(3, 2)));

        let pathway = find(&snapshot, pos(0, 0));
        let with_r1 = pathway.branches.iter().any(|b| b.contains("r1"));
        let with_r2 = pathway.branches.iter().any(|b| b.contains("r2"));
        assert!(with_r1 && with_r2, "both fork arms are explored");
    }

    #[test]
    fn test_component_entered_once_all_exits_explored() {
        let snapshot = build_loop_snapshot();
        let pathway = find(&snapshot, pos(0, 0));

        for branch in &pathway.branches {
            let ids = branch.component_ids();
            let mut deduped = ids.clone();
            deduped.dedup();
            assert_eq!(ids, deduped, "no duplicate component entries in a branch");
        }
    }

    #[test]
    fn test_isolated_source_yields_source_only_branch() {
        let mut snapshot = GridSnapshot::new("isolated");
        snapshot.add_cell(GridCell::new(pos(0, 0), "bat1", ModuleKind::Battery, 0));
        snapshot.add_cell(GridCell::new(pos(0, 1), "bat1", ModuleKind::Battery, 1));
        snapshot.add_wire(Wire::new("w1").with_segment(pos(0, 0), pos(0, 1)));

        let pathway = find(&snapshot, pos(0, 0));
        assert_eq!(pathway.branches.len(), 1);
        assert_eq!(pathway.branches[0].component_ids(), vec!["bat1"]);
    }
}
