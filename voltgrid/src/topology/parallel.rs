//! Parallel-Branch Detection
//!
//! Groups resistors that share two or more junction positions into parallel
//! groups and derives their combined resistance via the reciprocal-sum law.
//! Deliberately heuristic and topology-local: resistors only, literal shared
//! positions only; mixed-type parallel meshes are out of model.

use std::collections::HashSet;

use crate::snapshot::{GridPos, GridSnapshot};
use crate::topology::graph::TopologyGraph;

/// A set of resistors electrically in parallel across the same junctions.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelBranch {
    pub component_ids: Vec<String>,
    pub resistances: Vec<f64>,
    /// `1 / Σ(1/Rᵢ)`; 0 with no usable resistances, `R₁` with exactly one.
    pub combined_resistance: f64,
    /// Filled by the solver.
    pub voltage: f64,
    pub current: f64,
}

impl ParallelBranch {
    pub fn new(component_ids: Vec<String>, resistances: Vec<f64>) -> Self {
        let combined_resistance = combine_parallel(&resistances);
        Self {
            component_ids,
            resistances,
            combined_resistance,
            voltage: 0.0,
            current: 0.0,
        }
    }

    pub fn contains(&self, component_id: &str) -> bool {
        self.component_ids.iter().any(|id| id == component_id)
    }
}

/// Reciprocal-sum law. Resistances that are zero or negative cannot
/// contribute a finite reciprocal and are skipped.
pub fn combine_parallel(resistances: &[f64]) -> f64 {
    let usable: Vec<f64> = resistances.iter().copied().filter(|&r| r > 0.0).collect();
    match usable.len() {
        0 => 0.0,
        1 => usable[0],
        _ => {
            let reciprocal_sum: f64 = usable.iter().map(|r| 1.0 / r).sum();
            1.0 / reciprocal_sum
        }
    }
}

/// Detect groups of resistors whose adjacency sets intersect in two or more
/// positions.
pub fn detect_parallel_branches(
    graph: &TopologyGraph,
    snapshot: &GridSnapshot,
) -> Vec<ParallelBranch> {
    // Resistor id -> (cells, adjacency set), in first-appearance order.
    let mut resistors: Vec<(String, HashSet<GridPos>)> = Vec::new();
    for id in snapshot.component_ids() {
        if !snapshot.component_kind(id).is_resistor() {
            continue;
        }
        let positions: Vec<GridPos> = snapshot
            .component_cells(id)
            .iter()
            .map(|c| c.position)
            .collect();
        resistors.push((id.to_string(), graph.adjacency_set(&positions)));
    }

    let mut processed: HashSet<usize> = HashSet::new();
    let mut groups = Vec::new();

    for i in 0..resistors.len() {
        if processed.contains(&i) {
            continue;
        }
        let mut members = vec![i];
        for j in (i + 1)..resistors.len() {
            if processed.contains(&j) {
                continue;
            }
            let shared = resistors[i].1.intersection(&resistors[j].1).count();
            if shared >= 2 {
                members.push(j);
            }
        }

        if members.len() < 2 {
            continue;
        }

        let mut component_ids = Vec::new();
        let mut resistances = Vec::new();
        for &index in &members {
            processed.insert(index);
            let id = resistors[index].0.clone();
            let resistance = snapshot
                .component_properties(&id)
                .resistance
                .unwrap_or(0.0);
            component_ids.push(id);
            resistances.push(resistance);
        }
        groups.push(ParallelBranch::new(component_ids, resistances));
    }

    tracing::debug!("detected {} parallel resistor group(s)", groups.len());
    groups
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

    fn resistor(snapshot: &mut GridSnapshot, id: &str, a: GridPos, b: GridPos, ohms: f64) {
        snapshot.add_cell(GridCell::new(a, id, ModuleKind::Resistor, 0).with_resistance(ohms));
        snapshot.add_cell(GridCell::new(b, id, ModuleKind::Resistor, 1).with_resistance(ohms));
    }

    /// Two resistors strapped across the same pair of junctions (1,0) and
    /// (6,0).
    fn build_parallel_snapshot() -> GridSnapshot {
        let mut snapshot = GridSnapshot::new("parallel");
        resistor(&mut snapshot, "r1", pos(2, 0), pos(3, 0), 1000.0);
        resistor(&mut snapshot, "r2", pos(2, 2), pos(3, 2), 1000.0);

        snapshot.add_wire(Wire::new("w1").with_segment(pos(1, 0), pos(2, 0)));
        snapshot.add_wire(Wire::new("w2").with_segment(pos(1, 0), pos(2, 2)));
        snapshot.add_wire(Wire::new("w3").with_segment(pos(3, 0), pos(6, 0)));
        snapshot.add_wire(Wire::new("w4").with_segment(pos(3, 2), pos(6, 0)));
        snapshot
    }

    #[test]
    fn test_combine_parallel_law() {
        assert_eq!(combine_parallel(&[]), 0.0);
        assert_eq!(combine_parallel(&[1000.0]), 1000.0);
        assert!((combine_parallel(&[1000.0, 1000.0]) - 500.0).abs() < 1e-9);
        assert!((combine_parallel(&[1000.0, 2000.0]) - 666.666_666_666).abs() < 1e-3);
        // Zero entries cannot contribute a reciprocal.
        assert_eq!(combine_parallel(&[0.0, 0.0]), 0.0);
        assert_eq!(combine_parallel(&[0.0, 470.0]), 470.0);
    }

    #[test]
    fn test_two_shared_junctions_group() {
        let snapshot = build_parallel_snapshot();
        let graph = TopologyGraph::from_snapshot(&snapshot, &SolveOptions::default());
        let groups = detect_parallel_branches(&graph, &snapshot);

        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains("r1"));
        assert!(groups[0].contains("r2"));
        assert!((groups[0].combined_resistance - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_shared_junction_does_not_group() {
        let mut snapshot = GridSnapshot::new("series");
        resistor(&mut snapshot, "r1", pos(2, 0), pos(3, 0), 1000.0);
        resistor(&mut snapshot, "r2", pos(5, 0), pos(6, 0), 2000.0);
        // Series connection: one shared junction at (4,0).
        snapshot.add_wire(Wire::new("w1").with_segment(pos(3, 0), pos(4, 0)));
        snapshot.add_wire(Wire::new("w2").with_segment(pos(4, 0), pos(5, 0)));

        let graph = TopologyGraph::from_snapshot(&snapshot, &SolveOptions::default());
        let groups = detect_parallel_branches(&graph, &snapshot);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_non_resistors_ignored() {
        let mut snapshot = build_parallel_snapshot();
        snapshot.add_cell(GridCell::new(pos(2, 4), "led1", ModuleKind::Led, 0));
        snapshot.add_cell(GridCell::new(pos(3, 4), "led1", ModuleKind::Led, 1));
        snapshot.add_wire(Wire::new("w5").with_segment(pos(1, 0), pos(2, 4)));
        snapshot.add_wire(Wire::new("w6").with_segment(pos(3, 4), pos(6, 0)));

        let graph = TopologyGraph::from_snapshot(&snapshot, &SolveOptions::default());
        let groups = detect_parallel_branches(&graph, &snapshot);

        assert_eq!(groups.len(), 1);
        assert!(!groups[0].contains("led1"));
    }
}
