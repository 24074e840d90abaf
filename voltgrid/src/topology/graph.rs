//! Topology Extraction
//!
//! Builds the undirected position-adjacency graph the rest of the pipeline
//! walks. Each wire segment contributes one edge between its two endpoint
//! positions. When a snapshot carries no wires at all, immediately adjacent
//! occupied cells are connected instead: touching components conduct. That
//! fallback is part of the contract.

use petgraph::graphmap::UnGraphMap;
use std::collections::HashSet;

use crate::core::SolveOptions;
use crate::snapshot::{GridPos, GridSnapshot};

/// Undirected electrical adjacency between grid positions.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    graph: UnGraphMap<GridPos, ()>,
}

impl Default for TopologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraphMap::new(),
        }
    }

    /// Extract the adjacency graph from a snapshot.
    pub fn from_snapshot(snapshot: &GridSnapshot, options: &SolveOptions) -> Self {
        let mut topology = Self::new();

        for wire in &snapshot.wires {
            for segment in &wire.segments {
                topology.connect(segment.from, segment.to);
            }
        }

        // No wires anywhere: fall back to implicit adjacency between
        // touching occupied cells.
        if snapshot.wires.is_empty() && options.grid_adjacency_fallback {
            let occupied: HashSet<GridPos> = snapshot.occupied_positions().collect();
            for &pos in &occupied {
                for neighbor in pos.neighbors4() {
                    if occupied.contains(&neighbor) {
                        topology.connect(pos, neighbor);
                    }
                }
            }
        }

        tracing::debug!(
            "topology graph built: {} positions, {} connections",
            topology.position_count(),
            topology.connection_count()
        );

        topology
    }

    /// Add an undirected connection between two positions.
    pub fn connect(&mut self, a: GridPos, b: GridPos) {
        if a == b {
            return;
        }
        self.graph.add_edge(a, b, ());
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.graph.contains_node(pos)
    }

    /// Positions electrically connected to `pos`. Empty for positions the
    /// graph has never seen.
    pub fn neighbors(&self, pos: GridPos) -> Vec<GridPos> {
        if !self.graph.contains_node(pos) {
            return Vec::new();
        }
        let mut neighbors: Vec<GridPos> = self.graph.neighbors(pos).collect();
        neighbors.sort();
        neighbors
    }

    /// Union of the neighbor sets of `positions`, minus the positions
    /// themselves. This is a component's junction footprint.
    pub fn adjacency_set(&self, positions: &[GridPos]) -> HashSet<GridPos> {
        let own: HashSet<GridPos> = positions.iter().copied().collect();
        let mut adjacency = HashSet::new();
        for &pos in positions {
            for neighbor in self.neighbors(pos) {
                if !own.contains(&neighbor) {
                    adjacency.insert(neighbor);
                }
            }
        }
        adjacency
    }

    /// All graph positions owned by a component, sorted for determinism.
    pub fn positions_of_component(
        &self,
        snapshot: &GridSnapshot,
        component_id: &str,
    ) -> Vec<GridPos> {
        let mut positions: Vec<GridPos> = self
            .graph
            .nodes()
            .filter(|&pos| {
                snapshot
                    .cell_at(pos)
                    .map(|c| c.component_id == component_id)
                    .unwrap_or(false)
            })
            .collect();
        positions.sort();
        positions
    }

    pub fn position_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }
}
