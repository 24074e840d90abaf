//! Circuit topology: adjacency extraction, source location, branch
//! enumeration, and parallel-group detection.
//!
//! Pipeline order: [`graph::TopologyGraph`] → [`sources`] →
//! [`pathways::PathwayFinder`] → [`parallel::detect_parallel_branches`].

pub mod graph;
pub mod parallel;
pub mod pathways;
pub mod sources;

pub use graph::TopologyGraph;
pub use parallel::{combine_parallel, detect_parallel_branches, ParallelBranch};
pub use pathways::{Branch, BranchPathway, BranchStep, PathwayFinder};
pub use sources::{
    is_groundable_cell, locate_ground_points, locate_power_sources, GroundPoint, PowerSource,
};
