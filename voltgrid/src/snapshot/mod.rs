//! Snapshot input model and JSON loading.
//!
//! See [`schema`] for the data types. Loading helpers live on
//! [`crate::core`] so that all file-level error handling goes through
//! [`crate::core::CircuitError`].

pub mod schema;

pub use schema::{
    ComponentProperties, GridCell, GridPos, GridSnapshot, LogicLevel, PinState, PinStates,
    SnapshotMetadata, Wire, WireSegment,
};
