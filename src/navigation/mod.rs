//! # Navigation
//!
//! The walkable graph built alongside extracted surfaces, its path search and
//! its persisted form.

pub mod graph;
pub mod search;
pub mod serial;

pub use graph::NavGraph;
pub use serial::{CellConnection, CellPosition, SerializableNavGraph};
