//! # World
//!
//! Chunks, the grid that owns them, and the background extraction that keeps
//! their surfaces current.

pub mod chunk;
pub mod grid;
pub mod tasks;

pub use chunk::{Chunk, ChunkSurface, EditMode};
pub use grid::WorldGrid;
