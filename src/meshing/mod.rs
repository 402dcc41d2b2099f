//! # Meshing
//!
//! Turns density fields into render meshes and navigation graphs.

pub mod extraction;
pub mod mesh_buffer;

pub use extraction::{extract, Extraction, ExtractionSettings};
pub use mesh_buffer::{MeshBuffer, SurfaceVertex};
