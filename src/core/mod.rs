//! # Core Module
//!
//! Shared-ownership primitives used across the terrain engine.
//!
//! ## Key Components
//! - `MtResource`: thread-safe reference-counted slot guarded by one mutex,
//!   used for every value a background task writes and the ticking thread
//!   reads (a chunk's published mesh and navigation graph).

pub mod mt_resource;

pub use mt_resource::MtResource;
