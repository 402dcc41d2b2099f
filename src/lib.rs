#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Nav Terrain
//!
//! Editable voxel terrain with a walkable navigation graph.
//!
//! Terrain is described implicitly, as a stack of primitive solids per chunk.
//! A dual-contouring pass turns each chunk's density field into a render mesh
//! and, from the same dual vertices, a navigation graph. Chunk graphs are
//! rebased into one world graph that answers path queries.
//!
//! ## Key Modules
//!
//! * `terrain` - Solids, density fields, lattice coordinates and transforms
//! * `meshing` - Surface extraction and mesh buffers
//! * `navigation` - The navigation graph, A* search and its persisted form
//! * `world` - Chunks and the world grid that edits and regenerates them
//! * `task_management` - The worker pool extraction runs on
//! * `persistence` - JSON snapshots of graphs and whole grids
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Point3;
//! use voxel_nav_terrain::{TerrainConfig, Transform, WorldGrid};
//!
//! let mut grid = WorldGrid::new(TerrainConfig::default(), Transform::identity()).unwrap();
//! grid.initialize();
//!
//! // Once per tick:
//! if grid.poll_completion() {
//!     grid.dig(Point3::new(20.0, 3.5, 20.0), 2.0);
//! }
//!
//! let path = grid.find_path(Point3::new(5.0, 4.0, 5.0), Point3::new(40.0, 4.0, 40.0));
//! ```

use log::info;

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod meshing;
pub mod navigation;
pub mod persistence;
pub mod task_management;
pub mod terrain;
pub mod world;

pub use config::TerrainConfig;
pub use error::{TerrainError, TerrainResult};
pub use events::{TerrainEvent, TerrainEventSink};
pub use navigation::NavGraph;
pub use terrain::{LatticeCoordinate, Transform};
pub use world::{EditMode, WorldGrid};

/// Installs an `env_logger` logger writing to stdout, filtered by `RUST_LOG`.
///
/// The library never installs a logger on its own; binaries call this once at
/// startup.
pub fn init_logger() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}
