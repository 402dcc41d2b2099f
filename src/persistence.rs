//! # Persistence
//!
//! JSON save and load for navigation graphs and whole-terrain snapshots.
//! Graphs are written in their flat [`SerializableNavGraph`] form.
//!
//! [`SerializableNavGraph`]: crate::navigation::SerializableNavGraph

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{TerrainError, TerrainResult},
    navigation::NavGraph,
    terrain::{LatticeCoordinate, SolidStack},
};

/// Saved state of one chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    /// Grid coordinate of the chunk
    pub coordinate: LatticeCoordinate,
    /// The chunk's solids, oldest first
    pub solids: SolidStack,
    /// The chunk's local graph
    pub nav_graph: NavGraph,
}

/// Saved state of a whole world grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainSnapshot {
    /// Lattice cells per chunk axis when the snapshot was taken
    pub resolution: u32,
    /// Every chunk, in grid order
    pub chunks: Vec<ChunkSnapshot>,
    /// The merged graph
    pub nav_graph: NavGraph,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> TerrainResult<()> {
    let file = File::create(path).map_err(|e| TerrainError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush().map_err(|e| TerrainError::io(path, e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> TerrainResult<T> {
    let file = File::open(path).map_err(|e| TerrainError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes a snapshot as JSON.
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &TerrainSnapshot) -> TerrainResult<()> {
    let path = path.as_ref();
    write_json(path, snapshot)?;
    info!(
        "Saved {} chunk terrain snapshot to {}",
        snapshot.chunks.len(),
        path.display()
    );
    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: impl AsRef<Path>) -> TerrainResult<TerrainSnapshot> {
    let path = path.as_ref();
    let snapshot: TerrainSnapshot = read_json(path)?;
    info!(
        "Loaded {} chunk terrain snapshot from {}",
        snapshot.chunks.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Writes a navigation graph as JSON.
pub fn save_nav_graph(path: impl AsRef<Path>, graph: &NavGraph) -> TerrainResult<()> {
    write_json(path.as_ref(), graph)
}

/// Reads a navigation graph written by [`save_nav_graph`].
pub fn load_nav_graph(path: impl AsRef<Path>) -> TerrainResult<NavGraph> {
    read_json(path.as_ref())
}
