//! # Terrain Events
//!
//! Notifications the terrain raises for collaborators outside the core (UI,
//! audio, renderers). The core never consumes its own events.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::terrain::LatticeCoordinate;

/// Something observable happened to the terrain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainEvent {
    /// An edit was accepted and touched at least one chunk.
    EditingStarted,
    /// Every outstanding regeneration has completed.
    EditingFinished,
    /// A chunk published a freshly extracted mesh and local graph.
    MeshReady {
        /// Grid coordinate of the chunk
        chunk: LatticeCoordinate,
    },
    /// A chunk's extraction panicked. The chunk keeps its previous surface
    /// and counts as finished.
    ExtractionFailed {
        /// Grid coordinate of the chunk
        chunk: LatticeCoordinate,
    },
    /// The merged world graph was rebuilt.
    GraphReady {
        /// Node count of the new graph
        nodes: usize,
        /// Undirected edge count of the new graph
        edges: usize,
    },
}

/// Receiver of [`TerrainEvent`]s.
pub trait TerrainEventSink: Send {
    /// Called on the ticking thread for every event, in order.
    fn on_event(&mut self, event: TerrainEvent);
}

impl TerrainEventSink for Sender<TerrainEvent> {
    fn on_event(&mut self, event: TerrainEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event);
    }
}

impl TerrainEventSink for Vec<TerrainEvent> {
    fn on_event(&mut self, event: TerrainEvent) {
        self.push(event);
    }
}
