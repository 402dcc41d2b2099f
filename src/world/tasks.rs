//! # Surface Extraction Task
//!
//! Runs [`extract`] for one chunk on a worker thread and publishes the output
//! back into the chunk's surface slot on the ticking thread.

use log::{debug, warn};
use web_time::{Duration, Instant};

use crate::{
    core::MtResource,
    events::TerrainEvent,
    meshing::{extract, Extraction, ExtractionSettings},
    task_management::{Task, TaskResult},
    terrain::{LatticeCoordinate, SolidStack},
};

use super::chunk::SurfaceSlot;

/// Extracts one chunk from a frozen copy of its solids.
pub struct SurfaceExtractionTask {
    /// Grid coordinate of the chunk being extracted
    chunk: LatticeCoordinate,
    /// Snapshot of the chunk's solids taken when the task was created
    solids: SolidStack,
    settings: ExtractionSettings,
    /// Where the output is published
    slot: MtResource<SurfaceSlot>,
}

impl SurfaceExtractionTask {
    /// Creates an extraction task.
    ///
    /// # Arguments
    /// * `chunk` - Grid coordinate of the chunk
    /// * `solids` - Snapshot of the chunk's solids; later edits do not reach it
    /// * `settings` - Extraction parameters
    /// * `slot` - The chunk's surface slot, shared with the chunk
    pub(crate) fn new(
        chunk: LatticeCoordinate,
        solids: SolidStack,
        settings: ExtractionSettings,
        slot: MtResource<SurfaceSlot>,
    ) -> Self {
        SurfaceExtractionTask {
            chunk,
            solids,
            settings,
            slot,
        }
    }
}

impl Task for SurfaceExtractionTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        let start = Instant::now();
        let extraction = extract(&self.solids, &self.settings);

        Box::new(SurfaceExtractionResult {
            chunk: self.chunk,
            extraction: Some(extraction),
            slot: self.slot.clone(),
            elapsed: start.elapsed(),
        })
    }

    fn failed(&self) -> Box<dyn TaskResult + Send> {
        Box::new(SurfaceExtractionResult {
            chunk: self.chunk,
            extraction: None,
            slot: self.slot.clone(),
            elapsed: Duration::ZERO,
        })
    }
}

/// A finished extraction waiting to be published.
pub struct SurfaceExtractionResult {
    chunk: LatticeCoordinate,
    /// `None` when the extraction panicked
    extraction: Option<Extraction>,
    slot: MtResource<SurfaceSlot>,
    elapsed: Duration,
}

impl TaskResult for SurfaceExtractionResult {
    /// Swaps the new mesh and graph into the chunk and clears its
    /// outstanding-job flag, both under the slot's lock. A failed extraction
    /// only clears the flag and leaves the previous surface in place.
    fn handle_result(self: Box<Self>) -> Vec<TerrainEvent> {
        let Some(Extraction { mesh, nav_graph }) = self.extraction else {
            warn!("Extraction of chunk {} failed, keeping its previous surface", self.chunk);
            self.slot.lock().abandon();
            return vec![TerrainEvent::ExtractionFailed { chunk: self.chunk }];
        };
        debug!(
            "Chunk {} extracted in {:?}: {} triangles, {} nodes",
            self.chunk,
            self.elapsed,
            mesh.triangle_count(),
            nav_graph.node_count()
        );

        self.slot.lock().publish(mesh, nav_graph);
        vec![TerrainEvent::MeshReady { chunk: self.chunk }]
    }
}
