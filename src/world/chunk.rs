//! # Chunk
//!
//! One cube of the world grid. A chunk owns the solids describing its volume
//! and the surface most recently extracted from them, and never has more than
//! one extraction running.
//!
//! ## Spaces
//!
//! Solids, meshes and local graphs live in chunk-local space, where the chunk
//! is the unit cube `[0, 1]³`. `transform` places that cube in grid space and
//! `world_transform` places it in the world.

use cgmath::{InnerSpace, MetricSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    core::MtResource,
    meshing::{ExtractionSettings, MeshBuffer},
    navigation::NavGraph,
    task_management::Task,
    terrain::{LatticeCoordinate, NoiseGround, SolidStack, Transform},
};

use super::tasks::SurfaceExtractionTask;

/// Local distance from the chunk centre within which an edit is considered to
/// reach the chunk, before adding the edit radius.
const OVERLAP_THRESHOLD: f32 = 0.9;

/// Whether an edit adds or removes material.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    /// Add a filled sphere.
    #[default]
    Build,
    /// Carve a void sphere.
    Dig,
}

/// The published output of a chunk's latest extraction.
#[derive(Clone, Debug, Default)]
pub struct ChunkSurface {
    /// Render mesh, chunk-local
    pub mesh: MeshBuffer,
    /// Walkable graph, chunk-local
    pub nav_graph: NavGraph,
}

/// Published surface plus the chunk's outstanding-job flag, guarded together
/// so a publish is a single atomic swap.
#[derive(Debug, Default)]
pub(crate) struct SurfaceSlot {
    surface: ChunkSurface,
    job_outstanding: bool,
}

impl SurfaceSlot {
    pub(crate) fn publish(&mut self, mesh: MeshBuffer, nav_graph: NavGraph) {
        self.surface = ChunkSurface { mesh, nav_graph };
        self.job_outstanding = false;
    }

    pub(crate) fn abandon(&mut self) {
        self.job_outstanding = false;
    }
}

/// One cell of the world grid.
pub struct Chunk {
    position: LatticeCoordinate,
    transform: Transform,
    world_transform: Transform,
    solids: SolidStack,
    settings: ExtractionSettings,
    slot: MtResource<SurfaceSlot>,
}

impl Chunk {
    /// Creates an empty chunk.
    ///
    /// # Arguments
    /// * `position` - Coordinate of the chunk in the world grid
    /// * `transform` - Chunk-local to grid space
    /// * `grid_to_world` - Grid space to world space
    /// * `settings` - Extraction parameters used for every regeneration
    pub fn new(
        position: LatticeCoordinate,
        transform: Transform,
        grid_to_world: &Transform,
        settings: ExtractionSettings,
    ) -> Self {
        Chunk {
            position,
            transform,
            world_transform: transform.then(grid_to_world),
            solids: SolidStack::new(),
            settings,
            slot: MtResource::new(SurfaceSlot::default()),
        }
    }

    /// Coordinate of this chunk in the world grid.
    pub fn position(&self) -> LatticeCoordinate {
        self.position
    }

    /// Chunk-local to grid space.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Chunk-local to world space.
    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    /// The solids describing this chunk.
    pub fn solids(&self) -> &SolidStack {
        &self.solids
    }

    /// Adds a flat ground at a world height.
    pub fn add_ground(&mut self, world_height: f32) {
        let local = self
            .world_transform
            .inverse_transform_point(Point3::new(0.0, world_height, 0.0));
        self.solids.add_ground(local.y);
    }

    /// Adds a noise ground sampled in world space.
    pub fn add_noise_ground(&mut self, height: f32, scale: f32, frequency: f32, seed: u32) {
        self.solids.add_noise_ground(NoiseGround::new(
            self.world_transform,
            height,
            scale,
            frequency,
            seed,
        ));
    }

    /// Starts a regeneration unless one is already running.
    ///
    /// # Returns
    /// The extraction task for the caller to schedule, or `None` when this
    /// chunk already has a job outstanding.
    pub fn regenerate_async(&self) -> Option<Box<dyn Task + Send>> {
        let mut slot = self.slot.lock();
        if slot.job_outstanding {
            return None;
        }
        slot.job_outstanding = true;

        Some(Box::new(SurfaceExtractionTask::new(
            self.position,
            self.solids.clone(),
            self.settings,
            self.slot.clone(),
        )))
    }

    /// Applies a spherical edit given in world space and starts a regeneration.
    ///
    /// # Returns
    /// The extraction task, or `None` if a job was already outstanding. The
    /// edit is recorded either way.
    pub fn edit(
        &mut self,
        world_point: Point3<f32>,
        radius: f32,
        mode: EditMode,
    ) -> Option<Box<dyn Task + Send>> {
        let center = self.world_transform.inverse_transform_point(world_point);
        let local_radius = self.local_radius(radius);
        match mode {
            EditMode::Build => self.solids.fill(center, local_radius),
            EditMode::Dig => self.solids.erode(center, local_radius),
        }
        self.regenerate_async()
    }

    /// Broad-phase test for whether a world-space sphere reaches this chunk.
    ///
    /// Compares the sphere centre's local distance from the cube centre with
    /// a fixed threshold plus the local radius. Conservative, not exact.
    pub fn overlaps_sphere(&self, world_center: Point3<f32>, radius: f32) -> bool {
        let local = self.world_transform.inverse_transform_point(world_center);
        local.distance(Point3::new(0.5, 0.5, 0.5)) < OVERLAP_THRESHOLD + self.local_radius(radius)
    }

    fn local_radius(&self, radius: f32) -> f32 {
        let diagonal = Vector3::new(1.0, 1.0, 1.0).normalize() * radius;
        self.world_transform
            .inverse_transform_vector(diagonal)
            .magnitude()
    }

    /// Whether an extraction is running for this chunk.
    pub fn is_regenerating(&self) -> bool {
        self.slot.lock().job_outstanding
    }

    /// Copy of the most recently published surface.
    pub fn surface(&self) -> ChunkSurface {
        self.slot.lock().surface.clone()
    }

    /// Copy of the most recently published local graph.
    pub fn nav_graph(&self) -> NavGraph {
        self.slot.lock().surface.nav_graph.clone()
    }

    /// Merges this chunk's published graph into `graph`, rebased into grid
    /// space, while holding the slot's lock.
    pub fn merge_into(&self, graph: &mut NavGraph) {
        let slot = self.slot.lock();
        graph.merge(
            &slot.surface.nav_graph,
            self.position,
            self.settings.resolution,
            &self.transform,
        );
    }

    /// Replaces solids and local graph with saved state. The mesh is cleared
    /// until the next regeneration.
    pub(crate) fn restore(&mut self, solids: SolidStack, nav_graph: NavGraph) {
        self.solids = solids;
        self.slot.lock().surface = ChunkSurface {
            mesh: MeshBuffer::new(),
            nav_graph,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TerrainEvent;

    fn unit_chunk() -> Chunk {
        Chunk::new(
            LatticeCoordinate::new(0, 0, 0),
            Transform::identity(),
            &Transform::identity(),
            ExtractionSettings {
                resolution: 4,
                ..Default::default()
            },
        )
    }

    #[test]
    fn at_most_one_job_per_chunk() {
        let mut chunk = unit_chunk();
        chunk.add_ground(0.55);

        let task = chunk.regenerate_async().unwrap();
        assert!(chunk.is_regenerating());
        assert!(chunk.regenerate_async().is_none());

        let events = task.process().handle_result();
        assert_eq!(
            events,
            vec![TerrainEvent::MeshReady {
                chunk: LatticeCoordinate::new(0, 0, 0)
            }]
        );
        assert!(!chunk.is_regenerating());
        assert_eq!(chunk.surface().mesh.quad_count(), 16);
        assert!(chunk.regenerate_async().is_some());
    }

    #[test]
    fn failed_job_keeps_surface_and_frees_chunk() {
        let mut chunk = unit_chunk();
        chunk.add_ground(0.55);
        chunk.regenerate_async().unwrap().process().handle_result();

        let task = chunk.regenerate_async().unwrap();
        let events = task.failed().handle_result();

        assert_eq!(
            events,
            vec![TerrainEvent::ExtractionFailed {
                chunk: LatticeCoordinate::new(0, 0, 0)
            }]
        );
        assert!(!chunk.is_regenerating());
        assert_eq!(chunk.surface().mesh.quad_count(), 16);
        assert!(chunk.regenerate_async().is_some());
    }

    #[test]
    fn job_reads_solids_as_of_creation() {
        let mut chunk = unit_chunk();
        chunk.add_ground(0.55);
        let task = chunk.regenerate_async().unwrap();

        chunk.edit(Point3::new(0.5, 0.55, 0.5), 0.3, EditMode::Dig);
        task.process().handle_result();

        assert_eq!(chunk.surface().mesh.quad_count(), 16);
        assert_eq!(chunk.solids().len(), 2);
    }

    #[test]
    fn overlap_uses_scaled_radius() {
        let chunk = Chunk::new(
            LatticeCoordinate::new(1, 0, 0),
            Transform::new(Vector3::new(10.0, 0.0, 0.0), 10.0),
            &Transform::identity(),
            ExtractionSettings::default(),
        );
        assert!(chunk.overlaps_sphere(Point3::new(15.0, 5.0, 5.0), 0.0));
        assert!(!chunk.overlaps_sphere(Point3::new(-5.0, 5.0, 5.0), 1.0));
        assert!(chunk.overlaps_sphere(Point3::new(-5.0, 5.0, 5.0), 12.0));
    }

    #[test]
    fn ground_height_is_given_in_world_units() {
        let mut chunk = Chunk::new(
            LatticeCoordinate::new(0, 1, 0),
            Transform::new(Vector3::new(0.0, 10.0, 0.0), 10.0),
            &Transform::identity(),
            ExtractionSettings::default(),
        );
        chunk.add_ground(15.0);
        let top = chunk.solids().iter().next().cloned();
        assert_eq!(top, Some(crate::terrain::Solid::Ground { height: 0.5 }));
    }
}
