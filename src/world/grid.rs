//! # World Grid
//!
//! A fixed 3D array of [`Chunk`]s with one merged navigation graph.
//!
//! ## Editing
//!
//! The grid keeps a single counter of outstanding extraction jobs. While it is
//! non-zero every edit is rejected (not queued), so callers wait for the
//! completion signal before editing again. Accepted edits touch every chunk
//! whose broad-phase test passes, and each touched chunk regenerates on the
//! worker pool.
//!
//! ## Completion
//!
//! [`WorldGrid::poll_completion`] is called once per tick. It applies finished
//! jobs without blocking, and once the counter drops to zero after a busy
//! cycle it rebuilds the merged graph from every chunk and swaps it in whole.

use std::{collections::BTreeSet, sync::Arc};

use cgmath::Point3;
use log::{debug, info};
use web_time::Instant;

use crate::{
    config::TerrainConfig,
    error::{TerrainError, TerrainResult},
    events::{TerrainEvent, TerrainEventSink},
    meshing::ExtractionSettings,
    navigation::NavGraph,
    persistence::{ChunkSnapshot, TerrainSnapshot},
    task_management::{Task, TaskManager},
    terrain::{LatticeCoordinate, Transform},
};

use super::chunk::{Chunk, ChunkSurface, EditMode};

/// The chunked terrain world.
pub struct WorldGrid {
    config: TerrainConfig,
    /// Grid space to world space
    transform: Transform,
    edit_mode: EditMode,
    chunks: Vec<Chunk>,
    task_manager: TaskManager,
    outstanding_jobs: usize,
    /// Set when jobs were spawned and the completion signal has not fired yet.
    cycle_pending: bool,
    nav_graph: Arc<NavGraph>,
    event_sink: Option<Box<dyn TerrainEventSink>>,
}

impl WorldGrid {
    /// Creates a grid with no chunks. Call [`initialize`](Self::initialize)
    /// to build them.
    ///
    /// # Arguments
    /// * `config` - Grid shape and terrain parameters; validated here
    /// * `transform` - Grid space to world space
    pub fn new(config: TerrainConfig, transform: Transform) -> TerrainResult<Self> {
        config.validate()?;
        let task_manager = TaskManager::new(config.worker_threads);

        Ok(WorldGrid {
            config,
            transform,
            edit_mode: EditMode::default(),
            chunks: Vec::new(),
            task_manager,
            outstanding_jobs: 0,
            cycle_pending: false,
            nav_graph: Arc::new(NavGraph::new()),
            event_sink: None,
        })
    }

    fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            resolution: self.config.resolution,
            material_scale: self.config.material_scale,
            connect_face_diagonals: self.config.connect_face_diagonals,
        }
    }

    fn chunk_index(&self, c: LatticeCoordinate) -> Option<usize> {
        let xz = self.config.size_xz as i32;
        let y = self.config.size_y as i32;
        let inside = (0..xz).contains(&c.x) && (0..y).contains(&c.y) && (0..xz).contains(&c.z);
        inside.then(|| ((c.x * y + c.y) * xz + c.z) as usize)
    }

    /// Replaces every chunk with a fresh one seeded with noise ground and
    /// starts an extraction for each.
    pub fn initialize(&mut self) {
        let start = Instant::now();
        let settings = self.extraction_settings();
        let scale = self.config.chunk_scale;

        self.chunks.clear();
        self.chunks.reserve(self.config.chunk_count());
        for x in 0..self.config.size_xz as i32 {
            for y in 0..self.config.size_y as i32 {
                for z in 0..self.config.size_xz as i32 {
                    let position = LatticeCoordinate::new(x, y, z);
                    let offset = cgmath::Vector3::new(x as f32, y as f32, z as f32) * scale;
                    let mut chunk = Chunk::new(
                        position,
                        Transform::new(offset, scale),
                        &self.transform,
                        settings,
                    );
                    chunk.add_noise_ground(
                        self.config.ground_height,
                        self.config.noise_scale,
                        self.config.noise_frequency,
                        self.config.noise_seed,
                    );
                    self.chunks.push(chunk);
                }
            }
        }
        self.nav_graph = Arc::new(NavGraph::new());

        let spawned = self.regenerate_all();
        info!(
            "Initialized {}x{}x{} chunk grid, {} extractions started in {:?}",
            self.config.size_xz,
            self.config.size_y,
            self.config.size_xz,
            spawned,
            start.elapsed()
        );
    }

    fn spawn(&mut self, task: Box<dyn Task + Send>) {
        self.task_manager.publish_task(task);
        self.outstanding_jobs += 1;
        self.cycle_pending = true;
    }

    fn emit(&mut self, event: TerrainEvent) {
        debug!("Terrain event: {event:?}");
        if let Some(sink) = self.event_sink.as_mut() {
            sink.on_event(event);
        }
    }

    /// Re-runs extraction on every chunk without editing. Chunks that are
    /// already regenerating are skipped.
    ///
    /// # Returns
    /// The number of extractions started.
    pub fn regenerate_all(&mut self) -> usize {
        let tasks: Vec<_> = self
            .chunks
            .iter()
            .filter_map(Chunk::regenerate_async)
            .collect();
        let spawned = tasks.len();
        for task in tasks {
            self.spawn(task);
        }
        spawned
    }

    /// Applies a spherical edit in world space.
    ///
    /// # Returns
    /// `false` if the edit was rejected because jobs are still outstanding,
    /// `true` otherwise, even when no chunk was close enough to be touched.
    pub fn edit(&mut self, world_point: Point3<f32>, radius: f32, mode: EditMode) -> bool {
        if self.outstanding_jobs > 0 {
            info!(
                "{mode:?} at {world_point:?} rejected, {} jobs outstanding",
                self.outstanding_jobs
            );
            return false;
        }

        let mut touched = 0;
        let mut tasks = Vec::new();
        for chunk in &mut self.chunks {
            if chunk.overlaps_sphere(world_point, radius) {
                touched += 1;
                tasks.extend(chunk.edit(world_point, radius, mode));
            }
        }
        for task in tasks {
            self.spawn(task);
        }

        info!("{mode:?} at {world_point:?} radius {radius} touched {touched} chunks");
        if touched > 0 {
            self.emit(TerrainEvent::EditingStarted);
        }
        true
    }

    /// Removes material inside a world-space sphere.
    pub fn dig(&mut self, world_point: Point3<f32>, radius: f32) -> bool {
        self.edit(world_point, radius, EditMode::Dig)
    }

    /// Adds material inside a world-space sphere.
    pub fn build(&mut self, world_point: Point3<f32>, radius: f32) -> bool {
        self.edit(world_point, radius, EditMode::Build)
    }

    /// Edits at `world_point` with the current edit mode and the configured
    /// build radius.
    pub fn hit(&mut self, world_point: Point3<f32>) -> bool {
        self.edit(world_point, self.config.build_radius, self.edit_mode)
    }

    /// Sets the mode used by [`hit`](Self::hit).
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    /// Mode used by [`hit`](Self::hit).
    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    /// Applies finished jobs and, once none are outstanding after a busy
    /// cycle, signals completion and rebuilds the merged graph.
    ///
    /// Never blocks.
    ///
    /// # Returns
    /// `true` when no jobs are outstanding.
    pub fn poll_completion(&mut self) -> bool {
        let mut events = Vec::new();
        let handled = self.task_manager.process_completed_tasks(&mut events);
        self.outstanding_jobs = self.outstanding_jobs.saturating_sub(handled);
        for event in events {
            self.emit(event);
        }

        if self.outstanding_jobs == 0 && self.cycle_pending {
            self.cycle_pending = false;
            self.emit(TerrainEvent::EditingFinished);
            self.rebuild_nav_graph();
            let (nodes, edges) = (self.nav_graph.node_count(), self.nav_graph.edge_count());
            self.emit(TerrainEvent::GraphReady { nodes, edges });
        }

        self.outstanding_jobs == 0
    }

    fn rebuild_nav_graph(&mut self) {
        let start = Instant::now();
        let mut graph = NavGraph::new();
        for chunk in &self.chunks {
            chunk.merge_into(&mut graph);
        }
        info!(
            "Rebuilt navigation graph: {} nodes, {} edges in {:?}",
            graph.node_count(),
            graph.edge_count(),
            start.elapsed()
        );
        self.nav_graph = Arc::new(graph);
    }

    /// Finds a walkable path between two world points.
    ///
    /// # Returns
    /// World-space node positions from the node nearest `from_world` to the
    /// node nearest `to_world`, or `None` if the graph is empty or they are
    /// not connected.
    pub fn find_path(
        &self,
        from_world: Point3<f32>,
        to_world: Point3<f32>,
    ) -> Option<Vec<Point3<f32>>> {
        let from = self.transform.inverse_transform_point(from_world);
        let to = self.transform.inverse_transform_point(to_world);
        let Some(path) = self.nav_graph.find_path(from, to) else {
            debug!("No path between {from_world:?} and {to_world:?}");
            return None;
        };

        Some(
            self.nav_graph
                .path_positions(&path)
                .into_iter()
                .map(|p| self.transform.transform_point(p))
                .collect(),
        )
    }

    /// Merged-graph node nearest to a world point.
    pub fn closest_node(&self, world_point: Point3<f32>) -> Option<LatticeCoordinate> {
        self.nav_graph
            .closest_node(self.transform.inverse_transform_point(world_point))
    }

    /// The current merged graph, in grid space. Holding the returned handle
    /// keeps that version alive across later rebuilds.
    pub fn nav_graph(&self) -> Arc<NavGraph> {
        Arc::clone(&self.nav_graph)
    }

    /// The chunk at a grid coordinate.
    pub fn chunk(&self, coordinate: LatticeCoordinate) -> TerrainResult<&Chunk> {
        self.chunk_index(coordinate)
            .and_then(|i| self.chunks.get(i))
            .ok_or(TerrainError::UnknownChunk {
                x: coordinate.x,
                y: coordinate.y,
                z: coordinate.z,
            })
    }

    /// Copy of the surface last published by a chunk.
    pub fn chunk_surface(&self, coordinate: LatticeCoordinate) -> TerrainResult<ChunkSurface> {
        self.chunk(coordinate).map(Chunk::surface)
    }

    /// Iterates chunks in grid order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    /// Extraction jobs started and not yet applied.
    pub fn outstanding_jobs(&self) -> usize {
        self.outstanding_jobs
    }

    /// Installs the receiver for terrain events.
    pub fn set_event_sink(&mut self, sink: Box<dyn TerrainEventSink>) {
        self.event_sink = Some(sink);
    }

    /// The configuration this grid was built from.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Grid space to world space.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Captures every chunk's solids and local graph plus the merged graph.
    pub fn snapshot(&self) -> TerrainSnapshot {
        TerrainSnapshot {
            resolution: self.config.resolution,
            chunks: self
                .chunks
                .iter()
                .map(|chunk| ChunkSnapshot {
                    coordinate: chunk.position(),
                    solids: chunk.solids().clone(),
                    nav_graph: chunk.nav_graph(),
                })
                .collect(),
            nav_graph: (*self.nav_graph).clone(),
        }
    }

    /// Loads a snapshot taken from a grid of the same shape.
    ///
    /// Meshes are not part of a snapshot; they stay empty until
    /// [`regenerate_all`](Self::regenerate_all) runs.
    ///
    /// # Returns
    /// `Ok(false)` without changing anything while jobs are outstanding.
    ///
    /// # Errors
    /// [`TerrainError::SnapshotMismatch`] if the resolution or chunk count
    /// differs or a coordinate appears twice, [`TerrainError::UnknownChunk`] if
    /// a chunk lies outside the grid.
    pub fn restore(&mut self, snapshot: TerrainSnapshot) -> TerrainResult<bool> {
        if self.outstanding_jobs > 0 {
            return Ok(false);
        }
        if snapshot.resolution != self.config.resolution {
            return Err(TerrainError::SnapshotMismatch {
                expected: format!("resolution {}", self.config.resolution),
                found: format!("resolution {}", snapshot.resolution),
            });
        }
        if snapshot.chunks.len() != self.chunks.len() {
            return Err(TerrainError::SnapshotMismatch {
                expected: format!("{} chunks", self.chunks.len()),
                found: format!("{} chunks", snapshot.chunks.len()),
            });
        }

        let mut placed = Vec::with_capacity(snapshot.chunks.len());
        let mut seen = BTreeSet::new();
        for saved in snapshot.chunks {
            let c = saved.coordinate;
            let index = self.chunk_index(c).ok_or(TerrainError::UnknownChunk {
                x: c.x,
                y: c.y,
                z: c.z,
            })?;
            if !seen.insert(index) {
                return Err(TerrainError::SnapshotMismatch {
                    expected: "one entry per chunk".to_string(),
                    found: format!("chunk {c} twice"),
                });
            }
            placed.push((index, saved));
        }
        for (index, saved) in placed {
            self.chunks[index].restore(saved.solids, saved.nav_graph);
        }
        self.nav_graph = Arc::new(snapshot.nav_graph);

        info!(
            "Restored {} chunks, merged graph has {} nodes",
            self.chunks.len(),
            self.nav_graph.node_count()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            size_xz: 2,
            size_y: 1,
            ground_height: 5.0,
            noise_scale: 0.0,
            chunk_scale: 10.0,
            resolution: 4,
            worker_threads: 2,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = TerrainConfig {
            worker_threads: 0,
            ..small_config()
        };
        assert!(WorldGrid::new(config, Transform::identity()).is_err());
    }

    #[test]
    fn chunk_lookup_checks_bounds() {
        let mut grid = WorldGrid::new(small_config(), Transform::identity()).unwrap();
        grid.initialize();

        let c = LatticeCoordinate::new(1, 0, 1);
        assert_eq!(grid.chunk(c).unwrap().position(), c);
        assert!(matches!(
            grid.chunk(LatticeCoordinate::new(0, 1, 0)),
            Err(TerrainError::UnknownChunk { x: 0, y: 1, z: 0 })
        ));
    }

    #[test]
    fn initialize_starts_one_job_per_chunk() {
        let mut grid = WorldGrid::new(small_config(), Transform::identity()).unwrap();
        grid.initialize();
        assert_eq!(grid.outstanding_jobs(), 4);
        assert_eq!(grid.chunks().count(), 4);
    }

    #[test]
    fn empty_grid_has_no_path() {
        let grid = WorldGrid::new(small_config(), Transform::identity()).unwrap();
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_eq!(grid.find_path(origin, origin), None);
        assert!(grid.nav_graph().is_empty());
    }
}
