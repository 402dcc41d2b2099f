//! # Terrain Demo
//!
//! Builds a world grid, digs a hole in it and searches a path across the
//! result, logging each step.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [graph-out.json]
//! ```

use std::{env, process::ExitCode, thread, time::Duration};

use cgmath::Point3;
use log::{error, info, warn};
use voxel_nav_terrain::{
    persistence, TerrainConfig, TerrainEvent, TerrainResult, Transform, WorldGrid,
};
use web_time::Instant;

/// Interval between completion polls.
const TICK: Duration = Duration::from_millis(16);

fn tick_until_idle(grid: &mut WorldGrid) {
    let start = Instant::now();
    while !grid.poll_completion() {
        thread::sleep(TICK);
    }
    info!("Terrain settled in {:?}", start.elapsed());
}

/// A random point on the walkable surface, in world space.
fn random_surface_point(grid: &WorldGrid) -> Option<Point3<f32>> {
    let graph = grid.nav_graph();
    let count = graph.node_count();
    if count == 0 {
        return None;
    }
    let node = graph.nodes().nth(fastrand::usize(..count))?;
    graph
        .position(node)
        .map(|p| grid.transform().transform_point(p))
}

fn run() -> TerrainResult<()> {
    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => TerrainConfig::load(path)?,
        None => TerrainConfig::default(),
    };
    let graph_out = args.next();

    let (sender, receiver) = std::sync::mpsc::channel();
    let mut grid = WorldGrid::new(config, Transform::identity())?;
    grid.set_event_sink(Box::new(sender));

    grid.initialize();
    tick_until_idle(&mut grid);

    match random_surface_point(&grid) {
        Some(dig_point) => {
            let radius = grid.config().build_radius;
            if grid.dig(dig_point, radius) {
                tick_until_idle(&mut grid);
            }
        }
        None => warn!("Terrain has no surface to dig into"),
    }

    let player = random_surface_point(&grid);
    let pursuer = random_surface_point(&grid);
    if let (Some(player), Some(pursuer)) = (player, pursuer) {
        match grid.find_path(pursuer, player) {
            Some(path) => info!(
                "Pursuer path from {pursuer:?} to {player:?} has {} nodes",
                path.len()
            ),
            None => info!("Pursuer cannot reach the player"),
        }
    }

    for event in receiver.try_iter() {
        if let TerrainEvent::GraphReady { nodes, edges } = event {
            info!("Graph ready: {nodes} nodes, {edges} edges");
        }
    }

    if let Some(path) = graph_out {
        persistence::save_nav_graph(&path, &grid.nav_graph())?;
        info!("Wrote navigation graph to {path}");
    }
    Ok(())
}

fn main() -> ExitCode {
    voxel_nav_terrain::init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
