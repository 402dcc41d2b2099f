//! # Surface Extraction
//!
//! Dual contouring over a chunk's sampling lattice. One run produces both the
//! render mesh and the navigation graph, and the two share topology: graph
//! nodes are exactly the mesh's dual vertices and graph edges are the edges
//! of its quads.
//!
//! ## Lattice
//!
//! `resolution` cells span the chunk's local unit cube. Lattice point `v` sits
//! at `v / resolution`. For every point and every axis `d3` we look at the
//! face spanned by the other two axes `d1`, `d2` and probe the density just
//! above and below its centre along `d3`. A sign change is a crossing.
//!
//! ## Passes
//!
//! 1. For every padded lattice point, each crossing contributes its secant
//!    estimate to the four lattice points at the face's corners. Averaging
//!    those contributions gives one dual vertex per lattice point.
//! 2. For every unpadded lattice point, each crossing emits a quad over the
//!    four corner dual vertices and links the quad's edges in the graph.

use cgmath::{EuclideanSpace, Point3, Vector3, Zero};
use serde::{Deserialize, Serialize};

use crate::{
    navigation::NavGraph,
    terrain::{DensityField, LatticeCoordinate},
};

use super::mesh_buffer::MeshBuffer;

/// Lattice points sampled below zero on each axis.
const PADDING: i32 = 1;

/// Face orientations as `(d1, d2, d3)`, where `d3` is the probe direction.
const FACE_AXES: [(LatticeCoordinate, LatticeCoordinate, LatticeCoordinate); 3] = [
    (LatticeCoordinate::X, LatticeCoordinate::Y, LatticeCoordinate::Z),
    (LatticeCoordinate::Z, LatticeCoordinate::X, LatticeCoordinate::Y),
    (LatticeCoordinate::Y, LatticeCoordinate::Z, LatticeCoordinate::X),
];

/// Parameters of one extraction run.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Cells per axis across the chunk.
    pub resolution: u32,
    /// Multiplier applied to projected texture coordinates.
    pub material_scale: f32,
    /// Also link each crossing face's `v` corner to its opposite corner.
    pub connect_face_diagonals: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            resolution: 10,
            material_scale: 1.0,
            connect_face_diagonals: false,
        }
    }
}

/// Output of one extraction run, in chunk-local space.
#[derive(Clone, Debug, Default)]
pub struct Extraction {
    /// Render mesh
    pub mesh: MeshBuffer,
    /// Walkable graph over the mesh's dual vertices
    pub nav_graph: NavGraph,
}

/// Running average of crossing estimates for one lattice point.
#[derive(Copy, Clone, Debug)]
struct CellAccumulator {
    sum: Vector3<f32>,
    count: u32,
}

impl Default for CellAccumulator {
    fn default() -> Self {
        Self {
            sum: Vector3::zero(),
            count: 0,
        }
    }
}

impl CellAccumulator {
    fn add(&mut self, p: Point3<f32>) {
        self.sum += p.to_vec();
        self.count += 1;
    }

    fn center(&self) -> Point3<f32> {
        assert!(
            self.count > 0,
            "dual vertex read for a lattice point with no crossings"
        );
        Point3::from_vec(self.sum / self.count as f32)
    }
}

/// Dense accumulator storage covering `-1..=resolution + 2` on each axis.
struct AccumulatorGrid {
    cells: Vec<CellAccumulator>,
    width: usize,
}

impl AccumulatorGrid {
    fn new(resolution: u32) -> Self {
        let width = resolution as usize + 4;
        Self {
            cells: vec![CellAccumulator::default(); width * width * width],
            width,
        }
    }

    fn index(&self, c: LatticeCoordinate) -> usize {
        let axis = |v: i32| {
            let shifted = v + PADDING;
            debug_assert!(shifted >= 0 && (shifted as usize) < self.width);
            shifted as usize
        };
        (axis(c.x) * self.width * self.width) + (axis(c.y) * self.width) + axis(c.z)
    }

    fn add(&mut self, c: LatticeCoordinate, p: Point3<f32>) {
        let i = self.index(c);
        self.cells[i].add(p);
    }

    fn center(&self, c: LatticeCoordinate) -> Point3<f32> {
        self.cells[self.index(c)].center()
    }
}

/// Probe points straddling the centre of the face at `v` spanned by `d1`, `d2`.
fn face_probes(
    v: LatticeCoordinate,
    (d1, d2, d3): (LatticeCoordinate, LatticeCoordinate, LatticeCoordinate),
    resolution: u32,
) -> (Point3<f32>, Point3<f32>) {
    let center = v.to_local(resolution) + (d1 + d2).to_local(resolution).to_vec() * 0.5;
    let half_step = d3.to_local(resolution).to_vec() * 0.5;
    (center + half_step, center - half_step)
}

fn for_each_point(from: i32, to_inclusive: i32, mut f: impl FnMut(LatticeCoordinate)) {
    for x in from..=to_inclusive {
        for y in from..=to_inclusive {
            for z in from..=to_inclusive {
                f(LatticeCoordinate::new(x, y, z));
            }
        }
    }
}

/// Extracts the surface and navigation graph of `field`.
///
/// # Arguments
///
/// * `field` - Density source, sampled in chunk-local space
/// * `settings` - Lattice resolution and output options
///
/// # Returns
///
/// The mesh and graph, both in chunk-local coordinates. A field with no sign
/// changes yields an empty mesh and an empty graph.
pub fn extract<F: DensityField + ?Sized>(field: &F, settings: &ExtractionSettings) -> Extraction {
    let n = settings.resolution;
    let last = n as i32;
    let mut accumulators = AccumulatorGrid::new(n);

    for_each_point(-PADDING, last + 1, |v| {
        for axes in FACE_AXES {
            let (above, below) = face_probes(v, axes, n);
            if field.midpoint_sign(above, below) == 0 {
                continue;
            }

            let (d1, d2, _) = axes;
            let crossing = field.midpoint(above, below);
            for corner in [v, v + d1, v + d1 + d2, v + d2] {
                accumulators.add(corner, crossing);
            }
        }
    });

    let mut extraction = Extraction::default();
    for_each_point(0, last - 1, |v| {
        for axes in FACE_AXES {
            let (above, below) = face_probes(v, axes, n);
            let sign = field.midpoint_sign(above, below);
            if sign == 0 {
                continue;
            }

            let (d1, d2, _) = axes;
            let corners = [v, v + d1, v + d1 + d2, v + d2];
            let [p1, p2, p3, p4] = corners.map(|c| accumulators.center(c));

            let quad = if sign > 0 {
                [p1, p4, p3, p2]
            } else {
                [p1, p2, p3, p4]
            };
            extraction.mesh.add_quad(quad, settings.material_scale);

            let graph = &mut extraction.nav_graph;
            let [c1, c2, c3, c4] = corners;
            graph.connect(c1, c2, p1, p2);
            graph.connect(c2, c3, p2, p3);
            graph.connect(c4, c3, p4, p3);
            graph.connect(c1, c4, p1, p4);
            if settings.connect_face_diagonals {
                graph.connect(c1, c3, p1, p3);
            }
        }
    });

    extraction
}
