//! Mesh data produced by surface extraction.
//!
//! Vertices are kept interleaved in a `#[repr(C)]` layout so a mesh consumer
//! can upload [`MeshBuffer::vertex_bytes`] and [`MeshBuffer::index_bytes`]
//! straight into GPU buffers.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

/// Weight of the local y coordinate in the U projection.
const UV_U_FROM_Y: f32 = 0.2;
/// Weight of the local y coordinate in the V projection.
const UV_V_FROM_Y: f32 = 0.3;

/// One vertex of an extracted surface.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize)]
pub struct SurfaceVertex {
    /// Chunk-local position
    pub position: [f32; 3],
    /// Projected texture coordinates
    pub uv: [f32; 2],
}

impl SurfaceVertex {
    /// Creates a vertex whose UV is projected from its position.
    ///
    /// # Arguments
    /// * `p` - Chunk-local position
    /// * `material_scale` - Multiplier applied to both texture coordinates
    pub fn projected(p: Point3<f32>, material_scale: f32) -> Self {
        SurfaceVertex {
            position: [p.x, p.y, p.z],
            uv: [
                (p.x + UV_U_FROM_Y * p.y) * material_scale,
                (p.z + UV_V_FROM_Y * p.y) * material_scale,
            ],
        }
    }

    /// Position as a point.
    pub fn point(&self) -> Point3<f32> {
        Point3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// A triangle mesh built from quads.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffer {
    /// Interleaved vertex data
    pub vertices: Vec<SurfaceVertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad as two triangles, `(a, b, c)` and `(c, d, a)`.
    ///
    /// The quad gets its own four vertices so each face can carry its own UVs.
    pub fn add_quad(&mut self, corners: [Point3<f32>; 4], material_scale: f32) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(
            corners
                .iter()
                .map(|&p| SurfaceVertex::projected(p, material_scale)),
        );
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Whether the mesh has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of quads added.
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    /// Number of triangles in the index list.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.vertices.iter().map(SurfaceVertex::point)
    }

    /// Raw vertex bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
