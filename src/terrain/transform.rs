//! Placement of chunks and grids in space.

use cgmath::{Basis3, Decomposed, One, Point3, Transform as _, Vector3};
use serde::{Deserialize, Serialize};

type Placement = Decomposed<Vector3<f32>, Basis3<f32>>;

/// On-disk form of a [`Transform`].
#[derive(Serialize, Deserialize)]
struct TransformParams {
    translation: Vector3<f32>,
    scale: f32,
}

/// A uniform scale followed by a translation.
///
/// Chunks are axis-aligned cubes, so this is all the placement the terrain
/// needs: a chunk's transform maps its local unit cube into grid space, and the
/// grid's transform maps grid space into the world. Rotation stays at identity.
///
/// A zero scale has no inverse, and inverse mappings then leave their input
/// unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TransformParams", into = "TransformParams")]
pub struct Transform {
    to_outer: Placement,
    to_local: Placement,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The transform that leaves every point where it is.
    pub fn identity() -> Self {
        Self::from_placement(Placement::one())
    }

    /// Creates a transform from its parts.
    pub fn new(translation: Vector3<f32>, scale: f32) -> Self {
        Self::from_placement(Decomposed {
            scale,
            rot: Basis3::one(),
            disp: translation,
        })
    }

    fn from_placement(to_outer: Placement) -> Self {
        Self {
            to_outer,
            to_local: to_outer.inverse_transform().unwrap_or_else(Placement::one),
        }
    }

    /// Offset applied after scaling.
    pub fn translation(&self) -> Vector3<f32> {
        self.to_outer.disp
    }

    /// Uniform scale factor.
    pub fn scale(&self) -> f32 {
        self.to_outer.scale
    }

    /// Maps a local point outwards.
    pub fn transform_point(&self, p: Point3<f32>) -> Point3<f32> {
        self.to_outer.transform_point(p)
    }

    /// Maps an outer point into local space.
    pub fn inverse_transform_point(&self, p: Point3<f32>) -> Point3<f32> {
        self.to_local.transform_point(p)
    }

    /// Maps an outer direction into local space. Translation does not apply.
    pub fn inverse_transform_vector(&self, v: Vector3<f32>) -> Vector3<f32> {
        self.to_local.transform_vector(v)
    }

    /// Returns the transform that applies `self` first and then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        Self::from_placement(outer.to_outer.concat(&self.to_outer))
    }
}

impl From<TransformParams> for Transform {
    fn from(p: TransformParams) -> Self {
        Transform::new(p.translation, p.scale)
    }
}

impl From<Transform> for TransformParams {
    fn from(t: Transform) -> Self {
        TransformParams {
            translation: t.translation(),
            scale: t.scale(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::MetricSpace;

    fn assert_close(a: Point3<f32>, b: Point3<f32>) {
        assert!(a.distance(b) < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn inverse_undoes_forward() {
        let t = Transform::new(Vector3::new(10.0, -4.0, 2.5), 8.0);
        let p = Point3::new(0.25, 0.5, 1.0);
        assert_close(t.inverse_transform_point(t.transform_point(p)), p);
    }

    #[test]
    fn composition_matches_sequential_application() {
        let chunk = Transform::new(Vector3::new(10.0, 0.0, 20.0), 10.0);
        let grid = Transform::new(Vector3::new(-5.0, 1.0, 0.0), 2.0);
        let p = Point3::new(0.5, 0.5, 0.5);

        assert_close(
            chunk.then(&grid).transform_point(p),
            grid.transform_point(chunk.transform_point(p)),
        );
        assert_close(
            chunk.then(&grid).inverse_transform_point(p),
            chunk.inverse_transform_point(grid.inverse_transform_point(p)),
        );
    }

    #[test]
    fn vectors_ignore_translation() {
        let t = Transform::new(Vector3::new(100.0, 100.0, 100.0), 4.0);
        let v = t.inverse_transform_vector(Vector3::new(4.0, 0.0, 0.0));
        assert!((v - Vector3::new(1.0, 0.0, 0.0)).x.abs() < 1e-6);
        assert_eq!((v.y, v.z), (0.0, 0.0));
    }

    #[test]
    fn zero_scale_inverse_is_identity() {
        let t = Transform::new(Vector3::new(1.0, 2.0, 3.0), 0.0);
        let p = Point3::new(4.0, 5.0, 6.0);
        assert_eq!(t.inverse_transform_point(p), p);
    }

    #[test]
    fn serializes_as_translation_and_scale() {
        let t = Transform::new(Vector3::new(1.0, 2.0, 3.0), 0.5);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["scale"], 0.5);
        assert_eq!(json["translation"], serde_json::json!([1.0, 2.0, 3.0]));

        let back: Transform = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
