//! Stand-alone density sources that do not go through a [`SolidStack`].
//!
//! [`SolidStack`]: super::solids::SolidStack

use cgmath::{MetricSpace, Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::density::{DensityField, EMPTY_DENSITY};

/// A single analytic ball: `radius - |p - center|` everywhere.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SphericalField {
    /// Centre of the ball.
    pub center: Point3<f32>,
    /// Radius of the ball.
    pub radius: f32,
}

impl SphericalField {
    /// Creates a ball field.
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl DensityField for SphericalField {
    fn density(&self, p: Point3<f32>) -> f32 {
        self.radius - p.distance(self.center)
    }
}

/// On-disk form of a [`PointField`], checked before it becomes one.
#[derive(Serialize, Deserialize)]
struct PointFieldData {
    extent: Vector3<f32>,
    n: usize,
    density: Vec<f32>,
}

/// A density grid of `n` samples per axis covering `[0, extent)`.
///
/// Lookups snap to the sample whose cell contains the point. Points outside
/// the extent, and every point of a field with no samples, read as empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PointFieldData", into = "PointFieldData")]
pub struct PointField {
    extent: Vector3<f32>,
    n: usize,
    density: Vec<f32>,
}

impl PointField {
    /// Creates a field with every sample at zero (not solid).
    pub fn new(extent: Vector3<f32>, n: usize) -> Self {
        Self {
            extent,
            n,
            density: vec![0.0; n * n * n],
        }
    }

    /// Samples per axis.
    pub fn samples_per_axis(&self) -> usize {
        self.n
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.n * self.n) + (y * self.n) + z
    }

    fn index_of(&self, p: Point3<f32>) -> Option<usize> {
        let inside = |v: f32, e: f32| (0.0..e).contains(&v);
        if !(inside(p.x, self.extent.x) && inside(p.y, self.extent.y) && inside(p.z, self.extent.z))
        {
            return None;
        }

        let last = self.n.checked_sub(1)?;
        let cell = |v: f32, e: f32| ((v / e * self.n as f32) as usize).min(last);
        Some(self.index(
            cell(p.x, self.extent.x),
            cell(p.y, self.extent.y),
            cell(p.z, self.extent.z),
        ))
    }

    fn sample_position(&self, x: usize, y: usize, z: usize) -> Point3<f32> {
        let n = self.n as f32;
        Point3::new(
            self.extent.x * x as f32 / n,
            self.extent.y * y as f32 / n,
            self.extent.z * z as f32 / n,
        )
    }

    fn for_each_sample(&mut self, mut f: impl FnMut(Point3<f32>, &mut f32)) {
        for x in 0..self.n {
            for y in 0..self.n {
                for z in 0..self.n {
                    let p = self.sample_position(x, y, z);
                    let i = self.index(x, y, z);
                    f(p, &mut self.density[i]);
                }
            }
        }
    }

    /// Overwrites every sample with the density of a ball.
    pub fn draw_sphere(&mut self, center: Point3<f32>, radius: f32) {
        self.for_each_sample(|p, d| *d = radius - p.distance(center));
    }

    /// Empties every sample inside the ball.
    pub fn erode(&mut self, center: Point3<f32>, radius: f32) {
        self.for_each_sample(|p, d| {
            if p.distance(center) < radius {
                *d = EMPTY_DENSITY;
            }
        });
    }
}

impl TryFrom<PointFieldData> for PointField {
    type Error = String;

    fn try_from(data: PointFieldData) -> Result<Self, Self::Error> {
        if data.n == 0 {
            return Err("point field needs at least one sample per axis".to_string());
        }
        let expected = data
            .n
            .checked_mul(data.n)
            .and_then(|square| square.checked_mul(data.n))
            .ok_or_else(|| format!("{} samples per axis is too many", data.n))?;
        if data.density.len() != expected {
            return Err(format!(
                "expected {expected} density samples for n = {}, found {}",
                data.n,
                data.density.len()
            ));
        }
        Ok(PointField {
            extent: data.extent,
            n: data.n,
            density: data.density,
        })
    }
}

impl From<PointField> for PointFieldData {
    fn from(field: PointField) -> Self {
        PointFieldData {
            extent: field.extent,
            n: field.n,
            density: field.density,
        }
    }
}

impl DensityField for PointField {
    fn density(&self, p: Point3<f32>) -> f32 {
        self.index_of(p).map_or(EMPTY_DENSITY, |i| self.density[i])
    }
}
