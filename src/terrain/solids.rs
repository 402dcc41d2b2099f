//! # Implicit Solids
//!
//! The primitive shapes a [`SolidStack`] is built from, and the stack itself.
//!
//! A stack is a priority list: the most recently added solid that claims a
//! point decides its density. Digging pushes a void sphere and building pushes
//! a filled one, so later edits always win over older material.

use std::{fmt, sync::Arc};

use cgmath::{MetricSpace, Point3};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::{
    density::{DensityField, EMPTY_DENSITY},
    transform::Transform,
};

/// Density returned inside a ground-style solid.
const SOLID_DENSITY: f32 = 1.0;

/// Serialized form of a [`NoiseGround`]. The noise generator is rebuilt from
/// `seed` on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct NoiseGroundParams {
    local_to_world: Transform,
    height: f32,
    scale: f32,
    frequency: f32,
    seed: u32,
}

/// A ground plane whose surface height is perturbed by 2D Perlin noise
/// sampled in world space, so neighbouring chunks line up seamlessly.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "NoiseGroundParams", into = "NoiseGroundParams")]
pub struct NoiseGround {
    local_to_world: Transform,
    height: f32,
    scale: f32,
    frequency: f32,
    seed: u32,
    perlin: Perlin,
}

impl NoiseGround {
    /// Creates a noise ground.
    ///
    /// # Arguments
    ///
    /// * `local_to_world` - Maps the chunk-local points this solid is sampled
    ///   at into world space.
    /// * `height` - Base world height of the surface.
    /// * `scale` - Amplitude of the noise, in world units.
    /// * `frequency` - Multiplier applied to world x/z before sampling noise.
    /// * `seed` - Noise seed.
    pub fn new(
        local_to_world: Transform,
        height: f32,
        scale: f32,
        frequency: f32,
        seed: u32,
    ) -> Self {
        Self {
            local_to_world,
            height,
            scale,
            frequency,
            seed,
            perlin: Perlin::new(seed),
        }
    }

    /// World-space surface height above the given world x/z.
    pub fn surface_height(&self, x: f32, z: f32) -> f32 {
        self.height + self.scale * self.perlin01(x * self.frequency, z * self.frequency)
    }

    fn perlin01(&self, x: f32, z: f32) -> f32 {
        let sample = self.perlin.get([x as f64, z as f64]) as f32;
        ((sample + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn density(&self, local: Point3<f32>) -> f32 {
        let world = self.local_to_world.transform_point(local);
        ground_density(world.y, self.surface_height(world.x, world.z))
    }
}

impl fmt::Debug for NoiseGround {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseGround")
            .field("local_to_world", &self.local_to_world)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .field("frequency", &self.frequency)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl PartialEq for NoiseGround {
    fn eq(&self, other: &Self) -> bool {
        self.local_to_world == other.local_to_world
            && self.height == other.height
            && self.scale == other.scale
            && self.frequency == other.frequency
            && self.seed == other.seed
    }
}

impl From<NoiseGroundParams> for NoiseGround {
    fn from(p: NoiseGroundParams) -> Self {
        NoiseGround::new(p.local_to_world, p.height, p.scale, p.frequency, p.seed)
    }
}

impl From<NoiseGround> for NoiseGroundParams {
    fn from(g: NoiseGround) -> Self {
        NoiseGroundParams {
            local_to_world: g.local_to_world,
            height: g.height,
            scale: g.scale,
            frequency: g.frequency,
            seed: g.seed,
        }
    }
}

/// One primitive volumetric shape. Solids are immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Solid {
    /// Solid below `height`, empty at or above it. Claims every point.
    Ground {
        /// Local height of the surface.
        height: f32,
    },
    /// Noise-perturbed ground. Claims every point.
    NoiseGround(NoiseGround),
    /// A filled ball.
    Sphere {
        /// Centre of the ball.
        center: Point3<f32>,
        /// Radius of the ball.
        radius: f32,
    },
    /// A hollow ball that removes whatever it overlaps.
    SphereVoid {
        /// Centre of the hole.
        center: Point3<f32>,
        /// Radius of the hole.
        radius: f32,
    },
}

impl Solid {
    /// Density of this solid at `p`, ignoring whether it claims the point.
    pub fn density(&self, p: Point3<f32>) -> f32 {
        match self {
            Solid::Ground { height } => ground_density(p.y, *height),
            Solid::NoiseGround(ground) => ground.density(p),
            Solid::Sphere { center, radius } => radius - p.distance(*center),
            Solid::SphereVoid { center, radius } => p.distance(*center) - radius,
        }
    }

    /// Whether this solid decides the density at `p`.
    pub fn intersects(&self, p: Point3<f32>) -> bool {
        match self {
            Solid::Ground { .. } | Solid::NoiseGround(_) => true,
            Solid::Sphere { center, radius } | Solid::SphereVoid { center, radius } => {
                p.distance(*center) < *radius
            }
        }
    }
}

fn ground_density(y: f32, surface: f32) -> f32 {
    if y < surface {
        SOLID_DENSITY
    } else {
        -SOLID_DENSITY
    }
}

/// A priority-ordered stack of solids forming a density field.
///
/// Solids are shared behind [`Arc`], so cloning a stack to hand to a
/// background job copies only the list of pointers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolidStack {
    /// Oldest first. Queries walk it in reverse.
    solids: Vec<Arc<Solid>>,
}

impl SolidStack {
    /// Creates an empty stack. Every point reads as empty space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a solid with priority over everything already in the stack.
    pub fn push(&mut self, solid: Solid) {
        self.solids.push(Arc::new(solid));
    }

    /// Adds a flat ground at the given local height.
    pub fn add_ground(&mut self, height: f32) {
        self.push(Solid::Ground { height });
    }

    /// Adds a noise-perturbed ground.
    pub fn add_noise_ground(&mut self, ground: NoiseGround) {
        self.push(Solid::NoiseGround(ground));
    }

    /// Adds a filled sphere. Same as [`fill`](Self::fill).
    pub fn add_sphere(&mut self, center: Point3<f32>, radius: f32) {
        self.fill(center, radius);
    }

    /// Adds material inside the sphere.
    pub fn fill(&mut self, center: Point3<f32>, radius: f32) {
        self.push(Solid::Sphere { center, radius });
    }

    /// Removes material inside the sphere.
    pub fn erode(&mut self, center: Point3<f32>, radius: f32) {
        self.push(Solid::SphereVoid { center, radius });
    }

    /// Number of solids in the stack.
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// Whether the stack holds no solids.
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Iterates solids in priority order, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Solid> + '_ {
        self.solids.iter().rev().map(|s| s.as_ref())
    }
}

impl DensityField for SolidStack {
    fn density(&self, p: Point3<f32>) -> f32 {
        self.iter()
            .find(|solid| solid.intersects(p))
            .map_or(EMPTY_DENSITY, |solid| solid.density(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn empty_stack_reads_empty() {
        let stack = SolidStack::new();
        assert_eq!(stack.density(Point3::new(0.5, 0.5, 0.5)), EMPTY_DENSITY);
    }

    #[test]
    fn newest_solid_wins() {
        let mut stack = SolidStack::new();
        stack.add_ground(0.5);
        let below = Point3::new(0.5, 0.3, 0.5);
        assert!(stack.density(below) > 0.0);

        stack.erode(Point3::new(0.5, 0.3, 0.5), 0.1);
        assert!(stack.density(below) <= 0.0);

        stack.fill(Point3::new(0.5, 0.3, 0.5), 0.05);
        assert!(stack.density(below) > 0.0);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn sphere_only_claims_interior() {
        let sphere = Solid::Sphere {
            center: Point3::new(0.0, 0.0, 0.0),
            radius: 1.0,
        };
        assert!(sphere.intersects(Point3::new(0.5, 0.0, 0.0)));
        assert!(!sphere.intersects(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(sphere.density(Point3::new(0.25, 0.0, 0.0)), 0.75);
    }

    #[test]
    fn clone_shares_solids() {
        let mut stack = SolidStack::new();
        stack.add_ground(0.5);
        let snapshot = stack.clone();
        stack.erode(Point3::new(0.5, 0.5, 0.5), 0.2);

        assert_eq!(snapshot.len(), 1);
        assert!(Arc::ptr_eq(&snapshot.solids[0], &stack.solids[0]));
    }

    #[test]
    fn noise_ground_survives_json() {
        let ground = NoiseGround::new(
            Transform::new(Vector3::new(10.0, 0.0, 20.0), 10.0),
            3.0,
            1.5,
            0.3,
            42,
        );
        let solid = Solid::NoiseGround(ground);
        let json = serde_json::to_string(&solid).unwrap();
        let restored: Solid = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, solid);
        let p = Point3::new(0.3, 0.25, 0.7);
        assert_eq!(restored.density(p), solid.density(p));
    }

    #[test]
    fn noise_height_stays_within_amplitude() {
        let ground = NoiseGround::new(Transform::identity(), 2.0, 0.5, 0.37, 7);
        for i in 0..50 {
            let h = ground.surface_height(i as f32 * 0.61, i as f32 * 1.3);
            assert!((2.0..=2.5).contains(&h), "height {h}");
        }
    }
}
