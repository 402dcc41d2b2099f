//! # Terrain
//!
//! Implicit volumetric models: lattice addressing, placement transforms, the
//! [`DensityField`] contract and the sources that implement it.

pub mod density;
pub mod fields;
pub mod lattice;
pub mod solids;
pub mod transform;

pub use density::{DensityField, EMPTY_DENSITY};
pub use fields::{PointField, SphericalField};
pub use lattice::LatticeCoordinate;
pub use solids::{NoiseGround, Solid, SolidStack};
pub use transform::Transform;
