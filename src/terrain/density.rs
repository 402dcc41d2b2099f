//! # Density Fields
//!
//! A density field answers "how solid is this point". Positive values are
//! inside material, zero or negative values are empty space. Surface
//! extraction only ever talks to a field through [`DensityField`], so any
//! source of densities can be meshed.

use cgmath::Point3;

/// Density reported where no solid claims a point.
pub const EMPTY_DENSITY: f32 = -1.0;

/// Something that can be sampled for density in chunk-local space.
pub trait DensityField {
    /// Samples the density at `p`.
    fn density(&self, p: Point3<f32>) -> f32;

    /// Compares the sides of `p` and `q`.
    ///
    /// # Returns
    ///
    /// `0` when both samples are on the same side of the surface, `1` when `p`
    /// is inside and `q` outside, `-1` when `p` is outside and `q` inside.
    fn midpoint_sign(&self, p: Point3<f32>, q: Point3<f32>) -> i8 {
        crossing_sign(self.density(p), self.density(q))
    }

    /// Estimates where the surface crosses the segment from `p` to `q`.
    ///
    /// This is one secant step, `p + (q - p) * a / (a - b)`. It is only
    /// meaningful when [`midpoint_sign`](Self::midpoint_sign) is non-zero; for
    /// samples of equal density the midpoint of the segment is returned.
    fn midpoint(&self, p: Point3<f32>, q: Point3<f32>) -> Point3<f32> {
        let a = self.density(p);
        let b = self.density(q);
        let alpha = if a == b { 0.5 } else { a / (a - b) };
        p + (q - p) * alpha
    }
}

impl<F: DensityField + ?Sized> DensityField for &F {
    fn density(&self, p: Point3<f32>) -> f32 {
        (**self).density(p)
    }
}

/// Sign rule shared by every field.
pub(crate) fn crossing_sign(a: f32, b: f32) -> i8 {
    match (a > 0.0, b > 0.0) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slope;

    impl DensityField for Slope {
        fn density(&self, p: Point3<f32>) -> f32 {
            0.5 - p.y
        }
    }

    #[test]
    fn sign_is_zero_iff_same_side() {
        let samples = [-2.0_f32, -0.5, 0.0, 0.25, 3.0];
        for &a in &samples {
            for &b in &samples {
                let same_side = (a > 0.0) == (b > 0.0);
                assert_eq!(crossing_sign(a, b) == 0, same_side, "a={a} b={b}");
            }
        }
    }

    #[test]
    fn sign_direction_follows_inside_point() {
        let below = Point3::new(0.0, 0.0, 0.0);
        let above = Point3::new(0.0, 1.0, 0.0);
        assert_eq!(Slope.midpoint_sign(below, above), 1);
        assert_eq!(Slope.midpoint_sign(above, below), -1);
    }

    #[test]
    fn secant_lands_on_linear_surface() {
        let m = Slope.midpoint(Point3::new(0.2, 0.0, 0.3), Point3::new(0.2, 1.0, 0.3));
        assert!((m.y - 0.5).abs() < 1e-6);
        assert_eq!(m.x, 0.2);
    }
}
