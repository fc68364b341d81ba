//! Line/surface intersection by Spencer's method.
//!
//! The surface is given implicitly, `f(p) = 0`, with an analytic gradient.
//! Starting from a point near the vertex plane (the caller passes the foot
//! of the perpendicular from the surface vertex onto the ray), Newton steps
//! are taken along the ray:
//!
//! ```text
//! s_{k+1} = s_k - f(p0 + s_k d) / (d . grad f(p0 + s_k d))
//! ```

use serde::{Deserialize, Serialize};

use refract_math::{Point3, Vec3};

use crate::error::{GeomError, Result};

/// Default iteration cap.
pub const MAX_ITERATIONS: usize = 30;
/// Default step tolerance in lens units.
pub const TOLERANCE: f64 = 1e-10;

/// A surface given by an implicit function and its gradient.
pub trait ImplicitSurface {
    /// Implicit function, zero on the surface.
    fn f(&self, p: &Point3) -> Result<f64>;

    /// Gradient of [`ImplicitSurface::f`].
    fn df(&self, p: &Point3) -> Result<Vec3>;
}

/// Convergence controls for [`intersect`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectOptions {
    /// Stop once consecutive steps differ by less than this.
    pub tolerance: f64,
    /// Give up (missed surface) after this many refinement steps.
    pub max_iterations: usize,
}

impl Default for IntersectOptions {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

/// Intersect the line `p0 + s dir` with `surface`.
///
/// Returns the intersection point and the signed distance `s` from `p0`.
pub fn intersect<S: ImplicitSurface + ?Sized>(
    surface: &S,
    p0: &Point3,
    dir: &Vec3,
    options: &IntersectOptions,
) -> Result<(Point3, f64)> {
    let newton = |s: f64| -> Result<f64> {
        let p = p0 + dir * s;
        let slope = dir.dot(&surface.df(&p)?);
        if slope.abs() < f64::EPSILON {
            return Err(GeomError::Grazing);
        }
        Ok(s - surface.f(&p)? / slope)
    };

    let mut s1 = newton(0.0)?;
    if !s1.is_finite() {
        return Err(GeomError::NotConverged(0));
    }
    let mut delta = s1.abs();
    let mut iterations = 0;
    while delta > options.tolerance {
        if iterations >= options.max_iterations {
            return Err(GeomError::NotConverged(iterations));
        }
        let s2 = newton(s1)?;
        if !s2.is_finite() {
            return Err(GeomError::NotConverged(iterations));
        }
        delta = (s2 - s1).abs();
        s1 = s2;
        iterations += 1;
    }

    Ok((p0 + dir * s1, s1))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plane {
        z: f64,
    }

    impl ImplicitSurface for Plane {
        fn f(&self, p: &Point3) -> Result<f64> {
            Ok(p.z - self.z)
        }
        fn df(&self, _p: &Point3) -> Result<Vec3> {
            Ok(Vec3::new(0.0, 0.0, 1.0))
        }
    }

    /// `f = z - a sin(x)`: Newton along x never settles for large `a`.
    struct Wiggle;

    impl ImplicitSurface for Wiggle {
        fn f(&self, p: &Point3) -> Result<f64> {
            Ok(p.z - 50.0 * (p.x * 10.0).sin())
        }
        fn df(&self, p: &Point3) -> Result<Vec3> {
            Ok(Vec3::new(-500.0 * (p.x * 10.0).cos(), 0.0, 1.0))
        }
    }

    #[test]
    fn test_plane_hit() {
        let dir = Vec3::new(0.0, 0.6, 0.8);
        let (p, s) = intersect(
            &Plane { z: 4.0 },
            &Point3::origin(),
            &dir,
            &IntersectOptions::default(),
        )
        .unwrap();
        assert!((s - 5.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_ray_grazes() {
        let result = intersect(
            &Plane { z: 1.0 },
            &Point3::origin(),
            &Vec3::new(1.0, 0.0, 0.0),
            &IntersectOptions::default(),
        );
        assert_eq!(result.unwrap_err(), GeomError::Grazing);
    }

    #[test]
    fn test_iteration_cap_is_missed_surface() {
        let options = IntersectOptions {
            tolerance: 1e-14,
            max_iterations: 3,
        };
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let err = intersect(&Wiggle, &Point3::new(0.0, 0.0, -1.0), &dir, &options).unwrap_err();
        assert!(err.is_missed_surface());
    }
}
