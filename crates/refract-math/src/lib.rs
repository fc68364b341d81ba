#![warn(missing_docs)]

//! Math types for the refract optical modelling kernel.
//!
//! Thin wrappers around nalgebra providing the types shared by the lens
//! model and the tracers: points, vectors, the 2x2 paraxial system matrix,
//! a rigid surface-to-surface transform, and guarded radius/curvature
//! conversions.

use nalgebra::{Matrix3, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in 2D space (pupil or field coordinates).
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// A 2x2 matrix, used for paraxial (y, nu) system matrices.
pub type Matrix2 = nalgebra::Matrix2<f64>;

/// Curvatures with a smaller magnitude than this are treated as flat.
pub const CURVATURE_EPSILON: f64 = f64::EPSILON;

/// Radius for a signed curvature. A flat surface has an infinite radius.
pub fn radius_from_curvature(curvature: f64) -> f64 {
    if curvature.abs() < CURVATURE_EPSILON {
        f64::INFINITY
    } else {
        1.0 / curvature
    }
}

/// Curvature for a signed radius.
///
/// An infinite radius is flat (`Some(0.0)`). NaN and zero radii do not
/// describe a surface and return `None`.
pub fn curvature_from_radius(radius: f64) -> Option<f64> {
    if radius.is_nan() || radius == 0.0 {
        None
    } else if radius.is_infinite() {
        Some(0.0)
    } else {
        Some(1.0 / radius)
    }
}

/// A rigid transform: rotation followed by translation.
///
/// Maps coordinates of a child frame into its parent frame,
/// `p_parent = rotation * p_child + translation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Rotation part. Orthonormal.
    pub rotation: Matrix3<f64>,
    /// Translation part.
    pub translation: Vec3,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vec3::zeros(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vec3::new(dx, dy, dz),
        }
    }

    /// Compose: apply `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Transform a point from the child frame into the parent frame.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// Transform a direction (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation * v
    }

    /// Transform a point from the parent frame into the child frame.
    pub fn inverse_apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation.transpose() * (p.coords - self.translation))
    }

    /// Transform a direction from the parent frame into the child frame.
    pub fn inverse_apply_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation.transpose() * v
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation_round_trip() {
        let t = Transform::translation(0.0, 0.0, 12.5);
        let p = Point3::new(1.0, -2.0, 3.0);
        let moved = t.apply_point(&p);
        assert!((moved.z - 15.5).abs() < 1e-12);
        let back = t.inverse_apply_point(&moved);
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation_ignores_vectors() {
        let t = Transform::translation(4.0, 5.0, 6.0);
        let v = Vec3::new(0.0, 0.6, 0.8);
        assert!((t.apply_vec(&v) - v).norm() < 1e-12);
    }

    #[test]
    fn test_compose_translations() {
        let a = Transform::translation(0.0, 0.0, 2.0);
        let b = Transform::translation(0.0, 0.0, 3.0);
        let c = a.then(&b);
        assert!((c.translation.z - 5.0).abs() < 1e-12);
        let inv = c.inverse();
        let p = c.apply_point(&Point3::new(1.0, 1.0, 1.0));
        let q = inv.apply_point(&p);
        assert_relative_eq!(q.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_radius_curvature_guards() {
        assert!(radius_from_curvature(0.0).is_infinite());
        assert!((radius_from_curvature(0.02) - 50.0).abs() < 1e-12);
        assert_eq!(curvature_from_radius(f64::INFINITY), Some(0.0));
        assert_eq!(curvature_from_radius(f64::NEG_INFINITY), Some(0.0));
        assert_eq!(curvature_from_radius(f64::NAN), None);
        assert_eq!(curvature_from_radius(0.0), None);
        assert_relative_eq!(curvature_from_radius(-25.0).unwrap_or_default(), -0.04);
    }
}
