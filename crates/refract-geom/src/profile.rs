//! Rotationally symmetric surface profiles.
//!
//! Profiles are expressed in the surface's local frame: the vertex sits at
//! the origin and the optical axis is `+z`. Normals point along `+z` at the
//! vertex.

use serde::{Deserialize, Serialize};

use refract_math::{curvature_from_radius, radius_from_curvature, Point3, Vec3};

use crate::error::{GeomError, Result};
use crate::intersect::{intersect, ImplicitSurface, IntersectOptions};

/// Number of polynomial coefficients carried by an asphere.
pub const NUM_ASPHERE_COEFFICIENTS: usize = 10;

/// Tag for the profile variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileKind {
    /// Sphere (or plane).
    Spherical,
    /// Conic plus even powers `r⁴ .. r²²`.
    EvenAsphere,
    /// Conic plus all powers `r³ .. r¹²`.
    OddAsphere,
}

/// Conic base and polynomial coefficients of an aspheric profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asphere {
    /// Vertex curvature.
    pub curvature: f64,
    /// Conic constant.
    pub conic: f64,
    /// Polynomial coefficients, lowest order first.
    pub coefficients: [f64; NUM_ASPHERE_COEFFICIENTS],
}

impl Asphere {
    /// Asphere with no polynomial terms.
    pub fn new(curvature: f64, conic: f64) -> Self {
        Self {
            curvature,
            conic,
            coefficients: [0.0; NUM_ASPHERE_COEFFICIENTS],
        }
    }

    /// Set coefficient `i`.
    pub fn set_coefficient(&mut self, i: usize, value: f64) -> Result<()> {
        let slot = self
            .coefficients
            .get_mut(i)
            .ok_or(GeomError::CoefficientIndex(i))?;
        *slot = value;
        Ok(())
    }

    /// Index of the highest-order nonzero coefficient, `None` if all are zero.
    pub fn max_nonzero_index(&self) -> Option<usize> {
        self.coefficients.iter().rposition(|&c| c != 0.0)
    }

    /// Coefficients up to and including the highest nonzero one.
    fn active(&self) -> &[f64] {
        match self.max_nonzero_index() {
            Some(i) => &self.coefficients[..=i],
            None => &[],
        }
    }
}

/// Sag, slope and curvature terms of a conic at squared radial height `r2`.
struct Conic {
    sag: f64,
    /// `c / sqrt(1 - (1+k) c² r²)`: dz/dr divided by r.
    slope_over_r: f64,
    /// `sqrt(1 - (1+k) c² r²)`.
    root: f64,
}

fn conic_terms(curvature: f64, conic: f64, r2: f64) -> Result<Conic> {
    let c = curvature;
    let radicand = 1.0 - (1.0 + conic) * c * c * r2;
    if radicand < 0.0 {
        return Err(GeomError::InvalidRadicand(r2.sqrt()));
    }
    let root = radicand.sqrt();
    Ok(Conic {
        sag: c * r2 / (1.0 + root),
        slope_over_r: if root > 0.0 { c / root } else { f64::INFINITY.copysign(c) },
        root,
    })
}

/// Profile of one surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceProfile {
    /// Sphere of the given vertex curvature; zero is a plane.
    Spherical {
        /// Vertex curvature (1/radius).
        curvature: f64,
    },
    /// Even-power asphere.
    EvenAsphere(Asphere),
    /// All-power asphere.
    OddAsphere(Asphere),
}

impl Default for SurfaceProfile {
    fn default() -> Self {
        Self::flat()
    }
}

impl SurfaceProfile {
    /// A plane.
    pub fn flat() -> Self {
        Self::Spherical { curvature: 0.0 }
    }

    /// A sphere of signed `radius`; infinite radius is a plane.
    pub fn spherical(radius: f64) -> Result<Self> {
        let curvature = curvature_from_radius(radius).ok_or(GeomError::InvalidRadius(radius))?;
        Ok(Self::Spherical { curvature })
    }

    /// Variant tag.
    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Spherical { .. } => ProfileKind::Spherical,
            Self::EvenAsphere(_) => ProfileKind::EvenAsphere,
            Self::OddAsphere(_) => ProfileKind::OddAsphere,
        }
    }

    /// Vertex curvature.
    pub fn curvature(&self) -> f64 {
        match self {
            Self::Spherical { curvature } => *curvature,
            Self::EvenAsphere(a) | Self::OddAsphere(a) => a.curvature,
        }
    }

    /// Vertex radius; infinite for a flat vertex.
    pub fn radius(&self) -> f64 {
        radius_from_curvature(self.curvature())
    }

    /// Change the vertex radius, keeping the variant.
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        let c = curvature_from_radius(radius).ok_or(GeomError::InvalidRadius(radius))?;
        match self {
            Self::Spherical { curvature } => *curvature = c,
            Self::EvenAsphere(a) | Self::OddAsphere(a) => a.curvature = c,
        }
        Ok(())
    }

    /// Conic constant; zero for spheres.
    pub fn conic(&self) -> f64 {
        match self {
            Self::Spherical { .. } => 0.0,
            Self::EvenAsphere(a) | Self::OddAsphere(a) => a.conic,
        }
    }

    /// Axial elevation of the surface at `(x, y)`.
    pub fn sag(&self, x: f64, y: f64) -> Result<f64> {
        let r2 = x * x + y * y;
        match self {
            Self::Spherical { curvature } => {
                if curvature.abs() < f64::EPSILON {
                    return Ok(0.0);
                }
                Ok(conic_terms(*curvature, 0.0, r2)?.sag)
            }
            Self::EvenAsphere(a) => {
                let mut z = conic_terms(a.curvature, a.conic, r2)?.sag;
                let mut r_pow = r2;
                for coef in a.active() {
                    r_pow *= r2;
                    z += coef * r_pow;
                }
                Ok(z)
            }
            Self::OddAsphere(a) => {
                let mut z = conic_terms(a.curvature, a.conic, r2)?.sag;
                let r = r2.sqrt();
                let mut r_pow = r2;
                for coef in a.active() {
                    r_pow *= r;
                    z += coef * r_pow;
                }
                Ok(z)
            }
        }
    }

    /// `dz/dr` divided by `r`, so that the gradient is `(-e x, -e y, 1)`.
    fn slope_over_r(&self, r2: f64) -> Result<f64> {
        match self {
            Self::Spherical { curvature } => Ok(conic_terms(*curvature, 0.0, r2)?.slope_over_r),
            Self::EvenAsphere(a) => {
                let mut e = conic_terms(a.curvature, a.conic, r2)?.slope_over_r;
                let mut r_pow = 1.0;
                for (i, coef) in a.active().iter().enumerate() {
                    r_pow *= r2;
                    e += (2 * i + 4) as f64 * coef * r_pow;
                }
                Ok(e)
            }
            Self::OddAsphere(a) => {
                let mut e = conic_terms(a.curvature, a.conic, r2)?.slope_over_r;
                let r = r2.sqrt();
                let mut r_pow = 1.0;
                for (i, coef) in a.active().iter().enumerate() {
                    r_pow *= r;
                    e += (i + 3) as f64 * coef * r_pow;
                }
                Ok(e)
            }
        }
    }

    /// Unit surface normal at `p`, pointing along `+z` near the vertex.
    pub fn normal(&self, p: &Point3) -> Result<Vec3> {
        Ok(self.df(p)?.normalize())
    }

    /// Intersect the line `p0 + s dir` with this profile.
    ///
    /// `p0` should be close to the vertex plane; the trace passes the foot
    /// of the perpendicular from the vertex onto the ray.
    pub fn intersect(
        &self,
        p0: &Point3,
        dir: &Vec3,
        options: &IntersectOptions,
    ) -> Result<(Point3, f64)> {
        let (p, s) = intersect(self, p0, dir, options)?;
        if let Self::Spherical { curvature } = self {
            // The implicit sphere also vanishes on the far hemisphere.
            if 1.0 - curvature * p.z <= 0.0 {
                return Err(GeomError::InvalidRadicand((p.x * p.x + p.y * p.y).sqrt()));
            }
        }
        Ok((p, s))
    }

    /// First derivative of the meridional section `z(h)`.
    pub fn deriv_1st(&self, h: f64) -> Result<f64> {
        Ok(self.slope_over_r(h * h)? * h)
    }

    /// Second derivative of the meridional section `z(h)`.
    pub fn deriv_2nd(&self, h: f64) -> Result<f64> {
        let r2 = h * h;
        let base = |c: f64, k: f64| -> Result<f64> {
            let terms = conic_terms(c, k, r2)?;
            if terms.root == 0.0 {
                return Ok(f64::INFINITY);
            }
            Ok(c / terms.root.powi(3))
        };
        match self {
            Self::Spherical { curvature } => base(*curvature, 0.0),
            Self::EvenAsphere(a) => {
                let mut d2 = base(a.curvature, a.conic)?;
                let mut r_pow = 1.0;
                for (i, coef) in a.active().iter().enumerate() {
                    r_pow *= r2;
                    let n = (2 * i + 4) as f64;
                    d2 += n * (n - 1.0) * coef * r_pow;
                }
                Ok(d2)
            }
            Self::OddAsphere(a) => {
                let mut d2 = base(a.curvature, a.conic)?;
                let r = h.abs();
                let mut r_pow = 1.0;
                for (i, coef) in a.active().iter().enumerate() {
                    r_pow *= r;
                    let n = (i + 3) as f64;
                    d2 += n * (n - 1.0) * coef * r_pow;
                }
                Ok(d2)
            }
        }
    }
}

impl ImplicitSurface for SurfaceProfile {
    fn f(&self, p: &Point3) -> Result<f64> {
        match self {
            // Implicit sphere: zero on the whole sphere, no radicand.
            Self::Spherical { curvature } => Ok(p.z - 0.5 * curvature * p.coords.norm_squared()),
            _ => Ok(p.z - self.sag(p.x, p.y)?),
        }
    }

    fn df(&self, p: &Point3) -> Result<Vec3> {
        match self {
            Self::Spherical { curvature } => {
                let c = *curvature;
                Ok(Vec3::new(-c * p.x, -c * p.y, 1.0 - c * p.z))
            }
            _ => {
                let e = self.slope_over_r(p.x * p.x + p.y * p.y)?;
                Ok(Vec3::new(-e * p.x, -e * p.y, 1.0))
            }
        }
    }
}
