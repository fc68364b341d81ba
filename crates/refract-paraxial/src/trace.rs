//! Paraxial ray trace and system matrices.
//!
//! Rays are traced with the `(y, u)` recurrence
//!
//! ```text
//! i_k     = u_k + y_k c_k
//! u'_k    = i_k n_k / n'_k - y_k c_k
//! y_{k+1} = y_k + t_k u'_k
//! ```
//!
//! System matrices act on `(y, nu)` and are built from refraction
//! `[[1, 0], [-(n'-n)c, 1]]` and transfer `[[1, t/n'], [0, 1]]` matrices.

use refract_math::Matrix2;
use refract_model::OpticalAssembly;

use crate::error::Result;
use crate::path::ParaxialPath;
use crate::ray::ParaxialRay;

/// Paraxial tracer over a borrowed assembly.
#[derive(Debug, Clone, Copy)]
pub struct ParaxialTrace<'a> {
    assembly: &'a OpticalAssembly,
}

impl<'a> ParaxialTrace<'a> {
    /// Tracer for `assembly`.
    pub fn new(assembly: &'a OpticalAssembly) -> Self {
        Self { assembly }
    }

    /// The traced assembly.
    pub fn assembly(&self) -> &'a OpticalAssembly {
        self.assembly
    }

    /// Path from surface `start` to `end` at `wavelength_nm`; reversed when `start > end`.
    pub fn create_path(&self, start: usize, end: usize, wavelength_nm: f64) -> Result<ParaxialPath> {
        ParaxialPath::new(self.assembly, start, end, wavelength_nm)
    }

    /// Trace a ray starting at the object surface with height `y0` and slope `u0`.
    pub fn trace_paraxial_ray_from_object(
        &self,
        y0: f64,
        u0: f64,
        wavelength_nm: f64,
    ) -> Result<ParaxialRay> {
        let path = self.create_path(0, self.assembly.image_index(), wavelength_nm)?;
        Ok(trace_path(&path, y0, u0))
    }

    /// Trace the ray of unit height travelling parallel to the axis.
    pub fn trace_paraxial_ray_parallel_to_axis_at_s1(&self, wavelength_nm: f64) -> Result<ParaxialRay> {
        self.trace_paraxial_ray_from_object(1.0, 0.0, wavelength_nm)
    }

    /// `(y, nu)` transfer matrix from just before surface `s1` to just after `s2`.
    ///
    /// ```text
    /// | y'  |   | A B | | y  |
    /// | nu' | = | C D | | nu |
    /// ```
    pub fn system_matrix(&self, s1: usize, s2: usize, wavelength_nm: f64) -> Result<Matrix2> {
        let path = self.create_path(s1, s2, wavelength_nm)?;
        let gaps = self.assembly.gaps();
        let mut n = if s1 > 0 {
            gaps[s1 - 1].refractive_index(wavelength_nm)
        } else {
            gaps[0].refractive_index(wavelength_nm)
        };

        let mut m = Matrix2::identity();
        let last = path.len().saturating_sub(1);
        for comp in path.iter().take(last) {
            let n_prime = comp.refractive_index;
            m = refraction(n, n_prime, comp.curvature) * m;
            m = transfer(comp.thickness, n_prime) * m;
            n = n_prime;
        }
        if let Some(comp) = path.back() {
            m = refraction(n, comp.refractive_index, comp.curvature) * m;
        }
        Ok(m)
    }
}

/// Run the recurrence along `path`.
pub(crate) fn trace_path(path: &ParaxialPath, y0: f64, u0: f64) -> ParaxialRay {
    let mut ray = ParaxialRay::new();
    let Some(obj) = path.at(0) else {
        return ray;
    };

    let n0 = obj.refractive_index;
    ray.push(y0, u0, y0 * obj.curvature + u0, n0);

    let mut y = y0 + obj.thickness * u0;
    let mut u = u0;
    let mut n = n0;
    for comp in path.iter().skip(1) {
        let c = comp.curvature;
        let n_prime = comp.refractive_index;
        let i = u + y * c;
        let u_prime = i * (n / n_prime) - y * c;
        ray.push(y, u_prime, i, n_prime);

        y += comp.thickness * u_prime;
        u = u_prime;
        n = n_prime;
    }
    ray
}

fn refraction(n: f64, n_prime: f64, curvature: f64) -> Matrix2 {
    Matrix2::new(1.0, 0.0, -(n_prime - n) * curvature, 1.0)
}

fn transfer(thickness: f64, n_prime: f64) -> Matrix2 {
    Matrix2::new(1.0, thickness / n_prime, 0.0, 1.0)
}
