//! Coddington equations along a traced chief ray.
//!
//! Follows Kingslake, *Lens Design Fundamentals*: sagittal and tangential
//! conjugate distances are carried surface by surface along the real ray
//! using the oblique powers at each intersection.

use refract_geom::ProfileKind;
use refract_math::Point2;
use refract_model::{Field, INFINITE_DISTANCE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::path::SequentialPath;
use crate::ray::Ray;
use crate::trace::SequentialTrace;

/// Sagittal and tangential focus positions relative to the image surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstigmaticFocus {
    /// Sagittal focus shift along the axis.
    pub sagittal: f64,
    /// Tangential focus shift along the axis.
    pub tangential: f64,
}

impl AstigmaticFocus {
    /// Tangential minus sagittal.
    pub fn astigmatism(&self) -> f64 {
        self.tangential - self.sagittal
    }
}

impl<'a> SequentialTrace<'a> {
    /// Trace the chief ray of `field` and run the Coddington equations along it.
    ///
    /// `None` if the chief ray fails.
    pub fn trace_coddington(&self, field: &Field, wavelength_nm: f64) -> Option<AstigmaticFocus> {
        let path = self.create_path(wavelength_nm);
        let ray = self.trace_pupil_ray_on(&path, Point2::origin(), field);
        self.coddington(&ray, &path)
    }

    /// Coddington equations along an already traced `ray`.
    ///
    /// `None` unless the ray reached the image.
    pub fn coddington(&self, ray: &Ray, path: &SequentialPath<'_>) -> Option<AstigmaticFocus> {
        if !ray.is_success() || ray.len() < 3 {
            return None;
        }
        let segs = ray.segments();

        let object = path.at(0)?;
        let (mut s, mut t) = if object.distance >= INFINITE_DISTANCE {
            (f64::INFINITY, f64::INFINITY)
        } else {
            let start = (-object.distance - segs[1].z()) / segs[0].direction.z;
            (start, start)
        };

        let mut n = object.refractive_index;
        let (mut s_after, mut t_after) = (0.0, 0.0);
        let mut cos_u_prime = 1.0;

        for i in 1..segs.len() - 1 {
            let component = path.at(i)?;
            let n_prime = component.refractive_index;
            let aoi = ray.angle_of_incidence(i)?;
            let (sin_i, cos_i) = aoi.sin_cos();
            let cos_i_prime = segs[i].angle_of_refraction().cos();
            let cos_u = segs[i - 1].direction.z;
            cos_u_prime = segs[i].direction.z;
            let sin_u = (1.0 - cos_u * cos_u).sqrt();

            let refraction = n_prime * cos_i_prime - n * cos_i;
            let profile = component.surface.profile();
            let (power_s, power_t) = match profile.kind() {
                ProfileKind::Spherical => {
                    let p = profile.curvature() * refraction;
                    (p, p)
                }
                ProfileKind::EvenAsphere | ProfileKind::OddAsphere => {
                    let y = segs[i].y();
                    let cs = if y.abs() < f64::EPSILON {
                        profile.curvature()
                    } else {
                        (sin_i * cos_u - cos_i * sin_u) / y
                    };
                    let d2z = match profile.deriv_2nd(y) {
                        Ok(d2z) => d2z,
                        Err(err) => {
                            debug!(surface = i, %err, "no second derivative");
                            return None;
                        }
                    };
                    let ct = d2z * (cos_i * cos_u + sin_i * sin_u).powi(3);
                    (cs * refraction, ct * refraction)
                }
            };

            let transfer = (component.distance + segs[i + 1].z() - segs[i].z()) / cos_u_prime;
            s_after = n_prime / (n / s + power_s);
            t_after = n_prime * cos_i_prime * cos_i_prime / (n * cos_i * cos_i / t + power_t);
            s = s_after - transfer;
            t = t_after - transfer;
            n = n_prime;
        }

        let z = segs[segs.len() - 2].z();
        let img_dist = self.assembly().image_space_gap().thickness();
        Some(AstigmaticFocus {
            sagittal: s_after * cos_u_prime + z - img_dist,
            tangential: t_after * cos_u_prime + z - img_dist,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use refract_material::spectral_line;

    use super::*;
    use crate::trace::tests::{fod, singlet, spec_with_fields};

    #[test]
    fn test_on_axis_reduces_to_paraxial_focus() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let focus = tracer
            .trace_coddington(&spec.fields.fields[0], spectral_line::D_HELIUM)
            .unwrap();
        assert_abs_diff_eq!(focus.sagittal, focus.tangential, epsilon = 1e-12);
        assert_abs_diff_eq!(focus.sagittal, fod.bfl - 49.665, epsilon = 1e-6);
    }

    #[test]
    fn test_off_axis_is_astigmatic() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0), (0.0, 10.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let focus = tracer
            .trace_coddington(&spec.fields.fields[1], spectral_line::D_HELIUM)
            .unwrap();
        assert!(focus.astigmatism().abs() > 1e-3);
        assert!(focus.sagittal.is_finite() && focus.tangential.is_finite());
    }

    #[test]
    fn test_failed_ray_has_no_focus() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let path = tracer.create_path(spectral_line::D_HELIUM);
        let ray = Ray::new(spectral_line::D_HELIUM, Point2::origin());
        assert!(tracer.coddington(&ray, &path).is_none());
    }
}
