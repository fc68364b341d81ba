//! First-order system data.

use std::fmt;

use refract_math::Vec2;
use refract_model::{FieldType, OpticalSpec, PupilType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ParaxialError, Result};
use crate::ray::ParaxialRay;
use crate::trace::ParaxialTrace;

/// Magnitude used for a pupil at infinity (telecentric space).
pub const FAR_PUPIL_DISTANCE: f64 = 1.0e10;

/// `|ck1|` below this is treated as an afocal system.
const AFOCAL_EPSILON: f64 = f64::EPSILON;

/// Paraxial properties of the whole system at the reference wavelength.
///
/// Distances follow the usual sign conventions: the entrance pupil
/// distance is measured from the first surface, the exit pupil distance
/// from the image surface, the principal planes from the first and last
/// surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FirstOrderData {
    /// Effective focal length.
    pub efl: f64,
    /// Front focal length.
    pub ffl: f64,
    /// Back focal length.
    pub bfl: f64,
    /// Working F-number.
    pub fno: f64,
    /// Reduction ratio (object-to-image scale for finite conjugates).
    pub red: f64,
    /// Object distance (object gap thickness).
    pub obj_dist: f64,
    /// Chief ray object-space angle in degrees, at the maximum field.
    pub obj_ang: f64,
    /// Image distance (image-space gap thickness).
    pub img_dist: f64,
    /// Paraxial image height at the maximum field.
    pub img_ht: f64,
    /// Entrance pupil position relative to the first surface.
    pub enp_dist: f64,
    /// Entrance pupil radius.
    pub enp_radius: f64,
    /// Exit pupil position relative to the image surface.
    pub exp_dist: f64,
    /// Exit pupil radius.
    pub exp_radius: f64,
    /// Lagrange invariant.
    pub opt_inv: f64,
    /// First principal plane relative to the first surface.
    pub pp1: f64,
    /// Second principal plane relative to the last surface.
    pub ppk: f64,
    /// Object-space index.
    pub n_obj: f64,
    /// Image-space index.
    pub n_img: f64,
    /// Object-space numerical aperture.
    pub obj_na: f64,
    /// Image-space numerical aperture.
    pub img_na: f64,
    /// Starting height of the reference axial ray.
    pub ref_y0: f64,
    /// Starting slope of the reference axial ray.
    pub ref_u0: f64,
    /// Starting height of the reference chief ray.
    pub ref_ybar0: f64,
    /// Starting slope of the reference chief ray.
    pub ref_ubar0: f64,
}

impl FirstOrderData {
    /// Object distance plus entrance pupil distance.
    pub fn object_to_entrance_pupil(&self) -> f64 {
        self.obj_dist + self.enp_dist
    }

    /// Reference axial ray starting `(y, u)`.
    pub fn axial_start(&self) -> Vec2 {
        Vec2::new(self.ref_y0, self.ref_u0)
    }

    /// Reference chief ray starting `(y, u)`.
    pub fn chief_start(&self) -> Vec2 {
        Vec2::new(self.ref_ybar0, self.ref_ubar0)
    }
}

impl<'a> ParaxialTrace<'a> {
    /// Compute first-order data for `spec` at its reference wavelength.
    pub fn first_order_data(&self, spec: &OpticalSpec) -> Result<FirstOrderData> {
        spec.validate()?;
        let wvl = spec.reference_wavelength()?;
        let assembly = self.assembly();
        let img = assembly.image_index();
        let stop = assembly.stop_index();

        let n0 = assembly.object_space_gap().refractive_index(wvl);
        let nk = assembly.image_space_gap().refractive_index(wvl);
        let thi0 = assembly.object_space_gap().finite_thickness();
        let img_dist = assembly.image_space_gap().thickness();

        let p = Vec2::new(1.0, 0.0);
        let q = Vec2::new(0.0, 1.0 / n0);
        let mk = self.system_matrix(1, img - 1, wvl)?;
        let ms = self.system_matrix(1, stop, wvl)?;
        let (yk_p, ys_p) = (mk * p, ms * p);
        let (yk_q, ys_q) = (mk * q, ms * q);

        let as1 = ys_p.x;
        let bs1 = ys_q.x;
        let ck1 = yk_p.y;
        let dk1 = yk_q.y;

        let red = dk1 + thi0 * ck1;
        let enp_dist = far_if_unbounded(bs1 / (n0 * as1));
        let obj2enp = thi0 + enp_dist;

        let u0 = starting_slope(spec, n0, nk, obj2enp, red)?;
        let y0 = 0.0;

        let max_field = spec.fields.max_field();
        let (ybar0, ubar0) = chief_start(spec.fields.field_type, max_field, obj2enp, red);

        let ax = self.trace_paraxial_ray_from_object(y0, u0, wvl)?;
        let pr = self.trace_paraxial_ray_from_object(ybar0, ubar0, wvl)?;
        let opt_inv = invariant(&ax, &pr, n0);

        // An on-axis-only spec has no chief ray; locate the pupils with a unit one.
        let pupil_ray = if max_field == 0.0 {
            self.trace_paraxial_ray_from_object(-obj2enp, 1.0, wvl)?
        } else {
            pr.clone()
        };
        let pupil_inv = invariant(&ax, &pupil_ray, n0);

        let ax_img = ax.at(img).copied().unwrap_or_default();
        let pupil_img = pupil_ray.at(img).copied().unwrap_or_default();
        let ax_obj = ax.at(0).copied().unwrap_or_default();
        let pr_obj = pr.at(0).copied().unwrap_or_default();

        let (efl, pp1, ppk) = if ck1.abs() < AFOCAL_EPSILON {
            warn!(ck1, "afocal system, focal lengths are infinite");
            (f64::INFINITY, f64::INFINITY, f64::INFINITY)
        } else {
            (-1.0 / ck1, (dk1 - 1.0) * (n0 / ck1), (yk_p.x - 1.0) * (nk / ck1))
        };
        let (ffl, bfl) = if efl.is_infinite() {
            (f64::INFINITY, f64::INFINITY)
        } else {
            (pp1 - efl, efl - ppk)
        };

        let exp_dist = far_if_unbounded(-(pupil_img.y / pupil_img.u_prime - img_dist));
        let exp_radius = (pupil_inv / (nk * pupil_img.u_prime)).abs();

        let fod = FirstOrderData {
            efl,
            ffl,
            bfl,
            fno: -1.0 / (2.0 * nk * ax_img.u_prime),
            red,
            obj_dist: thi0,
            obj_ang: pr_obj.u_prime.atan().to_degrees(),
            img_dist,
            img_ht: -opt_inv / (nk * ax_img.u_prime),
            enp_dist,
            enp_radius: (u0 * obj2enp).abs(),
            exp_dist,
            exp_radius: if exp_radius.is_finite() {
                exp_radius
            } else {
                FAR_PUPIL_DISTANCE
            },
            opt_inv,
            pp1,
            ppk,
            n_obj: n0,
            n_img: nk,
            obj_na: n0 * ax_obj.u_prime.atan().sin(),
            img_na: nk * ax_img.u_prime.atan().sin(),
            ref_y0: y0,
            ref_u0: u0,
            ref_ybar0: ybar0,
            ref_ubar0: ubar0,
        };
        debug!(efl = fod.efl, fno = fod.fno, enp = fod.enp_dist, "first order data");
        Ok(fod)
    }

    /// Trace the reference axial (marginal) ray.
    pub fn trace_axial_ray(&self, fod: &FirstOrderData, wavelength_nm: f64) -> Result<ParaxialRay> {
        Ok(self
            .trace_paraxial_ray_from_object(fod.ref_y0, fod.ref_u0, wavelength_nm)?
            .with_name("Axial Ray"))
    }

    /// Trace the reference chief ray.
    pub fn trace_chief_ray(&self, fod: &FirstOrderData, wavelength_nm: f64) -> Result<ParaxialRay> {
        Ok(self
            .trace_paraxial_ray_from_object(fod.ref_ybar0, fod.ref_ubar0, wavelength_nm)?
            .with_name("Chief Ray"))
    }
}

fn invariant(ax: &ParaxialRay, pr: &ParaxialRay, n0: f64) -> f64 {
    match (ax.at(0), ax.at(1), pr.at(0), pr.at(1)) {
        (Some(a0), Some(a1), Some(p0), Some(p1)) => n0 * (a1.y * p0.u_prime - p1.y * a0.u_prime),
        _ => 0.0,
    }
}

fn far_if_unbounded(value: f64) -> f64 {
    if value.is_nan() {
        FAR_PUPIL_DISTANCE
    } else if value.is_infinite() {
        FAR_PUPIL_DISTANCE.copysign(value)
    } else {
        value
    }
}

fn starting_slope(spec: &OpticalSpec, n0: f64, nk: f64, obj2enp: f64, red: f64) -> Result<f64> {
    let value = spec.pupil.value;
    let bad = || ParaxialError::InvalidPupil(value);
    match spec.pupil.pupil_type {
        PupilType::EntrancePupilDiameter => {
            if value <= 0.0 {
                return Err(bad());
            }
            Ok(0.5 * value / obj2enp)
        }
        PupilType::ObjectNa => {
            if value <= 0.0 || value >= n0 {
                return Err(bad());
            }
            Ok((value / n0).asin().tan())
        }
        PupilType::FNumber => {
            if value <= 0.0 {
                return Err(bad());
            }
            let uk = -1.0 / (2.0 * value);
            Ok(uk / red)
        }
        PupilType::ImageNa => {
            if value <= 0.0 || value >= nk {
                return Err(bad());
            }
            let uk = -(value / nk).asin().tan();
            Ok(uk / red)
        }
    }
}

fn chief_start(field_type: FieldType, max_field: f64, obj2enp: f64, red: f64) -> (f64, f64) {
    match field_type {
        FieldType::ObjectAngle => {
            let ubar0 = max_field.to_radians().tan();
            (-ubar0 * obj2enp, ubar0)
        }
        FieldType::ObjectHeight => {
            let ybar0 = -max_field;
            (ybar0, -ybar0 / obj2enp)
        }
        FieldType::ImageHeight => {
            let ybar0 = red * max_field;
            (ybar0, -ybar0 / obj2enp)
        }
    }
}

impl fmt::Display for FirstOrderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Effective Focal Length", self.efl),
            ("Front Focal Length", self.ffl),
            ("Back Focal Length", self.bfl),
            ("F/#", self.fno),
            ("Reduction Rate", self.red),
            ("Object Distance", self.obj_dist),
            ("Object Angle", self.obj_ang),
            ("Image Distance", self.img_dist),
            ("Image Height", self.img_ht),
            ("Entrance Pupil Distance", self.enp_dist),
            ("Entrance Pupil Radius", self.enp_radius),
            ("Exit Pupil Distance", self.exp_dist),
            ("Exit Pupil Radius", self.exp_radius),
            ("Object NA", self.obj_na),
            ("Image NA", self.img_na),
            ("Optical Invariant", self.opt_inv),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<30}{value:>20.4}")?;
        }
        Ok(())
    }
}
