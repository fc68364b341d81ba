//! Chief ray aiming.

use refract_math::{Point2, Point3, Vec2};
use refract_model::Field;
use tracing::debug;

use crate::error::{Result, TraceError};
use crate::path::SequentialPath;
use crate::trace::SequentialTrace;

/// Result of aiming one field's chief ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiefRayAim {
    /// Launch offset in the entrance pupil plane.
    pub aim_pt: Point2,
    /// Object point the chief ray starts from.
    pub object_pt: Point3,
    /// Secant iterations used.
    pub iterations: usize,
}

impl<'a> SequentialTrace<'a> {
    /// Aim the chief ray of `field` at the center of the stop.
    pub fn aim_chief_ray(&self, field: &Field, wavelength_nm: f64) -> Result<ChiefRayAim> {
        self.aim_at_stop_point(field, wavelength_nm, Point2::origin())
    }

    /// Find the entrance pupil offset whose ray crosses the stop at `target`.
    ///
    /// Secant search along the field direction (`+y` for an on-axis field).
    /// A trial ray that fails before the stop aborts the search.
    pub fn aim_at_stop_point(
        &self,
        field: &Field,
        wavelength_nm: f64,
        target: Point2,
    ) -> Result<ChiefRayAim> {
        let path = self.create_path(wavelength_nm);
        let stop = self.assembly().stop_index();
        let object_pt = self.default_object_point(field);
        let z_enp = self.first_order_data().object_to_entrance_pupil();

        let e = field_direction(field);
        let target_e = target.coords.dot(&e);
        let opts = self.settings().aiming;
        let step = self.settings().aiming_step;

        let residual = |t: f64| -> Result<f64> {
            self.stop_offset(&path, object_pt, Point3::new(t * e.x, t * e.y, z_enp), stop, &e)
                .map(|h| h - target_e)
        };

        let mut t = 0.0;
        for iteration in 0..opts.max_iterations {
            let r1 = residual(t)?;
            debug!(iteration, t, residual = r1, "aiming chief ray");
            if r1.abs() < opts.tolerance {
                return Ok(ChiefRayAim {
                    aim_pt: Point2::new(t * e.x, t * e.y),
                    object_pt,
                    iterations: iteration,
                });
            }
            let r2 = residual(t + step)?;
            let slope = (r2 - r1) / step;
            if !slope.is_finite() || slope == 0.0 {
                return Err(TraceError::AimingNotConverged(iteration + 1));
            }
            t -= r1 / slope;
        }
        Err(TraceError::AimingNotConverged(opts.max_iterations))
    }

    /// Offset along `e` of a ray through `pt1` at surface `stop`.
    fn stop_offset(
        &self,
        path: &SequentialPath<'_>,
        pt0: Point3,
        pt1: Point3,
        stop: usize,
        e: &Vec2,
    ) -> Result<f64> {
        let ray = self.trace_with(path, pt0, (pt1 - pt0).normalize(), Point2::origin(), false);
        let seg = ray.at(stop).ok_or(TraceError::AimingRayFailed {
            status: ray.status(),
            target: stop,
        })?;
        Ok(seg.x() * e.x + seg.y() * e.y)
    }
}

fn field_direction(field: &Field) -> Vec2 {
    let v = Vec2::new(field.x, field.y);
    let norm = v.norm();
    if norm > 0.0 {
        v / norm
    } else {
        Vec2::new(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use refract_material::{spectral_line, BuchdahlGlass, Material};
    use refract_model::{Gap, OpticalAssembly, Surface};

    use super::*;
    use crate::trace::tests::{fod, spec_with_fields};
    use crate::TraceSettings;

    /// Singlet with the stop 10 mm behind it.
    fn rear_stop() -> OpticalAssembly {
        let air = Arc::new(Material::Air);
        let glass = Arc::new(Material::Model(BuchdahlGlass::new(1.5, 64.0).unwrap()));
        let mut asm = OpticalAssembly::minimum(Arc::clone(&air));
        asm.insert(1, Surface::spherical(50.0).unwrap(), Gap::new(2.0, glass))
            .unwrap();
        asm.insert(2, Surface::spherical(-50.0).unwrap(), Gap::new(10.0, air))
            .unwrap();
        asm.gap_mut(0).unwrap().set_thickness(f64::INFINITY);
        asm.gap_mut(3).unwrap().set_thickness(40.0);
        asm.update_model();
        asm
    }

    #[test]
    fn test_on_axis_needs_no_aim() {
        let asm = rear_stop();
        assert_eq!(asm.stop_index(), 3);
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let aim = tracer
            .aim_chief_ray(&spec.fields.fields[0], spectral_line::D_HELIUM)
            .unwrap();
        assert_eq!(aim.aim_pt, Point2::origin());
        assert_eq!(aim.iterations, 0);
    }

    #[test]
    fn test_aimed_chief_ray_crosses_stop_center() {
        let asm = rear_stop();
        let spec = spec_with_fields(&[(0.0, 0.0), (0.0, 5.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let mut field = spec.fields.fields[1].clone();
        let aim = tracer
            .aim_chief_ray(&field, spectral_line::D_HELIUM)
            .unwrap();
        assert_eq!(aim.aim_pt.x, 0.0);

        field.aim_pt = aim.aim_pt;
        let ray = tracer.trace_pupil_ray(Point2::origin(), &field, spectral_line::D_HELIUM);
        assert!(ray.is_success());
        let at_stop = ray.at(asm.stop_index()).unwrap();
        assert!(at_stop.y().abs() < 1e-4);
        assert_eq!(ray.at(0).unwrap().point, aim.object_pt);
    }

    #[test]
    fn test_iteration_cap_is_an_error() {
        let asm = rear_stop();
        let spec = spec_with_fields(&[(0.0, 0.0), (0.0, 5.0)]);
        let fod = fod(&asm, &spec);
        let mut settings = TraceSettings::default();
        settings.aiming.tolerance = 1e-300;
        settings.aiming.max_iterations = 1;
        let tracer = SequentialTrace::new(&asm, &spec, &fod).with_settings(settings);
        let err = tracer
            .aim_chief_ray(&spec.fields.fields[1], spectral_line::D_HELIUM)
            .unwrap_err();
        assert_eq!(err, TraceError::AimingNotConverged(1));
    }

    #[test]
    fn test_field_direction() {
        assert_eq!(field_direction(&Field::new(0.0, 0.0)), Vec2::new(0.0, 1.0));
        let e = field_direction(&Field::new(3.0, 4.0));
        assert!((e.x - 0.6).abs() < 1e-15 && (e.y - 0.8).abs() < 1e-15);
    }
}
