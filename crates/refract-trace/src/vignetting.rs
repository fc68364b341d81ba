//! Vignetting factor search.

use refract_math::Point2;
use refract_model::{Field, VignettingFactors};
use refract_paraxial::{ParaxialError, ParaxialTrace};
use tracing::debug;

use crate::error::{Result, TraceError};
use crate::path::SequentialPath;
use crate::ray::RayStatus;
use crate::trace::SequentialTrace;

/// Pupil edges searched, in `vuy, vly, vux, vlx` order.
const PUPIL_EDGES: [(f64, f64); 4] = [(0.0, 1.0), (0.0, -1.0), (1.0, 0.0), (-1.0, 0.0)];

/// Fixed inputs of one field's search.
struct EdgeSearch<'p, 'a> {
    path: &'p SequentialPath<'a>,
    field: &'p Field,
    stop: usize,
    stop_radius: f64,
}

impl<'a> SequentialTrace<'a> {
    /// Vignetting factors for `field` at the reference wavelength.
    ///
    /// Each factor is the smallest reduction `m` of the pupil edge at which
    /// the ray passes every clear aperture and lands inside the stop. All
    /// factors are zero when no surface carries a clear aperture.
    pub fn compute_vignetting_factors(&self, field: &Field) -> Result<VignettingFactors> {
        let assembly = self.assembly();
        let img = assembly.image_index();
        let has_aperture = assembly.surfaces()[1..img]
            .iter()
            .any(|s| !s.clear_aperture().is_none());
        if !has_aperture {
            return Ok(VignettingFactors::default());
        }

        let wvl = self.spec().reference_wavelength()?;
        let path = self.create_path(wvl);
        let search = EdgeSearch {
            path: &path,
            field,
            stop: assembly.stop_index(),
            stop_radius: self.stop_radius(wvl)?,
        };

        let mut factors = [0.0; 4];
        for (factor, &(x, y)) in factors.iter_mut().zip(PUPIL_EDGES.iter()) {
            *factor = self.edge_factor(&search, Point2::new(x, y))?;
        }
        let [vuy, vly, vux, vlx] = factors;
        debug!(vuy, vly, vux, vlx, "vignetting factors");
        Ok(VignettingFactors { vuy, vly, vux, vlx })
    }

    /// Physical stop radius: its clear aperture, else the paraxial marginal height.
    pub fn stop_radius(&self, wavelength_nm: f64) -> Result<f64> {
        let assembly = self.assembly();
        let aperture = assembly.stop().clear_aperture();
        if !aperture.is_none() {
            return Ok(aperture.max_dimension());
        }
        let stop = assembly.stop_index();
        let axial = ParaxialTrace::new(assembly).trace_axial_ray(self.first_order_data(), wavelength_nm)?;
        let seg = axial.at(stop).ok_or(ParaxialError::SurfaceIndex {
            index: stop,
            count: axial.len(),
        })?;
        Ok(seg.y.abs())
    }

    /// Bisect the reduction of pupil edge `full` on `[0, 1]`.
    ///
    /// A full edge ray landing on the stop rim within tolerance is unvignetted.
    fn edge_factor(&self, search: &EdgeSearch<'_, '_>, full: Point2) -> Result<f64> {
        let opts = self.settings().vignetting;
        if !self.edge_clipped(search, full, 0.0, opts.tolerance)? {
            return Ok(0.0);
        }
        if self.edge_clipped(search, full, 1.0, 0.0)? {
            return Err(TraceError::ChiefRayBlocked);
        }

        let (mut a, mut b) = (0.0_f64, 1.0_f64);
        let mut iterations = 0;
        while b - a > opts.tolerance {
            if iterations >= opts.max_iterations {
                return Err(TraceError::VignettingNotConverged(iterations));
            }
            let m = 0.5 * (a + b);
            if self.edge_clipped(search, full, m, 0.0)? {
                a = m;
            } else {
                b = m;
            }
            iterations += 1;
        }
        Ok(b)
    }

    /// Trace edge `full` reduced by `m` and test it against every aperture.
    ///
    /// The stop compares ray height with its physical radius plus `stop_slack`;
    /// the other surfaces use their clear apertures. Clipping ahead of a missed
    /// surface or TIR still counts as blocked.
    fn edge_clipped(
        &self,
        search: &EdgeSearch<'_, '_>,
        full: Point2,
        m: f64,
        stop_slack: f64,
    ) -> Result<bool> {
        let pupil = Point2::from(full.coords * (1.0 - m));
        let (pt0, dir0) = self.launch(pupil, search.field, false);
        let ray = self.trace_with(search.path, pt0, dir0, pupil, false);

        let clipped = ray.segments().iter().enumerate().skip(1).any(|(i, seg)| {
            if i == search.stop {
                seg.height() > search.stop_radius + stop_slack
            } else {
                search
                    .path
                    .at(i)
                    .is_some_and(|c| !c.surface.point_inside(seg.x(), seg.y()))
            }
        });
        match ray.status() {
            _ if clipped => Ok(true),
            RayStatus::Success => Ok(false),
            status => Err(TraceError::VignettingRayFailed(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use refract_geom::Aperture;
    use refract_model::OpticalAssembly;

    use super::*;
    use crate::trace::tests::{fod, singlet, spec_with_fields};
    use crate::TraceSettings;

    /// Factors of the singlet with a clear aperture of `radius` on `surface`.
    ///
    /// Surface 1 is the stop; the 5 mm beam is collimated up to surface 2.
    fn factors_with_aperture(
        surface: usize,
        radius: Option<f64>,
        field_y: f64,
    ) -> Result<VignettingFactors> {
        let mut asm: OpticalAssembly = singlet();
        if let Some(r) = radius {
            asm.surface_mut(surface)
                .unwrap()
                .set_clear_aperture(Aperture::circular(r));
        }
        let spec = spec_with_fields(&[(0.0, field_y)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        tracer.compute_vignetting_factors(&spec.fields.fields[0])
    }

    #[test]
    fn test_no_apertures_no_vignetting() {
        assert_eq!(
            factors_with_aperture(2, None, 0.0).unwrap(),
            VignettingFactors::default()
        );
    }

    #[test]
    fn test_oversized_aperture_no_vignetting() {
        assert_eq!(
            factors_with_aperture(2, Some(20.0), 0.0).unwrap(),
            VignettingFactors::default()
        );
    }

    #[test]
    fn test_collimated_beam_clipped_by_front_aperture() {
        let v = factors_with_aperture(2, Some(3.0), 0.0).unwrap();
        assert_abs_diff_eq!(v.vuy, 0.4, epsilon = 1e-4);
        assert_abs_diff_eq!(v.vly, v.vuy, epsilon = 1e-9);
        assert_abs_diff_eq!(v.vux, v.vuy, epsilon = 1e-9);
        assert_abs_diff_eq!(v.vlx, v.vuy, epsilon = 1e-9);
    }

    #[test]
    fn test_shrinking_lens_aperture_never_reduces_vignetting() {
        let mut last = 0.0;
        for radius in [4.5, 4.0, 3.0, 2.0, 1.0] {
            let v = factors_with_aperture(2, Some(radius), 0.0).unwrap();
            assert!(v.vuy >= last);
            last = v.vuy;
        }
    }

    #[test]
    fn test_shrinking_stop_aperture_never_reduces_vignetting() {
        let mut last = 0.0;
        for radius in [6.0, 5.0, 4.5, 4.0, 3.0, 2.0, 1.0] {
            let v = factors_with_aperture(1, Some(radius), 0.0).unwrap();
            if radius >= 5.0 {
                assert_eq!(v, VignettingFactors::default(), "radius {radius}");
            } else {
                assert_abs_diff_eq!(v.vuy, 1.0 - radius / 5.0, epsilon = 1e-4);
            }
            assert!(v.vuy >= last, "radius {radius}");
            assert_abs_diff_eq!(v.vux, v.vuy, epsilon = 1e-12);
            assert_abs_diff_eq!(v.vlx, v.vux, epsilon = 1e-12);
            assert_abs_diff_eq!(v.vly, v.vuy, epsilon = 1e-12);
            last = v.vuy;
        }
    }

    #[test]
    fn test_stop_aperture_at_beam_radius_is_unvignetted() {
        // Off axis the x edges land a hair off the rim; both axes must agree.
        for field_y in [0.0, 10.0] {
            let v = factors_with_aperture(1, Some(5.0), field_y).unwrap();
            assert_eq!(v, VignettingFactors::default(), "field {field_y}");
        }
    }

    #[test]
    fn test_blocked_chief_ray() {
        // The 5 degree chief ray crosses surface 2 about 0.09 mm off axis.
        assert_eq!(
            factors_with_aperture(2, Some(0.01), 5.0).unwrap_err(),
            TraceError::ChiefRayBlocked
        );
    }

    #[test]
    fn test_iteration_cap() {
        let mut asm = singlet();
        asm.surface_mut(2)
            .unwrap()
            .set_clear_aperture(Aperture::circular(3.0));
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let mut settings = TraceSettings::default();
        settings.vignetting.max_iterations = 3;
        let tracer = SequentialTrace::new(&asm, &spec, &fod).with_settings(settings);
        assert_eq!(
            tracer.compute_vignetting_factors(&spec.fields.fields[0]).unwrap_err(),
            TraceError::VignettingNotConverged(3)
        );
    }

    #[test]
    fn test_stop_radius_from_marginal_ray() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        assert_abs_diff_eq!(tracer.stop_radius(550.0).unwrap(), 5.0, epsilon = 1e-9);
    }
}
