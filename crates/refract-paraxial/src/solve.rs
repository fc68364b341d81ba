//! Evaluating gap solves against the paraxial model.

use refract_model::{ModelError, Solve};

use crate::error::Result;
use crate::first_order::FirstOrderData;
use crate::trace::ParaxialTrace;

impl<'a> ParaxialTrace<'a> {
    /// Thickness `solve` asks for gap `gap`.
    ///
    /// The marginal height solve traces the reference axial ray scaled by
    /// `zone` and moves the next surface to where that ray reaches `height`.
    pub fn solved_thickness(
        &self,
        gap: usize,
        solve: &Solve,
        fod: &FirstOrderData,
        wavelength_nm: f64,
    ) -> Result<f64> {
        let current = self.assembly().gap(gap)?.thickness();
        let Solve::MarginalHeight { height, zone } = *solve else {
            let thickness = self.assembly().geometric_solve(gap, solve)?;
            return Ok(thickness.unwrap_or(current));
        };
        let ray = self.trace_paraxial_ray_from_object(
            fod.ref_y0 * zone,
            fod.ref_u0 * zone,
            wavelength_nm,
        )?;
        let seg = ray.at(gap).ok_or(ModelError::SurfaceIndex {
            index: gap,
            count: ray.len(),
        })?;
        if seg.u_prime.abs() < f64::EPSILON {
            return Err(ModelError::InvalidSolve {
                gap,
                reason: "marginal ray is parallel to the axis",
            }
            .into());
        }
        Ok((height - seg.y) / seg.u_prime)
    }
}
