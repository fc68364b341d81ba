//! Two-parameter model glass from `nd` and `vd`.

use crate::error::{MaterialError, Result};
use crate::spectral_line;

/// Slope of the normal glass line in Buchdahl coefficient space.
const NORMAL_LINE_SLOPE: f64 = -1.604_048;
/// Intercept of the normal glass line in Buchdahl coefficient space.
const NORMAL_LINE_INTERCEPT: f64 = -0.064_667;

/// A model glass following Buchdahl's chromatic coordinate expansion,
/// fitted so that it reproduces `nd` at the d line and `vd` over F and C.
#[derive(Debug, Clone, PartialEq)]
pub struct BuchdahlGlass {
    nd: f64,
    vd: f64,
    v1: f64,
    v2: f64,
}

impl BuchdahlGlass {
    /// Model glass for refractive index `nd` and Abbe number `vd`.
    pub fn new(nd: f64, vd: f64) -> Result<Self> {
        if !nd.is_finite() || nd < 1.0 {
            return Err(MaterialError::InvalidModelGlass(
                format!("{nd}:{vd}"),
                "nd must be a finite value of at least 1".into(),
            ));
        }
        if !vd.is_finite() || vd <= 0.0 {
            return Err(MaterialError::InvalidModelGlass(
                format!("{nd}:{vd}"),
                "vd must be finite and positive".into(),
            ));
        }

        let om_f = omega(spectral_line::F);
        let om_c = omega(spectral_line::C);
        let d_om = om_f - om_c;
        let d_om2 = om_f * om_f - om_c * om_c;

        let d_fc = (nd - 1.0) / vd;
        let v2 = (d_fc - NORMAL_LINE_INTERCEPT * d_om) / (NORMAL_LINE_SLOPE * d_om + d_om2);
        let v1 = NORMAL_LINE_INTERCEPT + NORMAL_LINE_SLOPE * v2;

        Ok(Self { nd, vd, v1, v2 })
    }

    /// Parse a `nd:vd` name such as `1.691:54.71`.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |why: &str| MaterialError::InvalidModelGlass(name.to_string(), why.into());
        let (nd, vd) = name.split_once(':').ok_or_else(|| invalid("expected nd:vd"))?;
        let nd: f64 = nd.trim().parse().map_err(|_| invalid("nd is not a number"))?;
        let vd: f64 = vd.trim().parse().map_err(|_| invalid("vd is not a number"))?;
        Self::new(nd, vd)
    }

    /// Name in `nd:vd` form.
    pub fn name(&self) -> String {
        format!("{}:{}", self.nd, self.vd)
    }

    /// Six-digit style glass code, e.g. `6910.5471`.
    pub fn glass_code(&self) -> String {
        let nd_part = ((self.nd - 1.0) * 10_000.0).round() as i64;
        let vd_part = (self.vd * 100.0).round() as i64;
        format!("{nd_part}.{vd_part}")
    }

    /// Index at the d line.
    pub fn nd(&self) -> f64 {
        self.nd
    }

    /// Abbe number.
    pub fn vd(&self) -> f64 {
        self.vd
    }

    /// Index at `wavelength_nm`.
    pub fn refractive_index(&self, wavelength_nm: f64) -> f64 {
        let om = omega(wavelength_nm);
        self.nd + self.v1 * om + self.v2 * om * om
    }
}

/// Buchdahl chromatic coordinate relative to the d line.
fn omega(wavelength_nm: f64) -> f64 {
    let delta = (wavelength_nm - spectral_line::D_HELIUM) / 1000.0;
    delta / (1.0 + 2.5 * delta)
}
