//! Glass dispersion formulas as used by AGF catalogs.
//!
//! Every formula takes the wavelength in micrometres and up to twelve
//! coefficients, and returns the index relative to air at the catalog's
//! reference temperature.

use serde::{Deserialize, Serialize};

use crate::error::{MaterialError, Result};

/// Number of dispersion coefficients a glass carries.
pub const NUM_COEFFICIENTS: usize = 12;

/// Dispersion formula variants, numbered as in AGF files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispersionFormula {
    /// `n² = a0 + a1 λ² + a2 λ⁻² + a3 λ⁻⁴ + a4 λ⁻⁶ + a5 λ⁻⁸`
    Schott,
    /// Three-term Sellmeier.
    Sellmeier1,
    /// Herzberger with `L = 1/(λ² − 0.028)`.
    Herzberger,
    /// Two-term Sellmeier with constant offset.
    Sellmeier2,
    /// `n = n0 + A/λ + B/λ^3.5`
    Conrady,
    /// Four-term Sellmeier.
    Sellmeier3,
    /// `n² = A + B/(λ² − C) − D λ²`
    HandbookOfOptics1,
    /// `n² = A + B λ²/(λ² − C) − D λ²`
    HandbookOfOptics2,
    /// Two-term Sellmeier with free constant.
    Sellmeier4,
    /// Schott with two more negative powers.
    Extended1,
    /// Five-term Sellmeier.
    Sellmeier5,
    /// Schott with `λ⁴` and `λ⁶` terms.
    Extended2,
    /// Hikari nine-term power series.
    NikonHikari,
    /// No usable formula; index 1.
    Unknown,
}

impl DispersionFormula {
    /// Formula for an AGF `NM` record code. Code 13 means Hikari's series for
    /// Hikari catalogs and an unknown formula otherwise.
    pub fn from_agf_code(code: i32, supplier: &str) -> Result<Self> {
        let formula = match code {
            1 => Self::Schott,
            2 => Self::Sellmeier1,
            3 => Self::Herzberger,
            4 => Self::Sellmeier2,
            5 => Self::Conrady,
            6 => Self::Sellmeier3,
            7 => Self::HandbookOfOptics1,
            8 => Self::HandbookOfOptics2,
            9 => Self::Sellmeier4,
            10 => Self::Extended1,
            11 => Self::Sellmeier5,
            12 => Self::Extended2,
            13 if supplier.to_ascii_uppercase().contains("HIKARI") => Self::NikonHikari,
            13 => Self::Unknown,
            other => return Err(MaterialError::UnknownDispersionFormula(other)),
        };
        Ok(formula)
    }

    /// Relative index at `wavelength_um`.
    pub fn evaluate(&self, wavelength_um: f64, c: &[f64; NUM_COEFFICIENTS]) -> f64 {
        let l = wavelength_um;
        let l2 = l * l;
        let sellmeier = |b: f64, c: f64| b * l2 / (l2 - c);
        match self {
            Self::Schott => (c[0]
                + c[1] * l2
                + c[2] / l2
                + c[3] / l2.powi(2)
                + c[4] / l2.powi(3)
                + c[5] / l2.powi(4))
            .sqrt(),
            Self::Sellmeier1 => {
                (1.0 + sellmeier(c[0], c[1]) + sellmeier(c[2], c[3]) + sellmeier(c[4], c[5])).sqrt()
            }
            Self::Sellmeier2 => {
                (1.0 + c[0] + sellmeier(c[1], c[2]) + sellmeier(c[3], c[4])).sqrt()
            }
            Self::Sellmeier3 => (1.0
                + sellmeier(c[0], c[1])
                + sellmeier(c[2], c[3])
                + sellmeier(c[4], c[5])
                + sellmeier(c[6], c[7]))
            .sqrt(),
            Self::Sellmeier4 => (c[0] + sellmeier(c[1], c[2]) + sellmeier(c[3], c[4])).sqrt(),
            Self::Sellmeier5 => (1.0
                + sellmeier(c[0], c[1])
                + sellmeier(c[2], c[3])
                + sellmeier(c[4], c[5])
                + sellmeier(c[6], c[7])
                + sellmeier(c[8], c[9]))
            .sqrt(),
            Self::Herzberger => {
                let big_l = 1.0 / (l2 - 0.028);
                c[0] + c[1] * big_l
                    + c[2] * big_l * big_l
                    + c[3] * l2
                    + c[4] * l2.powi(2)
                    + c[5] * l2.powi(3)
            }
            Self::Conrady => c[0] + c[1] / l + c[2] / l.powf(3.5),
            Self::HandbookOfOptics1 => (c[0] + c[1] / (l2 - c[2]) - c[3] * l2).sqrt(),
            Self::HandbookOfOptics2 => (c[0] + sellmeier(c[1], c[2]) - c[3] * l2).sqrt(),
            Self::Extended1 => (c[0]
                + c[1] * l2
                + c[2] / l2
                + c[3] / l2.powi(2)
                + c[4] / l2.powi(3)
                + c[5] / l2.powi(4)
                + c[6] / l2.powi(5)
                + c[7] / l2.powi(6))
            .sqrt(),
            Self::Extended2 => (c[0]
                + c[1] * l2
                + c[2] / l2
                + c[3] / l2.powi(2)
                + c[4] / l2.powi(3)
                + c[5] / l2.powi(4)
                + c[6] * l2.powi(2)
                + c[7] * l2.powi(3))
            .sqrt(),
            Self::NikonHikari => (c[0]
                + c[1] * l2
                + c[2] * l2.powi(2)
                + c[3] / l2
                + c[4] / l2.powi(2)
                + c[5] / l2.powi(3)
                + c[6] / l2.powi(4)
                + c[7] / l2.powi(5)
                + c[8] / l2.powi(6))
            .sqrt(),
            Self::Unknown => 1.0,
        }
    }
}
