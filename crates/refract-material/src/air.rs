//! Refractive index of air.

use crate::environment::STANDARD_PRESSURE;

/// Air. Its index relative to itself is 1 at every wavelength; the
/// absolute index is used to convert glass catalog data between
/// temperatures and pressures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Air;

/// Reference temperature of [`Air::reference_index`], in degrees Celsius.
const REFERENCE_TEMPERATURE: f64 = 15.0;

impl Air {
    /// Absolute index of dry air at 15 °C and standard pressure.
    pub fn reference_index(wavelength_um: f64) -> f64 {
        let l2 = wavelength_um * wavelength_um;
        let term1 = 6432.8;
        let term2 = 2_949_810.0 * l2 / (146.0 * l2 - 1.0);
        let term3 = 25_540.0 * l2 / (41.0 * l2 - 1.0);
        1.0 + (term1 + term2 + term3) * 1.0e-8
    }

    /// Absolute index of air at `temperature` (°C) and `pressure` (Pa).
    pub fn absolute_index(wavelength_um: f64, temperature: f64, pressure: f64) -> f64 {
        let excess = Self::reference_index(wavelength_um) - 1.0;
        let thermal = 1.0 + (temperature - REFERENCE_TEMPERATURE) * 3.4785e-3;
        1.0 + (excess / thermal) * (pressure / STANDARD_PRESSURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_index_near_one() {
        let n = Air::reference_index(0.587562);
        assert!(n > 1.00027 && n < 1.00028);
    }

    #[test]
    fn test_warmer_air_is_thinner() {
        let cold = Air::absolute_index(0.55, 0.0, STANDARD_PRESSURE);
        let warm = Air::absolute_index(0.55, 40.0, STANDARD_PRESSURE);
        assert!(warm < cold);
    }

    #[test]
    fn test_vacuum_limit() {
        let n = Air::absolute_index(0.55, 20.0, 0.0);
        assert!((n - 1.0).abs() < 1e-15);
    }
}
