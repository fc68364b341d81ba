//! Fraunhofer spectral lines, in nanometres.

use crate::error::{MaterialError, Result};

/// Mercury infrared line.
pub const T: f64 = 1013.98;
/// Cesium infrared line.
pub const S: f64 = 852.11;
/// Helium red line.
pub const R: f64 = 706.519;
/// Hydrogen red line.
pub const C: f64 = 656.273;
/// Cadmium red line.
pub const C_PRIME: f64 = 643.847;
/// Sodium line (centre of the doublet).
pub const D: f64 = 589.294;
/// Helium yellow line.
pub const D_HELIUM: f64 = 587.562;
/// Mercury green line.
pub const E: f64 = 546.074;
/// Hydrogen blue line.
pub const F: f64 = 486.133;
/// Cadmium blue line.
pub const F_PRIME: f64 = 479.991;
/// Mercury blue line.
pub const G: f64 = 435.834;
/// Mercury violet line.
pub const H: f64 = 404.656;
/// Mercury ultraviolet line.
pub const I: f64 = 365.015;

/// All lines with their conventional names, red to blue.
pub const LINES: [(&str, f64); 13] = [
    ("t", T),
    ("s", S),
    ("r", R),
    ("C", C),
    ("C'", C_PRIME),
    ("D", D),
    ("d", D_HELIUM),
    ("e", E),
    ("F", F),
    ("F'", F_PRIME),
    ("g", G),
    ("h", H),
    ("i", I),
];

/// Wavelength in nm of the named line. Names are case sensitive (`d` is helium, `D` sodium).
pub fn wavelength(name: &str) -> Result<f64> {
    LINES
        .iter()
        .find(|(line, _)| *line == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| MaterialError::UnknownSpectralLine(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(wavelength("d").ok(), Some(587.562));
        assert_eq!(wavelength("D").ok(), Some(589.294));
        assert_eq!(wavelength("C'").ok(), Some(643.847));
        assert!(wavelength("x").is_err());
    }

    #[test]
    fn test_lines_sorted_red_to_blue() {
        assert!(LINES.windows(2).all(|w| w[0].1 > w[1].1));
    }
}
