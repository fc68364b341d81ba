//! Ambient conditions for index evaluation.

use serde::{Deserialize, Serialize};

/// Standard atmospheric pressure in pascal.
pub const STANDARD_PRESSURE: f64 = 101_325.0;

/// Temperature and pressure at which glass indices are evaluated.
///
/// Glass indices are quoted relative to air at these conditions. Passed
/// explicitly to the material library; there is no process-wide setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Air pressure in pascal.
    pub pressure: f64,
}

impl Environment {
    /// Environment at `temperature` degrees Celsius and standard pressure.
    pub fn at_temperature(temperature: f64) -> Self {
        Self {
            temperature,
            pressure: STANDARD_PRESSURE,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            pressure: STANDARD_PRESSURE,
        }
    }
}
