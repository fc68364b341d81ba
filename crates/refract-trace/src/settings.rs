//! Trace and search settings.

use refract_geom::IntersectOptions;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Tolerance and iteration cap for an iterative search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Convergence tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl SearchOptions {
    /// Defaults for chief ray aiming: 1e-5 lens units, 30 iterations.
    pub const AIMING: Self = Self {
        tolerance: 1.0e-5,
        max_iterations: 30,
    };

    /// Defaults for vignetting bisection: 1e-5, 50 iterations.
    pub const VIGNETTING: Self = Self {
        tolerance: 1.0e-5,
        max_iterations: 50,
    };
}

/// Settings for the sequential tracer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Stop rays at surfaces whose clear aperture they miss.
    pub aperture_check: bool,
    /// Scale pupil coordinates by the field's vignetting factors.
    pub apply_vignetting: bool,
    /// Surface intersection controls.
    pub intersect: IntersectOptions,
    /// Chief ray aiming controls.
    pub aiming: SearchOptions,
    /// Secant step for aiming, lens units.
    pub aiming_step: f64,
    /// Vignetting bisection controls.
    pub vignetting: SearchOptions,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            aperture_check: false,
            apply_vignetting: true,
            intersect: IntersectOptions::default(),
            aiming: SearchOptions::AIMING,
            aiming_step: 1.0e-5,
            vignetting: SearchOptions::VIGNETTING,
        }
    }
}

impl TraceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.intersect.tolerance <= 0.0 || self.intersect.max_iterations == 0 {
            return Err(TraceError::InvalidSettings(
                "intersection tolerance and iteration cap must be positive".into(),
            ));
        }
        for (name, opts) in [("aiming", &self.aiming), ("vignetting", &self.vignetting)] {
            if opts.tolerance <= 0.0 || opts.max_iterations == 0 {
                return Err(TraceError::InvalidSettings(format!(
                    "{name} tolerance and iteration cap must be positive"
                )));
            }
        }
        if self.aiming_step == 0.0 || !self.aiming_step.is_finite() {
            return Err(TraceError::InvalidSettings(
                "aiming_step must be finite and non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let settings = TraceSettings::default();
        settings.validate().unwrap();
        assert!(!settings.aperture_check);
        assert!(settings.apply_vignetting);
        assert_eq!(settings.aiming.max_iterations, 30);
        assert_eq!(settings.vignetting.max_iterations, 50);
    }

    #[test]
    fn test_invalid_settings() {
        let mut settings = TraceSettings::default();
        settings.vignetting.max_iterations = 0;
        assert!(settings.validate().is_err());

        let mut settings = TraceSettings::default();
        settings.aiming_step = 0.0;
        assert!(settings.validate().is_err());
    }
}
