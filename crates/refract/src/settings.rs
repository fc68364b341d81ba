//! System update settings.

use refract_model::DEFAULT_REFERENCE_SURFACE;
use refract_trace::TraceSettings;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};

/// What [`OpticalSystem::update_model`](crate::OpticalSystem::update_model) does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    /// Real ray tracer settings.
    pub trace: TraceSettings,
    /// Aim every field's chief ray at the stop center.
    pub aim_chief_rays: bool,
    /// Search vignetting factors for every field.
    pub compute_vignetting: bool,
    /// Surface whose frame is the global origin.
    pub reference_surface: usize,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            trace: TraceSettings::default(),
            aim_chief_rays: true,
            compute_vignetting: false,
            reference_surface: DEFAULT_REFERENCE_SURFACE,
        }
    }
}

impl SystemSettings {
    /// Validate settings against a system of `surface_count` surfaces.
    pub fn validate(&self, surface_count: usize) -> Result<()> {
        self.trace
            .validate()
            .map_err(|e| SystemError::InvalidSettings(e.to_string()))?;
        if self.reference_surface >= surface_count {
            return Err(SystemError::InvalidSettings(format!(
                "reference_surface {} out of range for {} surfaces",
                self.reference_surface, surface_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_valid() {
        let settings = SystemSettings::default();
        settings.validate(3).unwrap();
        assert!(settings.aim_chief_rays);
        assert!(!settings.compute_vignetting);
        assert_eq!(settings.reference_surface, 1);
    }

    #[test]
    fn test_reference_surface_out_of_range() {
        let settings = SystemSettings {
            reference_surface: 3,
            ..SystemSettings::default()
        };
        assert!(matches!(
            settings.validate(3),
            Err(SystemError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_partial_toml() {
        let settings: SystemSettings = toml::from_str("compute_vignetting = true").unwrap();
        assert!(settings.compute_vignetting);
        assert!(settings.aim_chief_rays);
        assert_eq!(settings.trace, TraceSettings::default());
    }
}
