//! Error types for the optical system facade.

use refract_geom::GeomError;
use refract_material::MaterialError;
use refract_model::ModelError;
use refract_paraxial::ParaxialError;
use refract_trace::TraceError;
use thiserror::Error;

/// Errors that can occur while building or updating an optical system.
#[derive(Error, Debug)]
pub enum SystemError {
    /// Invalid system settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Prescription content is inconsistent.
    #[error("invalid prescription: {0}")]
    InvalidPrescription(String),

    /// Prescription text is not valid TOML for the expected layout.
    #[error("failed to parse prescription: {0}")]
    Parse(#[from] toml::de::Error),

    /// Material lookup failed.
    #[error(transparent)]
    Material(#[from] MaterialError),

    /// Surface geometry error.
    #[error(transparent)]
    Geom(#[from] GeomError),

    /// Lens model error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Paraxial solve failed.
    #[error(transparent)]
    Paraxial(#[from] ParaxialError),

    /// Aiming or vignetting failed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Result type for system operations.
pub type Result<T> = std::result::Result<T, SystemError>;
