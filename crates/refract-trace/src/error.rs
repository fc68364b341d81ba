//! Error types for ray aiming and vignetting.
//!
//! Per-ray failures (blocked, missed surface, TIR) are not errors: they are
//! recorded on the [`Ray`](crate::Ray) as its [`RayStatus`]. The variants here
//! are raised by searches whose failure makes a field unusable.

use refract_model::ModelError;
use refract_paraxial::ParaxialError;
use thiserror::Error;

use crate::ray::RayStatus;

/// Errors raised by searches built on the tracer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// Invalid trace settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Secant search for the chief ray aim point hit its iteration cap.
    #[error("chief ray aiming did not converge after {0} iterations")]
    AimingNotConverged(usize),

    /// An aiming trial ray failed before reaching the target surface.
    #[error("aiming ray failed ({status}) before surface {target}")]
    AimingRayFailed {
        /// Terminal status of the trial ray.
        status: RayStatus,
        /// Surface the search aims at.
        target: usize,
    },

    /// Bisection for a vignetting factor hit its iteration cap.
    #[error("vignetting search did not converge after {0} iterations")]
    VignettingNotConverged(usize),

    /// A vignetting trial ray missed a surface or was totally reflected.
    #[error("vignetting ray failed: {0}")]
    VignettingRayFailed(RayStatus),

    /// Even the chief ray cannot pass the apertures.
    #[error("chief ray is blocked")]
    ChiefRayBlocked,

    /// Paraxial error.
    #[error(transparent)]
    Paraxial(#[from] ParaxialError),

    /// Model error.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, TraceError>;
