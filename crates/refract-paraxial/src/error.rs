//! Error types for paraxial computations.

use refract_model::ModelError;
use thiserror::Error;

/// Errors raised by the paraxial tracer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParaxialError {
    /// Path endpoint outside the assembly.
    #[error("surface index {index} out of range (assembly has {count} surfaces)")]
    SurfaceIndex {
        /// Requested index.
        index: usize,
        /// Number of surfaces.
        count: usize,
    },

    /// Pupil value cannot produce a starting slope (e.g. NA >= n, F/# <= 0).
    #[error("invalid pupil value {0}")]
    InvalidPupil(f64),

    /// Model or spec error.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type for paraxial operations.
pub type Result<T> = std::result::Result<T, ParaxialError>;
