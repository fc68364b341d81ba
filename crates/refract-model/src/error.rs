//! Error types for the lens model.

use refract_geom::GeomError;
use thiserror::Error;

/// Errors raised while editing the assembly or the optical spec.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Surface index past the image surface.
    #[error("surface index {index} out of range (assembly has {count} surfaces)")]
    SurfaceIndex {
        /// Requested index.
        index: usize,
        /// Number of surfaces.
        count: usize,
    },

    /// Surfaces can only be inserted between the object and image surfaces.
    #[error("cannot insert a surface at index {0}")]
    InsertIndex(usize),

    /// The object and image surfaces cannot be removed.
    #[error("cannot remove surface {0}")]
    RemoveIndex(usize),

    /// The assembly needs object, stop and image surfaces.
    #[error("assembly must keep at least one surface between object and image")]
    TooFewSurfaces,

    /// The stop must lie strictly between object and image.
    #[error("invalid stop index {0}")]
    StopIndex(usize),

    /// A spec list (fields or wavelengths) is empty.
    #[error("{0} list is empty")]
    EmptySpec(&'static str),

    /// Reference wavelength index past the wavelength list.
    #[error("reference wavelength index {0} out of range")]
    ReferenceIndex(usize),

    /// A gap solve has inputs it cannot be evaluated with.
    #[error("invalid solve on gap {gap}: {reason}")]
    InvalidSolve {
        /// Gap that owns the solve.
        gap: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Profile error from a radius or coefficient setter.
    #[error(transparent)]
    Geom(#[from] GeomError),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
