//! Error types for surface geometry.

use thiserror::Error;

/// Errors raised by profile evaluation and intersection.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeomError {
    /// Spencer iteration did not settle within the iteration cap.
    #[error("intersection did not converge after {0} iterations")]
    NotConverged(usize),

    /// The conic square root went negative: the point lies beyond the surface rim.
    #[error("conic radicand is negative at radial height {0}")]
    InvalidRadicand(f64),

    /// The ray runs tangent to the surface.
    #[error("ray grazes the surface")]
    Grazing,

    /// Zero or NaN radius.
    #[error("invalid radius: {0}")]
    InvalidRadius(f64),

    /// Coefficient index past the fixed aspheric arity.
    #[error("aspheric coefficient index {0} out of range")]
    CoefficientIndex(usize),
}

impl GeomError {
    /// True for failures that mean a ray did not meet the surface.
    pub fn is_missed_surface(&self) -> bool {
        matches!(
            self,
            Self::NotConverged(_) | Self::InvalidRadicand(_) | Self::Grazing
        )
    }
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
