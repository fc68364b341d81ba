//! Clear and edge apertures.

use serde::{Deserialize, Serialize};

/// Region of a surface that passes light.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Aperture {
    /// Unbounded.
    #[default]
    None,
    /// Centred circle.
    Circular {
        /// Radius in lens units.
        radius: f64,
    },
}

impl Aperture {
    /// Circular aperture of `radius`.
    pub fn circular(radius: f64) -> Self {
        Self::Circular { radius }
    }

    /// True if `(x, y)` lies inside the aperture or on its rim.
    pub fn point_inside(&self, x: f64, y: f64) -> bool {
        match self {
            Self::None => true,
            Self::Circular { radius } => x * x + y * y <= radius * radius,
        }
    }

    /// Largest half-dimension; zero when unbounded.
    pub fn max_dimension(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Circular { radius } => *radius,
        }
    }

    /// True if no aperture is set.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
