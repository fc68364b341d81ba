//! Thickness solves attached to gaps.
//!
//! A solve recomputes the thickness of the gap that owns it whenever the
//! model is updated. The geometric solves only need the assembly and are
//! evaluated here; [`Solve::MarginalHeight`] needs a paraxial trace and is
//! evaluated by the paraxial layer.

use serde::{Deserialize, Serialize};

use crate::assembly::OpticalAssembly;
use crate::error::{ModelError, Result};

/// Rule that sets a gap thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Solve {
    /// Paraxial marginal ray height at the next surface.
    MarginalHeight {
        /// Target height; 0 places the next surface at the paraxial focus.
        #[serde(default)]
        height: f64,
        /// Fraction of the pupil the marginal ray is traced at.
        #[serde(default = "full_zone")]
        zone: f64,
    },
    /// Edge thickness measured at a radial height.
    EdgeThickness {
        /// Target edge thickness.
        value: f64,
        /// Radial height where the edge is measured.
        height: f64,
    },
    /// Sum of gaps `start..end` held at a fixed length.
    OverallLength {
        /// Target length.
        value: f64,
        /// First gap of the run.
        start: usize,
        /// One past the last gap of the run.
        end: usize,
    },
    /// `scale * thickness(from) + offset`.
    Pickup {
        /// Source gap.
        from: usize,
        /// Multiplier on the source thickness.
        #[serde(default = "full_zone")]
        scale: f64,
        /// Added after scaling.
        #[serde(default)]
        offset: f64,
    },
}

fn full_zone() -> f64 {
    1.0
}

impl Solve {
    /// Marginal ray height solve focusing the next surface at full aperture.
    pub fn paraxial_focus() -> Self {
        Self::MarginalHeight {
            height: 0.0,
            zone: 1.0,
        }
    }
}

impl OpticalAssembly {
    /// Thickness a geometric solve asks for gap `gap`.
    ///
    /// Returns `Ok(None)` for solves that need paraxial data.
    pub fn geometric_solve(&self, gap: usize, solve: &Solve) -> Result<Option<f64>> {
        self.gap(gap)?;
        let invalid = |reason| ModelError::InvalidSolve { gap, reason };
        let thickness = match *solve {
            Solve::MarginalHeight { .. } => return Ok(None),
            Solve::EdgeThickness { value, height } => {
                if value < 0.0 || height < 0.0 {
                    return Err(invalid("edge thickness and height must be non-negative"));
                }
                let sag1 = self.surface(gap)?.profile().sag(0.0, height)?;
                let sag2 = self.surface(gap + 1)?.profile().sag(0.0, height)?;
                // edge = -sag1 + t + sag2
                value + sag1 - sag2
            }
            Solve::OverallLength { value, start, end } => {
                if start >= end || end > self.gap_count() {
                    return Err(invalid("overall length range is empty or out of bounds"));
                }
                if !(start..end).contains(&gap) {
                    return Err(invalid("overall length range must contain the solved gap"));
                }
                let current = self.overall_length(start, end);
                if !current.is_finite() {
                    return Err(invalid("overall length range contains an infinite gap"));
                }
                value - current + self.gap(gap)?.thickness()
            }
            Solve::Pickup {
                from,
                scale,
                offset,
            } => {
                if from == gap {
                    return Err(invalid("pickup source is the solved gap"));
                }
                let source = self.gap(from)?.thickness();
                if !source.is_finite() {
                    return Err(invalid("pickup source thickness is infinite"));
                }
                scale * source + offset
            }
        };
        Ok(Some(thickness))
    }
}
