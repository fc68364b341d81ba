//! Paraxial rays: one `(y, u', i, n')` record per surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Paraxial ray data at one surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ParaxialRaySegment {
    /// Height at the surface.
    pub y: f64,
    /// Slope after the surface.
    pub u_prime: f64,
    /// Paraxial angle of incidence.
    pub i: f64,
    /// Index after the surface.
    pub n_prime: f64,
}

impl ParaxialRaySegment {
    /// Reduced slope `n' u'`.
    pub fn nu_prime(&self) -> f64 {
        self.n_prime * self.u_prime
    }
}

/// A paraxial ray traced through a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParaxialRay {
    name: String,
    segments: Vec<ParaxialRaySegment>,
}

impl ParaxialRay {
    /// Empty ray.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a segment.
    pub fn push(&mut self, y: f64, u_prime: f64, i: f64, n_prime: f64) {
        self.segments.push(ParaxialRaySegment {
            y,
            u_prime,
            i,
            n_prime,
        });
    }

    /// Segment at surface `i`.
    pub fn at(&self, i: usize) -> Option<&ParaxialRaySegment> {
        self.segments.get(i)
    }

    /// Last segment.
    pub fn back(&self) -> Option<&ParaxialRaySegment> {
        self.segments.last()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if no segments were traced.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments.
    pub fn segments(&self) -> &[ParaxialRaySegment] {
        &self.segments
    }
}

impl fmt::Display for ParaxialRay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "{}", self.name)?;
        }
        writeln!(
            f,
            "{:>4}{:>12}{:>12}{:>12}{:>12}{:>12}",
            "S", "h", "n'", "u'", "(nu)'", "i"
        )?;
        for (k, seg) in self.segments.iter().enumerate() {
            writeln!(
                f,
                "{:>4}{:>12.4}{:>12.4}{:>12.4}{:>12.4}{:>12.4}",
                k,
                seg.y,
                seg.n_prime,
                seg.u_prime,
                seg.nu_prime(),
                seg.i
            )?;
        }
        Ok(())
    }
}
