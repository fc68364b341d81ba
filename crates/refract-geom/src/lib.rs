#![warn(missing_docs)]

//! Surface geometry for the refract lens model.
//!
//! # Architecture
//!
//! - [`SurfaceProfile`] - sphere, even asphere and odd asphere: sag, gradient, intersection
//! - [`intersect`] - Spencer's line/surface root finder over any [`ImplicitSurface`]
//! - [`Aperture`] - point-in-aperture tests for clear and edge apertures
//!
//! # Example
//!
//! ```ignore
//! use refract_geom::{IntersectOptions, SurfaceProfile};
//! use refract_math::{Point3, Vec3};
//!
//! let profile = SurfaceProfile::spherical(50.0)?;
//! let (hit, s) = profile.intersect(
//!     &Point3::new(0.0, 5.0, 0.0),
//!     &Vec3::new(0.0, 0.0, 1.0),
//!     &IntersectOptions::default(),
//! )?;
//! ```

pub mod aperture;
pub mod error;
pub mod intersect;
pub mod profile;

pub use aperture::Aperture;
pub use error::{GeomError, Result};
pub use intersect::{ImplicitSurface, IntersectOptions};
pub use profile::{Asphere, ProfileKind, SurfaceProfile, NUM_ASPHERE_COEFFICIENTS};
