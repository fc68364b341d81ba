#![warn(missing_docs)]

//! High-level sequential optical system facade for refract.
//!
//! Provides the [`OpticalSystem`] type, which ties a lens prescription to its
//! materials and optical spec, and keeps the derived data (first-order
//! properties, chief ray aim points, vignetting factors and semi-diameters)
//! consistent through [`OpticalSystem::update_model`].
//!
//! # Architecture
//!
//! - [`Prescription`] - TOML lens file, built into an [`OpticalSystem`]
//! - [`OpticalSystem`] - owns the assembly, spec and material library
//! - [`SystemSettings`] - what an update computes
//!
//! The lower layers are re-exported: `refract_material` (glasses and
//! dispersion), `refract_geom` (surface profiles), `refract_model` (the
//! surface/gap stack), `refract_paraxial` and `refract_trace`.
//!
//! # Example
//!
//! ```ignore
//! use refract::Prescription;
//! use refract_math::Point2;
//!
//! let mut system = Prescription::load("demos/triplet.toml".as_ref())?.build()?;
//! system.update_model()?;
//! println!("{system}");
//!
//! let tracer = system.sequential_trace();
//! let field = &system.spec().fields.fields[2];
//! let ray = tracer.trace_pupil_ray(Point2::new(0.0, 1.0), field, 587.562);
//! println!("{ray}");
//! ```

pub use refract_geom;
pub use refract_material;
pub use refract_math;
pub use refract_model;
pub use refract_paraxial;
pub use refract_trace;

pub mod error;
pub mod prescription;
pub mod settings;
pub mod system;

pub use error::{Result, SystemError};
pub use prescription::{AsphereRecord, CatalogRecord, GapRecord, GlassRecord, Prescription, SurfaceRecord};
pub use settings::SystemSettings;
pub use system::OpticalSystem;
