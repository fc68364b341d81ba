#![warn(missing_docs)]

//! First-order optics for refract.
//!
//! # Architecture
//!
//! - [`ParaxialPath`] - curvature, thickness and index per surface at one wavelength
//! - [`ParaxialTrace`] - `(y, u)` recurrence and `(y, nu)` system matrices
//! - [`FirstOrderData`] - focal lengths, pupils and starting ray coordinates
//! - [`ParaxialTrace::solved_thickness`] - gap thickness asked for by a [`Solve`](refract_model::Solve)
//!
//! # Example
//!
//! ```ignore
//! use refract_paraxial::ParaxialTrace;
//!
//! let tracer = ParaxialTrace::new(&assembly);
//! let fod = tracer.first_order_data(&spec)?;
//! println!("{fod}");
//! ```

pub mod error;
pub mod first_order;
pub mod path;
pub mod ray;
pub mod solve;
pub mod trace;

pub use error::{ParaxialError, Result};
pub use first_order::{FirstOrderData, FAR_PUPIL_DISTANCE};
pub use path::{ParaxialPath, ParaxialPathComponent};
pub use ray::{ParaxialRay, ParaxialRaySegment};
pub use trace::ParaxialTrace;
