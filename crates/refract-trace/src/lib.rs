#![warn(missing_docs)]

//! Sequential real ray tracing for refract.
//!
//! Rays are launched from the object surface through the paraxial entrance
//! pupil and refracted surface by surface with the vector form of Snell's
//! law. Per-ray failures are carried as a [`RayStatus`] on the ray, so batch
//! traces never abort on a single bad ray.
//!
//! # Architecture
//!
//! - [`SequentialPath`] - immutable per-wavelength snapshot shared across threads
//! - [`SequentialTrace`] - ray launch, the trace loop and parallel batches
//! - [`bend`] - vector refraction with total internal reflection detection
//! - `aim` - secant search placing the chief ray on the stop center
//! - `vignetting` - bisection for the pupil edge reductions
//! - `coddington` - sagittal/tangential focus along the chief ray
//!
//! # Example
//!
//! ```ignore
//! use refract_math::Point2;
//! use refract_trace::SequentialTrace;
//!
//! let tracer = SequentialTrace::new(&assembly, &spec, &fod);
//! let aim = tracer.aim_chief_ray(&field, wvl)?;
//! field.aim_pt = aim.aim_pt;
//! let ray = tracer.trace_pupil_ray(Point2::new(0.0, 1.0), &field, wvl);
//! println!("{ray}");
//! ```

pub mod aim;
pub mod bend;
pub mod coddington;
pub mod error;
pub mod path;
pub mod ray;
pub mod settings;
pub mod trace;
pub mod vignetting;

pub use aim::ChiefRayAim;
pub use bend::bend;
pub use coddington::AstigmaticFocus;
pub use error::{Result, TraceError};
pub use path::{SequentialPath, SequentialPathComponent};
pub use ray::{Ray, RaySegment, RayStatus};
pub use settings::{SearchOptions, TraceSettings};
pub use trace::{SequentialTrace, REFERENCE_PUPILS};
