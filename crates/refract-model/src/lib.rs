#![warn(missing_docs)]

//! Sequential lens model for refract.
//!
//! # Architecture
//!
//! - [`Surface`] - profile, apertures, semi-diameter and transforms of one boundary
//! - [`Gap`] - thickness plus a shared [`Material`](refract_material::Material)
//! - [`Solve`] - optional rule recomputing a gap thickness on update
//! - [`OpticalAssembly`] - object to image stack with stop bookkeeping
//! - [`OpticalSpec`] - pupil, field and wavelength inputs
//!
//! # Example
//!
//! ```ignore
//! use refract_model::{Gap, OpticalAssembly, Surface};
//!
//! let mut lib = refract_material::MaterialLibrary::default();
//! let mut asm = OpticalAssembly::minimum(lib.air());
//! asm.push(Surface::spherical(50.0)?, Gap::new(2.0, lib.find("1.5:64")?));
//! asm.push(Surface::spherical(-50.0)?, Gap::new(48.0, lib.air()));
//! asm.update_model();
//! ```

pub mod assembly;
pub mod error;
pub mod solve;
pub mod spec;
pub mod surface;

pub use assembly::{OpticalAssembly, DEFAULT_REFERENCE_SURFACE};
pub use error::{ModelError, Result};
pub use solve::Solve;
pub use spec::{
    Field, FieldSpec, FieldType, OpticalSpec, PupilSpec, PupilType, VignettingFactors, Wavelength,
    WavelengthSpec,
};
pub use surface::{Gap, InteractionMode, Surface, INFINITE_DISTANCE};
