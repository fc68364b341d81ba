#![warn(missing_docs)]

//! Optical materials for the refract lens model.
//!
//! # Architecture
//!
//! - [`Material`] - sum type over air, catalog glass and model glass
//! - [`Glass`] - dispersion formula plus thermal data, evaluated at an [`Environment`]
//! - [`BuchdahlGlass`] - two-parameter `nd:vd` model glass
//! - [`GlassCatalog`] / [`MaterialLibrary`] - lookup by name, sharing one `Arc` per material
//! - [`spectral_line`] - Fraunhofer line wavelengths
//!
//! # Example
//!
//! ```ignore
//! use refract_material::{MaterialLibrary, spectral_line};
//!
//! let mut lib = MaterialLibrary::default();
//! let glass = lib.find("1.5168:64.17")?;
//! let nd = glass.refractive_index(spectral_line::D_HELIUM);
//! ```

pub mod air;
pub mod buchdahl;
pub mod catalog;
pub mod dispersion;
pub mod environment;
pub mod error;
pub mod glass;
pub mod library;
pub mod spectral_line;

pub use air::Air;
pub use buchdahl::BuchdahlGlass;
pub use catalog::GlassCatalog;
pub use dispersion::DispersionFormula;
pub use environment::Environment;
pub use error::{MaterialError, Result};
pub use glass::{Glass, ThermalData};
pub use library::MaterialLibrary;

/// A medium filling a gap between two surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Air; index 1 relative to itself.
    Air,
    /// Catalog glass.
    Glass(Glass),
    /// `nd:vd` model glass.
    Model(BuchdahlGlass),
}

impl Material {
    /// Display name.
    pub fn name(&self) -> String {
        match self {
            Self::Air => "AIR".to_string(),
            Self::Glass(g) => g.name().to_string(),
            Self::Model(m) => m.name(),
        }
    }

    /// Refractive index relative to air at `wavelength_nm`.
    pub fn refractive_index(&self, wavelength_nm: f64) -> f64 {
        match self {
            Self::Air => 1.0,
            Self::Glass(g) => g.refractive_index(wavelength_nm),
            Self::Model(m) => m.refractive_index(wavelength_nm),
        }
    }

    /// Abbe number at the d line.
    ///
    /// Air uses its absolute index at the default environment.
    pub fn abbe_d(&self) -> f64 {
        match self {
            Self::Air => {
                let env = Environment::default();
                let n = |wvl: f64| Air::absolute_index(wvl / 1000.0, env.temperature, env.pressure);
                (n(spectral_line::D_HELIUM) - 1.0) / (n(spectral_line::F) - n(spectral_line::C))
            }
            Self::Model(m) => m.vd(),
            Self::Glass(_) => {
                let nd = self.refractive_index(spectral_line::D_HELIUM);
                let nf = self.refractive_index(spectral_line::F);
                let nc = self.refractive_index(spectral_line::C);
                (nd - 1.0) / (nf - nc)
            }
        }
    }

    /// True for air.
    pub fn is_air(&self) -> bool {
        matches!(self, Self::Air)
    }
}
