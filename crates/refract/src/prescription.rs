//! TOML lens prescriptions.
//!
//! ```toml
//! title = "Singlet"
//!
//! [spec]
//! pupil = { type = "entrance_pupil_diameter", value = 10.0 }
//!
//! [object]
//! thickness = inf
//!
//! [[surfaces]]
//! stop = true
//! thickness = 1.0
//!
//! [[surfaces]]
//! radius = 50.0
//! thickness = 2.0
//! material = "1.5:64"
//!
//! [[surfaces]]
//! radius = -50.0
//! thickness = 49.665
//! ```
//!
//! Each surface record carries the gap that follows it; the last record's
//! gap is image space. A record may attach a `solve` to its gap, with gap
//! indices counted from the object gap (record `k` owns gap `k + 1`):
//!
//! ```toml
//! [[surfaces]]
//! radius = -50.0
//! solve = { type = "marginal_height", height = 0.0 }
//! ```
//! Materials resolve through the [`MaterialLibrary`],
//! after any `[[catalogs]]` in the file are loaded.

use std::path::Path;

use refract_geom::{Aperture, Asphere, GeomError, SurfaceProfile};
use refract_material::{
    DispersionFormula, Environment, Glass, GlassCatalog, MaterialLibrary, ThermalData,
};
use refract_math::curvature_from_radius;
use refract_model::{OpticalSpec, Solve, Surface};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SystemError};
use crate::settings::SystemSettings;
use crate::system::OpticalSystem;

/// A lens file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Temperature and pressure for catalog glasses.
    #[serde(default)]
    pub environment: Environment,
    /// Glass catalogs defined inline.
    #[serde(default)]
    pub catalogs: Vec<CatalogRecord>,
    /// Pupil, fields and wavelengths.
    #[serde(default)]
    pub spec: OpticalSpec,
    /// Update settings.
    #[serde(default)]
    pub settings: SystemSettings,
    /// Object space.
    #[serde(default)]
    pub object: GapRecord,
    /// Surfaces between object and image.
    pub surfaces: Vec<SurfaceRecord>,
}

/// A gap: thickness and material name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRecord {
    /// Thickness; `inf` for an object at infinity.
    pub thickness: f64,
    /// Material name.
    #[serde(default = "air")]
    pub material: String,
}

impl Default for GapRecord {
    fn default() -> Self {
        Self {
            thickness: f64::INFINITY,
            material: air(),
        }
    }
}

/// One surface and the gap after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRecord {
    /// Label.
    #[serde(default)]
    pub label: String,
    /// Vertex radius; `inf` or omitted for a plane.
    #[serde(default = "flat_radius")]
    pub radius: f64,
    /// Thickness of the following gap.
    #[serde(default)]
    pub thickness: f64,
    /// Material of the following gap.
    #[serde(default = "air")]
    pub material: String,
    /// Marks the aperture stop.
    #[serde(default)]
    pub stop: bool,
    /// Circular clear aperture radius.
    #[serde(default)]
    pub clear_aperture: Option<f64>,
    /// Aspheric terms.
    #[serde(default)]
    pub asphere: Option<AsphereRecord>,
    /// Solve recomputing the following gap's thickness on update.
    #[serde(default)]
    pub solve: Option<Solve>,
}

/// Conic and polynomial terms of an aspheric surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AsphereRecord {
    /// Conic constant.
    #[serde(default)]
    pub conic: f64,
    /// Polynomial coefficients, lowest order first.
    #[serde(default)]
    pub coefficients: Vec<f64>,
    /// Use every power of r instead of even powers only.
    #[serde(default)]
    pub odd: bool,
}

/// An inline glass catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Supplier name.
    pub name: String,
    /// Glasses.
    pub glasses: Vec<GlassRecord>,
}

/// One catalog glass in AGF terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlassRecord {
    /// Product name.
    pub name: String,
    /// AGF dispersion formula code (1..=13).
    pub formula: i32,
    /// Dispersion coefficients.
    pub coefficients: Vec<f64>,
    /// Thermal coefficients.
    #[serde(default)]
    pub thermal: Option<ThermalData>,
}

fn air() -> String {
    "AIR".to_string()
}

fn flat_radius() -> f64 {
    f64::INFINITY
}

impl Prescription {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SystemError::InvalidPrescription(format!("{}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Build an optical system. The model is not updated.
    pub fn build(&self) -> Result<OpticalSystem> {
        if self.surfaces.is_empty() {
            return Err(SystemError::InvalidPrescription("no surfaces".into()));
        }
        if self.surfaces.iter().filter(|s| s.stop).count() > 1 {
            return Err(SystemError::InvalidPrescription(
                "more than one surface marked as stop".into(),
            ));
        }

        let mut materials = MaterialLibrary::new(self.environment);
        for record in &self.catalogs {
            materials.add_catalog(record.to_catalog()?);
        }

        let mut system = OpticalSystem::new(materials).with_title(self.title.clone());
        let object_material = system.material(&self.object.material)?;
        {
            let gap = system.assembly_mut().gap_mut(0)?;
            gap.set_thickness(self.object.thickness);
            gap.set_material(object_material);
        }

        for record in &self.surfaces {
            let surface = record.to_surface()?;
            system.push_surface(surface, record.thickness, &record.material)?;
            let gap = system.assembly().image_index() - 1;
            system.assembly_mut().gap_mut(gap)?.set_solve(record.solve);
        }
        // Drop the placeholder stop of the minimum assembly.
        system.assembly_mut().remove(1)?;

        let stop = self.surfaces.iter().position(|s| s.stop).map_or(1, |i| i + 1);
        system.assembly_mut().set_stop_index(stop)?;
        system.assembly_mut().update_model();

        *system.spec_mut() = self.spec.clone();
        system.set_settings(self.settings)?;
        debug!(title = %self.title, surfaces = self.surfaces.len(), stop, "built system");
        Ok(system)
    }
}

impl SurfaceRecord {
    fn to_surface(&self) -> Result<Surface> {
        let profile = match &self.asphere {
            None => SurfaceProfile::spherical(self.radius)?,
            Some(a) => {
                let curvature =
                    curvature_from_radius(self.radius).ok_or(GeomError::InvalidRadius(self.radius))?;
                let mut asphere = Asphere::new(curvature, a.conic);
                for (i, &c) in a.coefficients.iter().enumerate() {
                    asphere.set_coefficient(i, c)?;
                }
                if a.odd {
                    SurfaceProfile::OddAsphere(asphere)
                } else {
                    SurfaceProfile::EvenAsphere(asphere)
                }
            }
        };
        let mut surface = Surface::new(profile).with_label(self.label.clone());
        if let Some(radius) = self.clear_aperture {
            surface.set_clear_aperture(Aperture::circular(radius));
        }
        Ok(surface)
    }
}

impl CatalogRecord {
    fn to_catalog(&self) -> Result<GlassCatalog> {
        let mut catalog = GlassCatalog::new(self.name.clone());
        for g in &self.glasses {
            let formula = DispersionFormula::from_agf_code(g.formula, &self.name)?;
            let mut glass = Glass::new(g.name.clone(), self.name.clone(), formula, &g.coefficients);
            if let Some(thermal) = g.thermal {
                glass = glass.with_thermal(thermal);
            }
            catalog.insert(glass);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLET: &str = r#"
title = "Singlet"

[spec]
pupil = { type = "entrance_pupil_diameter", value = 10.0 }

[spec.fields]
fields = [{ x = 0.0, y = 0.0 }, { x = 0.0, y = 5.0 }]

[spec.wavelengths]
wavelengths = [{ value = 587.562 }]

[[surfaces]]
label = "Stop"
stop = true
thickness = 1.0

[[surfaces]]
radius = 50.0
thickness = 2.0
material = "1.5:64"

[[surfaces]]
radius = -50.0
thickness = 49.665
"#;

    #[test]
    fn test_build_singlet() {
        let rx = Prescription::from_toml_str(SINGLET).unwrap();
        assert_eq!(rx.object, GapRecord::default());
        let mut sys = rx.build().unwrap();
        let asm = sys.assembly();
        assert_eq!(asm.surface_count(), 5);
        assert_eq!(asm.stop_index(), 1);
        assert_eq!(asm.stop().label(), "Stop");
        assert!(asm.object_space_gap().thickness().is_infinite());
        assert!((asm.image_space_gap().thickness() - 49.665).abs() < 1e-12);
        sys.update_model().unwrap();
        assert!((sys.first_order_data().fno - sys.first_order_data().efl / 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_asphere_and_aperture() {
        let text = r#"
[[surfaces]]
radius = 20.0
thickness = 3.0
clear_aperture = 6.0
asphere = { conic = -1.0, coefficients = [0.0, 1e-5] }
"#;
        let rx = Prescription::from_toml_str(text).unwrap();
        let sys = rx.build().unwrap();
        let s = sys.assembly().surface(1).unwrap();
        assert_eq!(s.clear_aperture(), &Aperture::circular(6.0));
        match s.profile() {
            SurfaceProfile::EvenAsphere(a) => {
                assert_eq!(a.conic, -1.0);
                assert_eq!(a.max_nonzero_index(), Some(1));
            }
            other => panic!("unexpected profile {other:?}"),
        }
    }

    #[test]
    fn test_inline_catalog_glass() {
        let text = r#"
[[catalogs]]
name = "TEST"
glasses = [{ name = "FLAT", formula = 2, coefficients = [1.25, 0.0, 0.0, 0.0, 0.0, 0.0] }]

[[surfaces]]
thickness = 5.0
material = "FLAT_TEST"
"#;
        let rx = Prescription::from_toml_str(text).unwrap();
        let sys = rx.build().unwrap();
        let material = sys.assembly().gap(1).unwrap().material();
        assert_eq!(material.name(), "FLAT");
    }

    #[test]
    fn test_rejects_two_stops() {
        let text = r#"
[[surfaces]]
stop = true
[[surfaces]]
stop = true
"#;
        let rx = Prescription::from_toml_str(text).unwrap();
        assert!(matches!(rx.build(), Err(SystemError::InvalidPrescription(_))));
    }

    #[test]
    fn test_unknown_material() {
        let text = r#"
[[surfaces]]
material = "NOPE"
"#;
        let rx = Prescription::from_toml_str(text).unwrap();
        assert!(matches!(rx.build(), Err(SystemError::Material(_))));
    }

    #[test]
    fn test_solves_follow_their_gaps() {
        let text = r#"
[spec]
pupil = { type = "entrance_pupil_diameter", value = 10.0 }

[[surfaces]]
stop = true
thickness = 1.0
solve = { type = "pickup", from = 2, scale = 2.0 }

[[surfaces]]
radius = 50.0
thickness = 2.0
material = "1.5:64"

[[surfaces]]
radius = -50.0
thickness = 10.0
solve = { type = "marginal_height" }
"#;
        let rx = Prescription::from_toml_str(text).unwrap();
        let mut sys = rx.build().unwrap();
        assert_eq!(
            sys.assembly().gap(1).unwrap().solve(),
            Some(Solve::Pickup {
                from: 2,
                scale: 2.0,
                offset: 0.0
            })
        );
        assert_eq!(sys.assembly().gap(2).unwrap().solve(), None);
        assert_eq!(sys.assembly().gap(3).unwrap().solve(), Some(Solve::paraxial_focus()));
        sys.update_model().unwrap();
        assert!((sys.assembly().gap(1).unwrap().thickness() - 4.0).abs() < 1e-12);
        let bfl = sys.first_order_data().bfl;
        assert!((sys.assembly().image_space_gap().thickness() - bfl).abs() / bfl < 1e-6);
    }
}
