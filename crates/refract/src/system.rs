//! The optical system: lens data, spec, materials and derived data.

use std::fmt;
use std::sync::Arc;

use refract_material::{Material, MaterialLibrary};
use refract_model::{Gap, OpticalAssembly, OpticalSpec, Surface};
use refract_paraxial::{FirstOrderData, ParaxialTrace};
use refract_trace::{Ray, SequentialTrace};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::settings::SystemSettings;

/// A complete sequential optical system.
///
/// Owns the material library, the assembly and the optical spec, and caches
/// the first-order data computed by the last [`update_model`](Self::update_model).
/// Edit through the `*_mut` accessors, then call `update_model` before tracing.
#[derive(Debug)]
pub struct OpticalSystem {
    title: String,
    materials: MaterialLibrary,
    assembly: OpticalAssembly,
    spec: OpticalSpec,
    settings: SystemSettings,
    fod: FirstOrderData,
}

impl OpticalSystem {
    /// Object, stop and image in air, with the default spec.
    pub fn new(materials: MaterialLibrary) -> Self {
        let assembly = OpticalAssembly::minimum(materials.air());
        Self {
            title: String::new(),
            materials,
            assembly,
            spec: OpticalSpec::default(),
            settings: SystemSettings::default(),
            fod: FirstOrderData::default(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Material library.
    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Mutable material library, e.g. to add catalogs.
    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    /// Resolve a material name through the library.
    pub fn material(&mut self, name: &str) -> Result<Arc<Material>> {
        Ok(self.materials.find(name)?)
    }

    /// Surfaces and gaps.
    pub fn assembly(&self) -> &OpticalAssembly {
        &self.assembly
    }

    /// Mutable surfaces and gaps.
    pub fn assembly_mut(&mut self) -> &mut OpticalAssembly {
        &mut self.assembly
    }

    /// Pupil, field and wavelength spec.
    pub fn spec(&self) -> &OpticalSpec {
        &self.spec
    }

    /// Mutable spec.
    pub fn spec_mut(&mut self) -> &mut OpticalSpec {
        &mut self.spec
    }

    /// Update settings.
    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    /// Replace the update settings.
    pub fn set_settings(&mut self, settings: SystemSettings) -> Result<()> {
        settings.validate(self.assembly.surface_count())?;
        self.settings = settings;
        Ok(())
    }

    /// First-order data from the last update.
    pub fn first_order_data(&self) -> &FirstOrderData {
        &self.fod
    }

    /// Append a surface before the image, followed by `thickness` of `material`.
    pub fn push_surface(&mut self, surface: Surface, thickness: f64, material: &str) -> Result<()> {
        let material = self.material(material)?;
        self.assembly.push(surface, Gap::new(thickness, material));
        Ok(())
    }

    /// Paraxial tracer over the current assembly.
    pub fn paraxial_trace(&self) -> ParaxialTrace<'_> {
        ParaxialTrace::new(&self.assembly)
    }

    /// Real ray tracer over the current assembly and spec.
    pub fn sequential_trace(&self) -> SequentialTrace<'_> {
        SequentialTrace::new(&self.assembly, &self.spec, &self.fod).with_settings(self.settings.trace)
    }

    /// Rebuild every derived quantity.
    ///
    /// In order: transforms, gap solves, first-order data, chief ray aim
    /// points, vignetting factors (or their reset when disabled), then surface
    /// semi-diameters from the reference rays. Aiming and vignetting failures
    /// abort the update.
    pub fn update_model(&mut self) -> Result<()> {
        self.settings.validate(self.assembly.surface_count())?;
        self.spec.validate()?;

        self.assembly.update_transforms(self.settings.reference_surface)?;
        self.fod = ParaxialTrace::new(&self.assembly).first_order_data(&self.spec)?;
        let wvl = self.spec.reference_wavelength()?;
        if self.apply_solves(wvl)? {
            self.assembly.update_transforms(self.settings.reference_surface)?;
            self.fod = ParaxialTrace::new(&self.assembly).first_order_data(&self.spec)?;
        }

        if self.settings.aim_chief_rays {
            let aims = {
                let tracer = self.sequential_trace();
                self.spec
                    .fields
                    .fields
                    .iter()
                    .map(|field| tracer.aim_chief_ray(field, wvl))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            for (field, aim) in self.spec.fields.fields.iter_mut().zip(aims) {
                field.aim_pt = aim.aim_pt;
                field.object_pt = aim.object_pt;
            }
        }

        if self.settings.compute_vignetting {
            let factors = {
                let tracer = self.sequential_trace();
                self.spec
                    .fields
                    .fields
                    .iter()
                    .map(|field| tracer.compute_vignetting_factors(field))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            for (field, v) in self.spec.fields.fields.iter_mut().zip(factors) {
                field.vignetting = v;
            }
        } else {
            self.spec.fields.clear_vignetting();
        }

        self.update_semi_diameters()?;

        info!(
            surfaces = self.assembly.surface_count(),
            fields = self.spec.fields.len(),
            efl = self.fod.efl,
            "model updated"
        );
        Ok(())
    }

    /// Recompute every solved gap thickness in order; true if any gap has a solve.
    fn apply_solves(&mut self, wvl: f64) -> Result<bool> {
        let mut applied = false;
        for gap in 0..self.assembly.gap_count() {
            let Some(solve) = self.assembly.gap(gap)?.solve() else {
                continue;
            };
            let thickness =
                ParaxialTrace::new(&self.assembly).solved_thickness(gap, &solve, &self.fod, wvl)?;
            debug!(gap, ?solve, thickness, "gap solve");
            self.assembly.gap_mut(gap)?.set_thickness(thickness);
            applied = true;
        }
        Ok(applied)
    }

    /// Reference rays (chief, meridional and sagittal edges) per field.
    pub fn reference_rays(&self) -> Result<Vec<Vec<Ray>>> {
        Ok(self.sequential_trace().trace_all_reference_rays()?)
    }

    fn update_semi_diameters(&mut self) -> Result<()> {
        let rays = self.reference_rays()?;
        let mut heights = vec![0.0_f64; self.assembly.surface_count()];
        for (fi, field_rays) in rays.iter().enumerate() {
            for ray in field_rays {
                if !ray.is_success() {
                    warn!(field = fi, pupil = ?ray.pupil(), status = %ray.status(), "reference ray failed");
                }
                for (height, seg) in heights.iter_mut().zip(ray.segments()) {
                    *height = height.max(seg.height());
                }
            }
        }
        for (i, height) in heights.into_iter().enumerate() {
            self.assembly.surface_mut(i)?.set_semi_diameter(height);
        }
        Ok(())
    }
}

impl Default for OpticalSystem {
    fn default() -> Self {
        Self::new(MaterialLibrary::new(Default::default()))
    }
}

impl fmt::Display for OpticalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.title.is_empty() {
            writeln!(f, "{}", self.title)?;
        }
        writeln!(
            f,
            "{:>4}{:>8}{:>14}{:>14}{:>14}{:>12}",
            "S", "Label", "Radius", "Thickness", "Material", "Semi-Diam"
        )?;
        let stop = self.assembly.stop_index();
        for (i, surface) in self.assembly.surfaces().iter().enumerate() {
            let index = if i == stop { format!("{i}*") } else { i.to_string() };
            let (thickness, material) = match self.assembly.gaps().get(i) {
                Some(gap) => (format!("{:.6}", gap.thickness()), gap.material().name()),
                None => (String::new(), String::new()),
            };
            writeln!(
                f,
                "{:>4}{:>8}{:>14.6}{:>14}{:>14}{:>12.4}",
                index,
                surface.label(),
                surface.radius(),
                thickness,
                material,
                surface.semi_diameter()
            )?;
        }
        Ok(())
    }
}
