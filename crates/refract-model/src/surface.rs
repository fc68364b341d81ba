//! Optical surfaces and the gaps between them.

use std::sync::Arc;

use refract_geom::{Aperture, SurfaceProfile};
use refract_material::Material;
use refract_math::Transform;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::solve::Solve;

/// How light leaves a surface.
///
/// Only refraction is modelled; reflective surfaces would flip the
/// propagation direction and the sign of the following indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InteractionMode {
    /// Light refracts into the following gap.
    #[default]
    Transmit,
}

/// One boundary between two media.
#[derive(Debug, Clone)]
pub struct Surface {
    label: String,
    interaction: InteractionMode,
    profile: SurfaceProfile,
    clear_aperture: Aperture,
    edge_aperture: Aperture,
    semi_diameter: f64,
    local_transform: Transform,
    global_transform: Transform,
}

impl Surface {
    /// Unlabelled surface with `profile` and no apertures.
    pub fn new(profile: SurfaceProfile) -> Self {
        Self {
            label: String::new(),
            interaction: InteractionMode::Transmit,
            profile,
            clear_aperture: Aperture::None,
            edge_aperture: Aperture::None,
            semi_diameter: 0.0,
            local_transform: Transform::identity(),
            global_transform: Transform::identity(),
        }
    }

    /// Plane surface.
    pub fn flat() -> Self {
        Self::new(SurfaceProfile::flat())
    }

    /// Spherical surface of signed `radius`.
    pub fn spherical(radius: f64) -> Result<Self> {
        Ok(Self::new(SurfaceProfile::spherical(radius)?))
    }

    /// Builder: set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Builder: set the clear aperture.
    pub fn with_clear_aperture(mut self, aperture: Aperture) -> Self {
        self.clear_aperture = aperture;
        self
    }

    /// Label, e.g. `Obj`, `Stop`, `Img`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Set the label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Interaction mode.
    pub fn interaction(&self) -> InteractionMode {
        self.interaction
    }

    /// Profile.
    pub fn profile(&self) -> &SurfaceProfile {
        &self.profile
    }

    /// Replace the profile.
    pub fn set_profile(&mut self, profile: SurfaceProfile) {
        self.profile = profile;
    }

    /// Vertex curvature.
    pub fn curvature(&self) -> f64 {
        self.profile.curvature()
    }

    /// Vertex radius.
    pub fn radius(&self) -> f64 {
        self.profile.radius()
    }

    /// Change the vertex radius of the current profile.
    pub fn set_radius(&mut self, radius: f64) -> Result<()> {
        self.profile.set_radius(radius)?;
        Ok(())
    }

    /// Clear aperture, used for ray blocking.
    pub fn clear_aperture(&self) -> &Aperture {
        &self.clear_aperture
    }

    /// Set the clear aperture.
    pub fn set_clear_aperture(&mut self, aperture: Aperture) {
        self.clear_aperture = aperture;
    }

    /// Edge aperture, the mechanical outline.
    pub fn edge_aperture(&self) -> &Aperture {
        &self.edge_aperture
    }

    /// Set the edge aperture.
    pub fn set_edge_aperture(&mut self, aperture: Aperture) {
        self.edge_aperture = aperture;
    }

    /// Largest reference ray height, as of the last model update.
    pub fn semi_diameter(&self) -> f64 {
        self.semi_diameter
    }

    /// Overwrite the semi-diameter.
    pub fn set_semi_diameter(&mut self, semi_diameter: f64) {
        self.semi_diameter = semi_diameter;
    }

    /// Clear aperture size if one is set, otherwise the semi-diameter.
    pub fn max_aperture(&self) -> f64 {
        if self.clear_aperture.is_none() {
            self.semi_diameter
        } else {
            self.clear_aperture.max_dimension()
        }
    }

    /// True if `(x, y)` passes the clear aperture.
    pub fn point_inside(&self, x: f64, y: f64) -> bool {
        self.clear_aperture.point_inside(x, y)
    }

    /// Transform from the next surface's frame into this one.
    pub fn local_transform(&self) -> &Transform {
        &self.local_transform
    }

    /// Transform from this surface's frame into the reference surface frame.
    pub fn global_transform(&self) -> &Transform {
        &self.global_transform
    }

    pub(crate) fn set_local_transform(&mut self, transform: Transform) {
        self.local_transform = transform;
    }

    pub(crate) fn set_global_transform(&mut self, transform: Transform) {
        self.global_transform = transform;
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::flat()
    }
}

/// Stand-in for an infinite distance, e.g. an object at infinity.
pub const INFINITE_DISTANCE: f64 = 1.0e10;

/// The medium following a surface.
#[derive(Debug, Clone)]
pub struct Gap {
    thickness: f64,
    material: Arc<Material>,
    solve: Option<Solve>,
}

impl Gap {
    /// Gap of `thickness` filled with `material`.
    pub fn new(thickness: f64, material: Arc<Material>) -> Self {
        Self {
            thickness,
            material,
            solve: None,
        }
    }

    /// Attach a thickness solve.
    pub fn with_solve(mut self, solve: Solve) -> Self {
        self.solve = Some(solve);
        self
    }

    /// Axial thickness to the next surface vertex.
    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Thickness with an infinite value replaced by [`INFINITE_DISTANCE`].
    pub fn finite_thickness(&self) -> f64 {
        if self.thickness.is_infinite() {
            INFINITE_DISTANCE.copysign(self.thickness)
        } else {
            self.thickness
        }
    }

    /// Set the thickness.
    pub fn set_thickness(&mut self, thickness: f64) {
        self.thickness = thickness;
    }

    /// Shared material handle.
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Replace the material.
    pub fn set_material(&mut self, material: Arc<Material>) {
        self.material = material;
    }

    /// Solve recomputing this thickness on update, if any.
    pub fn solve(&self) -> Option<Solve> {
        self.solve
    }

    /// Attach or clear the thickness solve.
    pub fn set_solve(&mut self, solve: Option<Solve>) {
        self.solve = solve;
    }

    /// Refractive index of the material at `wavelength_nm`.
    pub fn refractive_index(&self, wavelength_nm: f64) -> f64 {
        self.material.refractive_index(wavelength_nm)
    }
}
