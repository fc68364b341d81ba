//! Ordered surfaces and gaps from object to image.

use std::sync::Arc;

use refract_material::Material;
use refract_math::Transform;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::surface::{Gap, Surface};

/// Default reference surface for global coordinates (the first real surface).
pub const DEFAULT_REFERENCE_SURFACE: usize = 1;

/// A sequential stack of surfaces.
///
/// Surface 0 is the object, the last surface is the image. Gap `i` follows
/// surface `i`, so there is one gap fewer than surfaces and the last gap is
/// image space.
#[derive(Debug, Clone)]
pub struct OpticalAssembly {
    surfaces: Vec<Surface>,
    gaps: Vec<Gap>,
    stop_index: usize,
    current_index: usize,
}

impl OpticalAssembly {
    /// Object, stop and image surfaces separated by `medium`, all flat, zero thickness.
    pub fn minimum(medium: Arc<Material>) -> Self {
        let mut assembly = Self {
            surfaces: vec![
                Surface::flat().with_label("Obj"),
                Surface::flat().with_label("Stop"),
                Surface::flat().with_label("Img"),
            ],
            gaps: vec![
                Gap::new(0.0, Arc::clone(&medium)),
                Gap::new(0.0, medium),
            ],
            stop_index: 1,
            current_index: 2,
        };
        assembly.update_model();
        assembly
    }

    /// Number of surfaces, object and image included.
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Number of gaps; always `surface_count() - 1`.
    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }

    /// Index of the image surface.
    pub fn image_index(&self) -> usize {
        self.surfaces.len() - 1
    }

    /// Index of the aperture stop.
    pub fn stop_index(&self) -> usize {
        self.stop_index
    }

    /// Move the stop to surface `i` (strictly between object and image).
    pub fn set_stop_index(&mut self, i: usize) -> Result<()> {
        if i == 0 || i >= self.image_index() {
            return Err(ModelError::StopIndex(i));
        }
        self.stop_index = i;
        Ok(())
    }

    /// Index of the most recently inserted or selected surface.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Select surface `i`.
    pub fn set_current_index(&mut self, i: usize) -> Result<()> {
        self.check_surface(i)?;
        self.current_index = i;
        Ok(())
    }

    /// All surfaces.
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// All gaps.
    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    /// Surface `i`.
    pub fn surface(&self, i: usize) -> Result<&Surface> {
        let count = self.surfaces.len();
        self.surfaces
            .get(i)
            .ok_or(ModelError::SurfaceIndex { index: i, count })
    }

    /// Mutable surface `i`.
    pub fn surface_mut(&mut self, i: usize) -> Result<&mut Surface> {
        let count = self.surfaces.len();
        self.surfaces
            .get_mut(i)
            .ok_or(ModelError::SurfaceIndex { index: i, count })
    }

    /// Gap following surface `i`.
    pub fn gap(&self, i: usize) -> Result<&Gap> {
        let count = self.surfaces.len();
        self.gaps
            .get(i)
            .ok_or(ModelError::SurfaceIndex { index: i, count })
    }

    /// Mutable gap following surface `i`.
    pub fn gap_mut(&mut self, i: usize) -> Result<&mut Gap> {
        let count = self.surfaces.len();
        self.gaps
            .get_mut(i)
            .ok_or(ModelError::SurfaceIndex { index: i, count })
    }

    /// The stop surface.
    pub fn stop(&self) -> &Surface {
        &self.surfaces[self.stop_index]
    }

    /// The image surface.
    pub fn image(&self) -> &Surface {
        &self.surfaces[self.image_index()]
    }

    /// Gap between the object and the first surface.
    pub fn object_space_gap(&self) -> &Gap {
        &self.gaps[0]
    }

    /// Gap between the last surface and the image.
    pub fn image_space_gap(&self) -> &Gap {
        &self.gaps[self.gaps.len() - 1]
    }

    /// Insert `surface` followed by `gap` at index `i`.
    ///
    /// `i` may range from 1 (right after the object) to the image index
    /// (right before the image). The stop shifts when `i` is at or before it.
    pub fn insert(&mut self, i: usize, surface: Surface, gap: Gap) -> Result<()> {
        if i == 0 || i > self.image_index() {
            return Err(ModelError::InsertIndex(i));
        }
        self.insert_at(i, surface, gap);
        Ok(())
    }

    /// Insert right before the image surface.
    pub fn push(&mut self, surface: Surface, gap: Gap) {
        self.insert_at(self.image_index(), surface, gap);
    }

    /// Insertion with `1 <= i <= image_index()` already checked.
    fn insert_at(&mut self, i: usize, surface: Surface, gap: Gap) {
        self.surfaces.insert(i, surface);
        self.gaps.insert(i, gap);
        if i <= self.stop_index {
            self.stop_index += 1;
        }
        self.current_index = i;
        debug!(index = i, stop = self.stop_index, "inserted surface");
    }

    /// Remove surface `i` and the gap following it.
    ///
    /// Removing the stop hands the stop role to the surface that takes its index.
    pub fn remove(&mut self, i: usize) -> Result<(Surface, Gap)> {
        if i == 0 || i >= self.image_index() {
            return Err(ModelError::RemoveIndex(i));
        }
        if self.surfaces.len() <= 3 {
            return Err(ModelError::TooFewSurfaces);
        }
        let surface = self.surfaces.remove(i);
        let gap = self.gaps.remove(i);
        if i < self.stop_index {
            self.stop_index -= 1;
        }
        self.stop_index = self.stop_index.min(self.image_index() - 1);
        if i < self.current_index {
            self.current_index -= 1;
        }
        self.current_index = self.current_index.min(self.image_index());
        debug!(index = i, stop = self.stop_index, "removed surface");
        Ok((surface, gap))
    }

    /// Sum of gap thicknesses over `start..end`.
    pub fn overall_length(&self, start: usize, end: usize) -> f64 {
        let end = end.min(self.gaps.len());
        if start >= end {
            return 0.0;
        }
        self.gaps[start..end].iter().map(Gap::thickness).sum()
    }

    /// Recompute transforms relative to the default reference surface.
    pub fn update_model(&mut self) {
        let reference = DEFAULT_REFERENCE_SURFACE.min(self.image_index());
        self.propagate_transforms(reference);
    }

    /// Recompute local transforms, then global transforms relative to `reference`.
    pub fn update_transforms(&mut self, reference: usize) -> Result<()> {
        self.check_surface(reference)?;
        self.propagate_transforms(reference);
        Ok(())
    }

    /// Transform pass with `reference` already known to be a valid surface.
    fn propagate_transforms(&mut self, reference: usize) {
        for (i, surface) in self.surfaces.iter_mut().enumerate() {
            let local = match self.gaps.get(i) {
                Some(gap) => Transform::translation(0.0, 0.0, gap.finite_thickness()),
                None => Transform::identity(),
            };
            surface.set_local_transform(local);
        }

        self.surfaces[reference].set_global_transform(Transform::identity());
        for i in (0..reference).rev() {
            let next = self.surfaces[i + 1].global_transform().clone();
            let step = self.surfaces[i].local_transform().inverse();
            self.surfaces[i].set_global_transform(next.then(&step));
        }
        for i in reference + 1..self.surfaces.len() {
            let prev = self.surfaces[i - 1].global_transform().clone();
            let step = self.surfaces[i - 1].local_transform().clone();
            self.surfaces[i].set_global_transform(prev.then(&step));
        }
    }

    fn check_surface(&self, i: usize) -> Result<()> {
        if i < self.surfaces.len() {
            Ok(())
        } else {
            Err(ModelError::SurfaceIndex {
                index: i,
                count: self.surfaces.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air() -> Arc<Material> {
        Arc::new(Material::Air)
    }

    fn lens() -> OpticalAssembly {
        let mut asm = OpticalAssembly::minimum(air());
        asm.gap_mut(0).unwrap().set_thickness(100.0);
        asm.gap_mut(1).unwrap().set_thickness(5.0);
        asm.push(Surface::spherical(20.0).unwrap(), Gap::new(3.0, air()));
        asm.push(Surface::spherical(-20.0).unwrap(), Gap::new(40.0, air()));
        asm.update_model();
        asm
    }

    #[test]
    fn test_minimum_assembly() {
        let asm = OpticalAssembly::minimum(air());
        assert_eq!(asm.surface_count(), 3);
        assert_eq!(asm.gap_count(), asm.surface_count() - 1);
        assert_eq!(asm.stop_index(), 1);
        assert_eq!(asm.image().label(), "Img");
    }

    #[test]
    fn test_insert_before_stop_shifts_stop() {
        let mut asm = lens();
        assert_eq!(asm.stop_index(), 1);
        asm.insert(1, Surface::flat().with_label("front"), Gap::new(1.0, air()))
            .unwrap();
        assert_eq!(asm.stop_index(), 2);
        assert_eq!(asm.stop().label(), "Stop");
        assert_eq!(asm.current_index(), 1);
        assert_eq!(asm.gap_count() + 1, asm.surface_count());
    }

    #[test]
    fn test_insert_after_stop_keeps_stop() {
        let mut asm = lens();
        asm.insert(3, Surface::flat(), Gap::new(1.0, air())).unwrap();
        assert_eq!(asm.stop_index(), 1);
        assert!(asm.insert(0, Surface::flat(), Gap::new(1.0, air())).is_err());
        let last = asm.image_index() + 1;
        assert!(asm.insert(last, Surface::flat(), Gap::new(1.0, air())).is_err());
    }

    #[test]
    fn test_remove_shifts_stop() {
        let mut asm = lens();
        asm.insert(1, Surface::flat().with_label("front"), Gap::new(1.0, air()))
            .unwrap();
        let (removed, _) = asm.remove(1).unwrap();
        assert_eq!(removed.label(), "front");
        assert_eq!(asm.stop_index(), 1);
        assert_eq!(asm.stop().label(), "Stop");
        assert!(asm.remove(0).is_err());
        assert!(asm.remove(asm.image_index()).is_err());
    }

    #[test]
    fn test_push_lands_before_image() {
        let mut asm = OpticalAssembly::minimum(air());
        asm.push(Surface::flat().with_label("last"), Gap::new(7.0, air()));
        assert_eq!(asm.current_index(), 2);
        assert_eq!(asm.surface(2).unwrap().label(), "last");
        assert_eq!(asm.image().label(), "Img");
        assert_eq!(asm.stop_index(), 1);
        assert_eq!(asm.image_space_gap().thickness(), 7.0);
        asm.update_model();
        let z = asm.image().global_transform().translation.z;
        assert!((z - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_cannot_empty_assembly() {
        let mut asm = OpticalAssembly::minimum(air());
        assert_eq!(asm.remove(1).unwrap_err(), ModelError::TooFewSurfaces);
    }

    #[test]
    fn test_overall_length() {
        let asm = lens();
        assert!((asm.overall_length(1, 4) - 48.0).abs() < 1e-12);
        assert!((asm.overall_length(0, 100) - 148.0).abs() < 1e-12);
        assert_eq!(asm.overall_length(3, 1), 0.0);
    }

    #[test]
    fn test_global_transforms_relative_to_first_surface() {
        let asm = lens();
        let z = |i: usize| asm.surface(i).unwrap().global_transform().translation.z;
        assert!((z(0) + 100.0).abs() < 1e-12);
        assert!(z(1).abs() < 1e-12);
        assert!((z(2) - 5.0).abs() < 1e-12);
        assert!((z(3) - 8.0).abs() < 1e-12);
        assert!((z(4) - 48.0).abs() < 1e-12);
        let img = asm.image().local_transform();
        assert_eq!(img, &Transform::identity());
    }

    #[test]
    fn test_transforms_relative_to_other_reference() {
        let mut asm = lens();
        asm.update_transforms(3).unwrap();
        let z = |i: usize| asm.surface(i).unwrap().global_transform().translation.z;
        assert!((z(1) + 8.0).abs() < 1e-12);
        assert!((z(4) - 40.0).abs() < 1e-12);
        assert!(asm.update_transforms(9).is_err());
    }
}
