//! Immutable per-wavelength view of the assembly used by the tracer.

use refract_model::{OpticalAssembly, Surface};

/// One surface with the gap that follows it.
#[derive(Debug, Clone, Copy)]
pub struct SequentialPathComponent<'a> {
    /// The surface.
    pub surface: &'a Surface,
    /// Thickness of the following gap (0 for the image).
    pub distance: f64,
    /// Refractive index of the following gap.
    pub refractive_index: f64,
}

/// Surfaces from object to image with indices at one wavelength.
///
/// Built once and shared read-only between threads tracing independent rays.
#[derive(Debug, Clone)]
pub struct SequentialPath<'a> {
    components: Vec<SequentialPathComponent<'a>>,
    wavelength: f64,
}

impl<'a> SequentialPath<'a> {
    /// Path through the whole assembly at `wavelength_nm`.
    ///
    /// The image surface carries zero thickness and the image-space index.
    pub fn new(assembly: &'a OpticalAssembly, wavelength_nm: f64) -> Self {
        let img = assembly.image_index();
        let image_index = assembly.image_space_gap().refractive_index(wavelength_nm);
        let components = assembly
            .surfaces()
            .iter()
            .enumerate()
            .map(|(i, surface)| {
                let (distance, refractive_index) = if i < img {
                    let gap = &assembly.gaps()[i];
                    (gap.finite_thickness(), gap.refractive_index(wavelength_nm))
                } else {
                    (0.0, image_index)
                };
                SequentialPathComponent {
                    surface,
                    distance,
                    refractive_index,
                }
            })
            .collect();
        Self {
            components,
            wavelength: wavelength_nm,
        }
    }

    /// Wavelength in nm.
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Component `i`.
    pub fn at(&self, i: usize) -> Option<&SequentialPathComponent<'a>> {
        self.components.get(i)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate components in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SequentialPathComponent<'a>> {
        self.components.iter()
    }
}
