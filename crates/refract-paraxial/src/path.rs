//! Per-surface data needed by the paraxial recurrence.

use refract_model::OpticalAssembly;

use crate::error::{ParaxialError, Result};

/// Curvature, following thickness and following index of one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParaxialPathComponent {
    /// Vertex curvature.
    pub curvature: f64,
    /// Thickness to the next surface.
    pub thickness: f64,
    /// Refractive index after the surface.
    pub refractive_index: f64,
}

/// An ordered run of surfaces at one wavelength.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParaxialPath {
    components: Vec<ParaxialPathComponent>,
}

impl ParaxialPath {
    /// Build the path from surface `start` to `end` inclusive.
    ///
    /// When `start > end` the path runs backwards: curvatures are negated and
    /// each component takes the gap in front of its surface.
    pub fn new(
        assembly: &OpticalAssembly,
        start: usize,
        end: usize,
        wavelength_nm: f64,
    ) -> Result<Self> {
        let count = assembly.surface_count();
        for index in [start, end] {
            if index >= count {
                return Err(ParaxialError::SurfaceIndex { index, count });
            }
        }
        let image_space_index = assembly.image_space_gap().refractive_index(wavelength_nm);
        let surfaces = assembly.surfaces();
        let gaps = assembly.gaps();

        let components = if start <= end {
            (start..=end)
                .map(|i| {
                    let (thickness, refractive_index) = if i < assembly.image_index() {
                        (gaps[i].finite_thickness(), gaps[i].refractive_index(wavelength_nm))
                    } else {
                        (0.0, image_space_index)
                    };
                    ParaxialPathComponent {
                        curvature: surfaces[i].curvature(),
                        thickness,
                        refractive_index,
                    }
                })
                .collect()
        } else {
            (end..=start)
                .rev()
                .map(|i| {
                    let (thickness, refractive_index) = if i > 0 {
                        let gap = &gaps[i - 1];
                        (gap.finite_thickness(), gap.refractive_index(wavelength_nm))
                    } else {
                        (0.0, gaps[0].refractive_index(wavelength_nm))
                    };
                    ParaxialPathComponent {
                        curvature: -surfaces[i].curvature(),
                        thickness,
                        refractive_index,
                    }
                })
                .collect()
        };
        Ok(Self { components })
    }

    /// Component `i`.
    pub fn at(&self, i: usize) -> Option<&ParaxialPathComponent> {
        self.components.get(i)
    }

    /// Last component.
    pub fn back(&self) -> Option<&ParaxialPathComponent> {
        self.components.last()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Iterate components in path order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParaxialPathComponent> {
        self.components.iter()
    }
}
