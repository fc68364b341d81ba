//! Serializable analysis reports for `--json` output.

use anyhow::{Context, Result};
use refract::refract_math::Point2;
use refract::refract_model::{Field, VignettingFactors};
use refract::refract_trace::{AstigmaticFocus, Ray, RayStatus};
use refract::OpticalSystem;
use serde::Serialize;

/// One row of the lens data table.
#[derive(Debug, Serialize)]
pub struct SurfaceRow {
    pub index: usize,
    pub label: String,
    pub radius: f64,
    pub thickness: Option<f64>,
    pub material: Option<String>,
    pub semi_diameter: f64,
}

/// Lens data table.
#[derive(Debug, Serialize)]
pub struct LensReport {
    pub title: String,
    pub stop: usize,
    pub surfaces: Vec<SurfaceRow>,
}

impl LensReport {
    pub fn new(system: &OpticalSystem) -> Self {
        let asm = system.assembly();
        let surfaces = asm
            .surfaces()
            .iter()
            .enumerate()
            .map(|(index, s)| {
                let gap = asm.gaps().get(index);
                SurfaceRow {
                    index,
                    label: s.label().to_string(),
                    radius: s.radius(),
                    thickness: gap.map(|g| g.thickness()),
                    material: gap.map(|g| g.material().name()),
                    semi_diameter: s.semi_diameter(),
                }
            })
            .collect();
        Self {
            title: system.title().to_string(),
            stop: asm.stop_index(),
            surfaces,
        }
    }
}

/// Intersection and direction at one surface.
#[derive(Debug, Serialize)]
pub struct SegmentRow {
    pub point: [f64; 3],
    pub direction: [f64; 3],
}

/// One traced ray.
#[derive(Debug, Serialize)]
pub struct RayReport {
    pub pupil: [f64; 2],
    pub wavelength: f64,
    pub status: RayStatus,
    pub optical_path_length: f64,
    pub segments: Vec<SegmentRow>,
}

impl From<&Ray> for RayReport {
    fn from(ray: &Ray) -> Self {
        let segments = ray
            .segments()
            .iter()
            .map(|seg| SegmentRow {
                point: [seg.point.x, seg.point.y, seg.point.z],
                direction: [seg.direction.x, seg.direction.y, seg.direction.z],
            })
            .collect();
        Self {
            pupil: [ray.pupil().x, ray.pupil().y],
            wavelength: ray.wavelength(),
            status: ray.status(),
            optical_path_length: ray.optical_path_length(),
            segments,
        }
    }
}

/// Per-field result of a field-dependent analysis.
#[derive(Debug, Serialize)]
pub struct FieldRow<T> {
    pub field: [f64; 2],
    #[serde(flatten)]
    pub value: T,
}

impl<T> FieldRow<T> {
    fn new(field: &Field, value: T) -> Self {
        Self {
            field: [field.x, field.y],
            value,
        }
    }
}

/// Vignetting factors of every field.
pub fn vignetting(system: &OpticalSystem) -> Result<Vec<FieldRow<VignettingFactors>>> {
    let tracer = system.sequential_trace();
    system
        .spec()
        .fields
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let v = tracer
                .compute_vignetting_factors(field)
                .with_context(|| format!("vignetting search failed for field {i}"))?;
            Ok(FieldRow::new(field, v))
        })
        .collect()
}

/// Sagittal and tangential focus of every field; `None` where the chief ray fails.
pub fn astigmatism(system: &OpticalSystem, wavelength: f64) -> Vec<FieldRow<Option<AstigmaticFocus>>> {
    let tracer = system.sequential_trace();
    system
        .spec()
        .fields
        .fields
        .iter()
        .map(|field| FieldRow::new(field, tracer.trace_coddington(field, wavelength)))
        .collect()
}

/// `n` relative pupil points evenly spaced along the meridional diameter.
pub fn meridional_fan(n: usize) -> Vec<Point2> {
    match n {
        0 => Vec::new(),
        1 => vec![Point2::origin()],
        _ => (0..n)
            .map(|i| Point2::new(0.0, -1.0 + 2.0 * i as f64 / (n - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use refract::Prescription;

    use super::*;

    const TRIPLET: &str = include_str!("../../../demos/triplet.toml");

    fn triplet() -> OpticalSystem {
        let mut system = Prescription::from_toml_str(TRIPLET).unwrap().build().unwrap();
        system.update_model().unwrap();
        system
    }

    #[test]
    fn test_meridional_fan() {
        assert!(meridional_fan(0).is_empty());
        assert_eq!(meridional_fan(1), vec![Point2::origin()]);
        let fan = meridional_fan(5);
        assert_eq!(fan.len(), 5);
        assert_eq!(fan[0], Point2::new(0.0, -1.0));
        assert_eq!(fan[2], Point2::new(0.0, 0.0));
        assert_eq!(fan[4], Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_lens_report() {
        let report = LensReport::new(&triplet());
        assert_eq!(report.stop, 4);
        assert_eq!(report.surfaces.len(), 8);
        assert!(report.surfaces[7].thickness.is_none());
        assert_eq!(report.surfaces[3].material.as_deref(), Some("1.62004:36.37"));
    }

    #[test]
    fn test_vignetting_report_matches_update() {
        let system = triplet();
        let rows = vignetting(&system).unwrap();
        assert_eq!(rows.len(), 3);
        for (row, field) in rows.iter().zip(&system.spec().fields.fields) {
            assert_eq!(row.value, field.vignetting);
        }
        let json = serde_json::to_value(&rows[2]).unwrap();
        assert_eq!(json["field"][1], 20.0);
        assert!(json["vuy"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_ray_report_json() {
        let system = triplet();
        let field = &system.spec().fields.fields[1];
        let ray = system
            .sequential_trace()
            .trace_pupil_ray(Point2::origin(), field, 587.562);
        let json = serde_json::to_value(RayReport::from(&ray)).unwrap();
        assert_eq!(json["status"], "Success");
        assert_eq!(json["segments"].as_array().unwrap().len(), 8);
    }
}
