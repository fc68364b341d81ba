//! Optical specification: pupil, fields and wavelengths.
//!
//! These are the system-level inputs the paraxial solver inverts to find
//! starting ray coordinates. Everything here is plain data with serde
//! support so prescriptions can be loaded from disk.

use std::fmt;

use refract_material::spectral_line;
use refract_math::{Point2, Point3};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// How the system aperture is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PupilType {
    /// Entrance pupil diameter, lens units.
    #[default]
    EntrancePupilDiameter,
    /// Object-space numerical aperture.
    ObjectNa,
    /// Image-space F-number.
    FNumber,
    /// Image-space numerical aperture.
    ImageNa,
}

/// System aperture: type plus value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PupilSpec {
    /// Aperture type.
    #[serde(rename = "type")]
    pub pupil_type: PupilType,
    /// Diameter, NA or F-number depending on `pupil_type`.
    pub value: f64,
}

impl PupilSpec {
    /// Pupil of `pupil_type` with `value`.
    pub fn new(pupil_type: PupilType, value: f64) -> Self {
        Self { pupil_type, value }
    }
}

impl Default for PupilSpec {
    fn default() -> Self {
        Self::new(PupilType::EntrancePupilDiameter, 10.0)
    }
}

/// How field points are specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Object-space angle in degrees.
    #[default]
    ObjectAngle,
    /// Object height, lens units.
    ObjectHeight,
    /// Paraxial image height, lens units.
    ImageHeight,
}

/// Fractional pupil reductions for one field: upper/lower in y and x.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VignettingFactors {
    /// Upper y.
    pub vuy: f64,
    /// Lower y.
    pub vly: f64,
    /// Upper x.
    pub vux: f64,
    /// Lower x.
    pub vlx: f64,
}

/// One field point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// x coordinate (degrees or lens units, per [`FieldType`]).
    pub x: f64,
    /// y coordinate.
    pub y: f64,
    /// Relative weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Vignetting factors applied to pupil coordinates.
    #[serde(default)]
    pub vignetting: VignettingFactors,
    /// Chief ray aim point in the entrance pupil plane, from ray aiming.
    #[serde(skip, default = "Point2::origin")]
    pub aim_pt: Point2,
    /// Object point used for the last aim.
    #[serde(skip, default = "Point3::origin")]
    pub object_pt: Point3,
}

fn default_weight() -> f64 {
    1.0
}

impl Field {
    /// Unvignetted field at `(x, y)` with unit weight.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            weight: 1.0,
            vignetting: VignettingFactors::default(),
            aim_pt: Point2::origin(),
            object_pt: Point3::origin(),
        }
    }

    /// Distance of the field point from the axis.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Scale a relative pupil coordinate by the vignetting factors.
    ///
    /// Negative coordinates use the lower factor, the rest the upper one.
    pub fn apply_vignetting(&self, pupil: Point2) -> Point2 {
        let v = &self.vignetting;
        let x = if pupil.x < 0.0 {
            pupil.x * (1.0 - v.vlx)
        } else {
            pupil.x * (1.0 - v.vux)
        };
        let y = if pupil.y < 0.0 {
            pupil.y * (1.0 - v.vly)
        } else {
            pupil.y * (1.0 - v.vuy)
        };
        Point2::new(x, y)
    }

    /// Reset vignetting to zero.
    pub fn clear_vignetting(&mut self) {
        self.vignetting = VignettingFactors::default();
    }
}

/// Field type plus the list of field points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field type.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Field points. The first one is conventionally on axis.
    pub fields: Vec<Field>,
}

impl FieldSpec {
    /// Field spec of `field_type` with no fields.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            fields: Vec::new(),
        }
    }

    /// Append a field point.
    pub fn add(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Largest radial field coordinate.
    pub fn max_field(&self) -> f64 {
        self.fields
            .iter()
            .map(Field::magnitude)
            .fold(0.0, f64::max)
    }

    /// Reset vignetting on every field.
    pub fn clear_vignetting(&mut self) {
        self.fields.iter_mut().for_each(Field::clear_vignetting);
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            field_type: FieldType::ObjectAngle,
            fields: vec![Field::new(0.0, 0.0)],
        }
    }
}

/// One wavelength with its weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wavelength {
    /// Wavelength in nm.
    pub value: f64,
    /// Relative weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Wavelength {
    /// Wavelength of `value` nm with unit weight.
    pub fn new(value: f64) -> Self {
        Self { value, weight: 1.0 }
    }
}

/// Wavelength list plus the reference index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavelengthSpec {
    /// Wavelengths.
    pub wavelengths: Vec<Wavelength>,
    /// Index of the reference (design) wavelength.
    #[serde(default)]
    pub reference_index: usize,
}

impl WavelengthSpec {
    /// Single wavelength, used as reference.
    pub fn single(value: f64) -> Self {
        Self {
            wavelengths: vec![Wavelength::new(value)],
            reference_index: 0,
        }
    }

    /// Reference wavelength in nm.
    pub fn reference_wavelength(&self) -> Result<f64> {
        self.wavelengths
            .get(self.reference_index)
            .map(|w| w.value)
            .ok_or(ModelError::ReferenceIndex(self.reference_index))
    }

    /// Append a wavelength.
    pub fn add(&mut self, wavelength: Wavelength) {
        self.wavelengths.push(wavelength);
    }

    /// Number of wavelengths.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// True if there are no wavelengths.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }
}

impl Default for WavelengthSpec {
    fn default() -> Self {
        Self::single(spectral_line::D_HELIUM)
    }
}

/// Pupil, field and wavelength specification of a system.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpticalSpec {
    /// System aperture.
    #[serde(default)]
    pub pupil: PupilSpec,
    /// Field points.
    #[serde(default)]
    pub fields: FieldSpec,
    /// Wavelengths.
    #[serde(default)]
    pub wavelengths: WavelengthSpec,
}

impl OpticalSpec {
    /// Check that fields and wavelengths are usable.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ModelError::EmptySpec("field"));
        }
        if self.wavelengths.is_empty() {
            return Err(ModelError::EmptySpec("wavelength"));
        }
        self.wavelengths.reference_wavelength()?;
        Ok(())
    }

    /// Reference wavelength in nm.
    pub fn reference_wavelength(&self) -> Result<f64> {
        self.wavelengths.reference_wavelength()
    }
}

impl fmt::Display for OpticalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pupil: {:?} {:.4}", self.pupil.pupil_type, self.pupil.value)?;
        writeln!(f, "Field: {:?}", self.fields.field_type)?;
        writeln!(
            f,
            "{:>4}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}{:>10}",
            "F", "X", "Y", "Weight", "VUY", "VLY", "VUX", "VLX"
        )?;
        for (i, fld) in self.fields.fields.iter().enumerate() {
            let v = &fld.vignetting;
            writeln!(
                f,
                "{:>4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}",
                i, fld.x, fld.y, fld.weight, v.vuy, v.vly, v.vux, v.vlx
            )?;
        }
        writeln!(f, "{:>4}{:>10}{:>10}", "W", "Value", "Weight")?;
        for (i, w) in self.wavelengths.wavelengths.iter().enumerate() {
            let label = if i == self.wavelengths.reference_index {
                format!("{i}*")
            } else {
                i.to_string()
            };
            writeln!(f, "{:>4}{:>10.4}{:>10.4}", label, w.value, w.weight)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_vignetting_by_sign() {
        let mut fld = Field::new(0.0, 10.0);
        fld.vignetting = VignettingFactors {
            vuy: 0.25,
            vly: 0.5,
            vux: 0.0,
            vlx: 0.1,
        };
        let up = fld.apply_vignetting(Point2::new(1.0, 1.0));
        assert!((up.x - 1.0).abs() < 1e-15);
        assert!((up.y - 0.75).abs() < 1e-15);
        let down = fld.apply_vignetting(Point2::new(-1.0, -1.0));
        assert!((down.x + 0.9).abs() < 1e-15);
        assert!((down.y + 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_max_field() {
        let mut spec = FieldSpec::new(FieldType::ObjectHeight);
        assert_eq!(spec.max_field(), 0.0);
        spec.add(Field::new(0.0, 0.0));
        spec.add(Field::new(3.0, 4.0));
        spec.add(Field::new(0.0, -2.0));
        assert!((spec.max_field() - 5.0).abs() < 1e-15);
    }

    #[test]
    fn test_validate() {
        let mut spec = OpticalSpec::default();
        spec.validate().unwrap();
        spec.wavelengths.reference_index = 3;
        assert_eq!(spec.validate(), Err(ModelError::ReferenceIndex(3)));
        spec.fields.fields.clear();
        assert_eq!(spec.validate(), Err(ModelError::EmptySpec("field")));
    }

    #[test]
    fn test_default_reference_wavelength() {
        let spec = OpticalSpec::default();
        assert!((spec.reference_wavelength().unwrap() - 587.562).abs() < 1e-9);
    }
}
