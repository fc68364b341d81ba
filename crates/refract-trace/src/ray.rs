//! Real rays: one segment per surface reached.

use std::fmt;

use refract_math::{Point2, Point3, Vec3};
use serde::{Deserialize, Serialize};

/// Terminal state of a traced ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RayStatus {
    /// Not traced yet.
    #[default]
    NotTraced,
    /// Reached the image surface.
    Success,
    /// Stopped by a clear aperture.
    Blocked,
    /// Did not meet a surface.
    MissedSurface,
    /// Totally internally reflected.
    TotalInternalReflection,
}

impl fmt::Display for RayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotTraced => "Not Traced",
            Self::Success => "Pass Through",
            Self::Blocked => "Blocked",
            Self::MissedSurface => "Missed Surface",
            Self::TotalInternalReflection => "Total Reflection",
        };
        f.write_str(s)
    }
}

/// Ray data at one surface, in that surface's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySegment {
    /// Intersection point.
    pub point: Point3,
    /// Unit surface normal at the intersection.
    pub normal: Vec3,
    /// Unit direction after the surface.
    pub direction: Vec3,
    /// Geometric path length from the previous intersection.
    pub distance: f64,
    /// Optical path length from the previous intersection.
    pub opl: f64,
    /// Index before the surface.
    pub n_in: f64,
    /// Index after the surface.
    pub n_out: f64,
    /// Index of the previous segment in the owning ray.
    pub before: Option<usize>,
}

impl RaySegment {
    /// x of the intersection.
    pub fn x(&self) -> f64 {
        self.point.x
    }

    /// y of the intersection.
    pub fn y(&self) -> f64 {
        self.point.y
    }

    /// z of the intersection.
    pub fn z(&self) -> f64 {
        self.point.z
    }

    /// Radial height of the intersection.
    pub fn height(&self) -> f64 {
        self.point.x.hypot(self.point.y)
    }

    /// Direction cosines `(L, M, N)` after the surface.
    pub fn direction_cosines(&self) -> (f64, f64, f64) {
        (self.direction.x, self.direction.y, self.direction.z)
    }

    /// Meridional angle of refraction (radians), between outgoing ray and normal.
    pub fn angle_of_refraction(&self) -> f64 {
        meridional_angle(&self.direction, &self.normal)
    }
}

/// Signed meridional angle `U1 - U2` from the y/z slopes of two directions.
fn meridional_angle(ray: &Vec3, normal: &Vec3) -> f64 {
    let tan_u1 = ray.y / ray.z;
    let tan_u2 = normal.y / normal.z;
    ((tan_u1 - tan_u2) / (1.0 + tan_u1 * tan_u2)).atan()
}

/// A real ray traced through a sequential path.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    segments: Vec<RaySegment>,
    status: RayStatus,
    wavelength: f64,
    pupil: Point2,
}

impl Ray {
    /// Untraced ray at `wavelength_nm` for relative pupil coordinate `pupil`.
    pub fn new(wavelength_nm: f64, pupil: Point2) -> Self {
        Self {
            segments: Vec::new(),
            status: RayStatus::NotTraced,
            wavelength: wavelength_nm,
            pupil,
        }
    }

    /// Append a segment, linking it to the previous one.
    pub(crate) fn push(
        &mut self,
        point: Point3,
        normal: Vec3,
        direction: Vec3,
        distance: f64,
        n_in: f64,
        n_out: f64,
    ) {
        let before = self.segments.len().checked_sub(1);
        self.segments.push(RaySegment {
            point,
            normal,
            direction,
            distance,
            opl: n_in * distance,
            n_in,
            n_out,
            before,
        });
    }

    pub(crate) fn set_status(&mut self, status: RayStatus) {
        self.status = status;
    }

    /// Terminal status.
    pub fn status(&self) -> RayStatus {
        self.status
    }

    /// True if the ray reached the image.
    pub fn is_success(&self) -> bool {
        self.status == RayStatus::Success
    }

    /// Wavelength in nm.
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Relative pupil coordinate the ray was launched from.
    pub fn pupil(&self) -> Point2 {
        self.pupil
    }

    /// Segment at surface `i`.
    pub fn at(&self, i: usize) -> Option<&RaySegment> {
        self.segments.get(i)
    }

    /// Last populated segment.
    pub fn back(&self) -> Option<&RaySegment> {
        self.segments.last()
    }

    /// Number of populated segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if nothing was traced.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All populated segments.
    pub fn segments(&self) -> &[RaySegment] {
        &self.segments
    }

    /// Index of the last surface the ray reached.
    pub fn reached_surface_index(&self) -> Option<usize> {
        self.segments.len().checked_sub(1)
    }

    /// Meridional angle of incidence at surface `i` (radians).
    ///
    /// Uses the previous segment's outgoing direction; the object segment
    /// uses its own direction.
    pub fn angle_of_incidence(&self, i: usize) -> Option<f64> {
        let seg = self.segments.get(i)?;
        let incident = match seg.before {
            Some(b) => &self.segments[b].direction,
            None => &seg.direction,
        };
        Some(meridional_angle(incident, &seg.normal))
    }

    /// Optical path length from the first surface to the last surface before the image.
    ///
    /// Skips the object segment, the object-to-first-surface leg and the image leg.
    pub fn optical_path_length(&self) -> f64 {
        let last = self.segments.len().saturating_sub(1);
        self.segments
            .iter()
            .take(last)
            .skip(2)
            .map(|s| s.opl)
            .sum()
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Wavelength: {}nm", self.wavelength)?;
        writeln!(
            f,
            "{:>4}{:>12}{:>12}{:>12}{:>10}{:>10}{:>10}{:>10}",
            "S", "X", "Y", "Z", "L", "M", "N", "AOI"
        )?;
        for (i, seg) in self.segments.iter().enumerate() {
            let aoi = self.angle_of_incidence(i).unwrap_or(0.0).to_degrees();
            writeln!(
                f,
                "{:>4}{:>12.4}{:>12.4}{:>12.4}{:>10.4}{:>10.4}{:>10.4}{:>10.4}",
                i,
                seg.point.x,
                seg.point.y,
                seg.point.z,
                seg.direction.x,
                seg.direction.y,
                seg.direction.z,
                aoi
            )?;
        }
        Ok(())
    }
}
