//! Sequential real ray trace.

use rayon::prelude::*;
use refract_math::{Point2, Point3, Vec3};
use refract_model::{Field, FieldType, OpticalAssembly, OpticalSpec};
use refract_paraxial::FirstOrderData;
use tracing::{debug, warn};

use crate::bend::bend;
use crate::error::Result;
use crate::path::SequentialPath;
use crate::ray::{Ray, RayStatus};
use crate::settings::TraceSettings;

/// Relative pupil coordinates of the reference rays: chief, upper and lower
/// meridional, then the two sagittal edges.
pub const REFERENCE_PUPILS: [(f64, f64); 5] =
    [(0.0, 0.0), (0.0, 1.0), (0.0, -1.0), (1.0, 0.0), (-1.0, 0.0)];

/// Real ray tracer over an updated assembly.
///
/// Borrows the assembly, spec and first-order data read-only, so any number
/// of traces may run concurrently. Ray failures are recorded on the returned
/// [`Ray`]; only the aiming and vignetting searches return errors.
#[derive(Debug, Clone, Copy)]
pub struct SequentialTrace<'a> {
    assembly: &'a OpticalAssembly,
    spec: &'a OpticalSpec,
    fod: &'a FirstOrderData,
    settings: TraceSettings,
}

impl<'a> SequentialTrace<'a> {
    /// Tracer with default settings.
    pub fn new(assembly: &'a OpticalAssembly, spec: &'a OpticalSpec, fod: &'a FirstOrderData) -> Self {
        Self {
            assembly,
            spec,
            fod,
            settings: TraceSettings::default(),
        }
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: TraceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// Traced assembly.
    pub fn assembly(&self) -> &'a OpticalAssembly {
        self.assembly
    }

    /// Optical spec.
    pub fn spec(&self) -> &'a OpticalSpec {
        self.spec
    }

    /// First-order data used to place launch points.
    pub fn first_order_data(&self) -> &'a FirstOrderData {
        self.fod
    }

    /// Path snapshot at `wavelength_nm`.
    pub fn create_path(&self, wavelength_nm: f64) -> SequentialPath<'a> {
        SequentialPath::new(self.assembly, wavelength_nm)
    }

    /// Trace from `pt0` on the object surface along unit `dir0`.
    pub fn trace_ray_throughout_path(
        &self,
        path: &SequentialPath<'_>,
        pt0: Point3,
        dir0: Vec3,
        pupil: Point2,
    ) -> Ray {
        self.trace_with(path, pt0, dir0, pupil, self.settings.aperture_check)
    }

    pub(crate) fn trace_with(
        &self,
        path: &SequentialPath<'_>,
        pt0: Point3,
        dir0: Vec3,
        pupil: Point2,
        aperture_check: bool,
    ) -> Ray {
        let mut ray = Ray::new(path.wavelength(), pupil);
        let mut components = path.iter().enumerate();
        let Some((_, object)) = components.next() else {
            return ray;
        };

        let normal = match object.surface.profile().normal(&pt0) {
            Ok(n) => n,
            Err(err) => {
                debug!(%err, "object surface normal failed");
                ray.set_status(RayStatus::MissedSurface);
                return ray;
            }
        };
        let mut n_in = object.refractive_index;
        ray.push(pt0, normal, dir0, 0.0, n_in, n_in);

        let mut before_pt = pt0;
        let mut before_dir = dir0;
        let mut transform = object.surface.local_transform();

        for (k, component) in components {
            let rel_pt = transform.inverse_apply_point(&before_pt);
            let rel_dir = transform.inverse_apply_vec(&before_dir);

            // Start the root search from the foot of the perpendicular to the vertex.
            let d_perp = -rel_pt.coords.dot(&rel_dir);
            let foot = rel_pt + rel_dir * d_perp;

            let profile = component.surface.profile();
            let hit = profile
                .intersect(&foot, &rel_dir, &self.settings.intersect)
                .and_then(|(pt, s)| Ok((pt, s, profile.normal(&pt)?)));
            let (pt, s, normal) = match hit {
                Ok(hit) => hit,
                Err(err) => {
                    if err.is_missed_surface() {
                        debug!(surface = k, %err, "ray missed surface");
                    } else {
                        warn!(surface = k, %err, "surface evaluation failed");
                    }
                    ray.set_status(RayStatus::MissedSurface);
                    return ray;
                }
            };

            let n_out = component.refractive_index;
            let Some(after_dir) = bend(&rel_dir, &normal, n_in, n_out) else {
                debug!(surface = k, "total internal reflection");
                ray.set_status(RayStatus::TotalInternalReflection);
                return ray;
            };

            ray.push(pt, normal, after_dir, d_perp + s, n_in, n_out);

            if aperture_check && !component.surface.point_inside(pt.x, pt.y) {
                ray.set_status(RayStatus::Blocked);
                return ray;
            }

            before_pt = pt;
            before_dir = after_dir;
            n_in = n_out;
            transform = component.surface.local_transform();
        }

        ray.set_status(RayStatus::Success);
        ray
    }

    /// Object point for `field`, in the object surface frame.
    pub fn default_object_point(&self, field: &Field) -> Point3 {
        match self.spec.fields.field_type {
            FieldType::ObjectAngle => {
                let obj2enp = self.fod.object_to_entrance_pupil();
                Point3::new(
                    -field.x.to_radians().tan() * obj2enp,
                    -field.y.to_radians().tan() * obj2enp,
                    0.0,
                )
            }
            FieldType::ObjectHeight => Point3::new(field.x, field.y, 0.0),
            FieldType::ImageHeight => Point3::new(self.fod.red * field.x, self.fod.red * field.y, 0.0),
        }
    }

    /// Launch point and unit direction for relative pupil coordinate `pupil`.
    pub fn pupil_to_object(&self, pupil: Point2, field: &Field) -> (Point3, Vec3) {
        self.launch(pupil, field, self.settings.apply_vignetting)
    }

    pub(crate) fn launch(&self, pupil: Point2, field: &Field, apply_vignetting: bool) -> (Point3, Vec3) {
        let pupil = if apply_vignetting {
            field.apply_vignetting(pupil)
        } else {
            pupil
        };
        let pt0 = self.default_object_point(field);
        let r = self.fod.enp_radius;
        let pt1 = Point3::new(
            r * pupil.x + field.aim_pt.x,
            r * pupil.y + field.aim_pt.y,
            self.fod.object_to_entrance_pupil(),
        );
        (pt0, (pt1 - pt0).normalize())
    }

    /// Trace one ray from relative pupil coordinate `pupil` for `field`.
    pub fn trace_pupil_ray(&self, pupil: Point2, field: &Field, wavelength_nm: f64) -> Ray {
        let path = self.create_path(wavelength_nm);
        self.trace_pupil_ray_on(&path, pupil, field)
    }

    /// [`trace_pupil_ray`](Self::trace_pupil_ray) on an existing path.
    pub fn trace_pupil_ray_on(&self, path: &SequentialPath<'_>, pupil: Point2, field: &Field) -> Ray {
        let (pt0, dir0) = self.pupil_to_object(pupil, field);
        self.trace_ray_throughout_path(path, pt0, dir0, pupil)
    }

    /// Trace many pupil samples in parallel, one shared path.
    ///
    /// Results are in input order. Failed rays keep their status.
    pub fn trace_pupil_rays(&self, pupils: &[Point2], field: &Field, wavelength_nm: f64) -> Vec<Ray> {
        let path = self.create_path(wavelength_nm);
        pupils
            .par_iter()
            .map(|&pupil| self.trace_pupil_ray_on(&path, pupil, field))
            .collect()
    }

    /// Chief, meridional and sagittal edge rays for `field`.
    pub fn trace_reference_rays(&self, field: &Field, wavelength_nm: f64) -> Vec<Ray> {
        let pupils: Vec<Point2> = REFERENCE_PUPILS
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect();
        self.trace_pupil_rays(&pupils, field, wavelength_nm)
    }

    /// Trace the reference rays of every field at the reference wavelength.
    pub fn trace_all_reference_rays(&self) -> Result<Vec<Vec<Ray>>> {
        let wvl = self.spec.reference_wavelength()?;
        Ok(self
            .spec
            .fields
            .fields
            .iter()
            .map(|field| self.trace_reference_rays(field, wvl))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use refract_geom::Aperture;
    use refract_material::{spectral_line, BuchdahlGlass, Material};
    use refract_model::{Gap, PupilSpec, PupilType, Surface};
    use refract_paraxial::ParaxialTrace;

    use super::*;

    /// Object at infinity, flat stop, 10 mm EPD, image 20 mm behind.
    pub(crate) fn flat_system() -> OpticalAssembly {
        let air = Arc::new(Material::Air);
        let mut asm = OpticalAssembly::minimum(air);
        asm.gap_mut(0).unwrap().set_thickness(f64::INFINITY);
        asm.gap_mut(1).unwrap().set_thickness(20.0);
        asm.update_model();
        asm
    }

    /// Stop, then a 1.5:64 singlet, image near the paraxial focus.
    pub(crate) fn singlet() -> OpticalAssembly {
        let air = Arc::new(Material::Air);
        let glass = Arc::new(Material::Model(BuchdahlGlass::new(1.5, 64.0).unwrap()));
        let mut asm = OpticalAssembly::minimum(Arc::clone(&air));
        asm.gap_mut(0).unwrap().set_thickness(f64::INFINITY);
        asm.gap_mut(1).unwrap().set_thickness(1.0);
        asm.push(Surface::spherical(50.0).unwrap(), Gap::new(2.0, glass));
        asm.push(Surface::spherical(-50.0).unwrap(), Gap::new(49.665, air));
        asm.update_model();
        asm
    }

    pub(crate) fn spec_with_fields(fields: &[(f64, f64)]) -> OpticalSpec {
        let mut spec = OpticalSpec::default();
        spec.pupil = PupilSpec::new(PupilType::EntrancePupilDiameter, 10.0);
        spec.fields.fields.clear();
        for &(x, y) in fields {
            spec.fields.add(Field::new(x, y));
        }
        spec
    }

    pub(crate) fn fod(asm: &OpticalAssembly, spec: &OpticalSpec) -> FirstOrderData {
        ParaxialTrace::new(asm).first_order_data(spec).unwrap()
    }

    #[test]
    fn test_flat_system_chief_ray_lands_on_axis() {
        let asm = flat_system();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let field = &spec.fields.fields[0];

        let ray = tracer.trace_pupil_ray(Point2::origin(), field, spectral_line::D_HELIUM);
        assert_eq!(ray.status(), RayStatus::Success);
        assert_eq!(ray.len(), asm.surface_count());
        let img = ray.back().unwrap();
        assert_abs_diff_eq!(img.x(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(img.y(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_flat_system_edge_ray_is_undeviated() {
        let asm = flat_system();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let field = &spec.fields.fields[0];

        let ray = tracer.trace_pupil_ray(Point2::new(0.0, 1.0), field, spectral_line::D_HELIUM);
        assert!(ray.is_success());
        let entering = ray.at(0).unwrap().direction;
        let leaving = ray.back().unwrap().direction;
        assert_abs_diff_eq!(entering, leaving, epsilon = 1e-12);
        // Collimated at the pupil radius.
        assert_abs_diff_eq!(ray.at(1).unwrap().y(), 5.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ray.back().unwrap().y(), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_index_continuity() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let ray = tracer.trace_pupil_ray(Point2::new(0.0, 0.7), &spec.fields.fields[0], spectral_line::D_HELIUM);
        assert!(ray.is_success());
        for pair in ray.segments().windows(2) {
            assert_eq!(pair[1].n_in, pair[0].n_out);
        }
    }

    #[test]
    fn test_singlet_focuses_near_axis() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let field = &spec.fields.fields[0];
        let rays = tracer.trace_reference_rays(field, spectral_line::D_HELIUM);
        assert_eq!(rays.len(), 5);
        assert!(rays.iter().all(Ray::is_success));
        // F/5: edge rays cross the axis within spherical aberration of the focus.
        for ray in &rays[1..] {
            assert!(ray.back().unwrap().height() < 0.5);
        }
        // Sagittal and meridional edges are symmetric.
        assert_abs_diff_eq!(rays[1].back().unwrap().y(), -rays[2].back().unwrap().y(), epsilon = 1e-9);
        assert_abs_diff_eq!(rays[3].back().unwrap().x(), rays[1].back().unwrap().y(), epsilon = 1e-9);
    }

    #[test]
    fn test_aperture_check_blocks() {
        let mut asm = singlet();
        asm.surface_mut(2)
            .unwrap()
            .set_clear_aperture(Aperture::circular(3.0));
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let settings = TraceSettings {
            aperture_check: true,
            ..TraceSettings::default()
        };
        let tracer = SequentialTrace::new(&asm, &spec, &fod).with_settings(settings);
        let field = &spec.fields.fields[0];

        let edge = tracer.trace_pupil_ray(Point2::new(0.0, 1.0), field, spectral_line::D_HELIUM);
        assert_eq!(edge.status(), RayStatus::Blocked);
        // The blocking segment is kept.
        assert_eq!(edge.reached_surface_index(), Some(2));

        let inner = tracer.trace_pupil_ray(Point2::new(0.0, 0.5), field, spectral_line::D_HELIUM);
        assert!(inner.is_success());

        let unchecked = SequentialTrace::new(&asm, &spec, &fod);
        assert!(unchecked
            .trace_pupil_ray(Point2::new(0.0, 1.0), field, spectral_line::D_HELIUM)
            .is_success());
    }

    #[test]
    fn test_total_internal_reflection_stops_ray() {
        // Steep ray inside glass meeting a flat glass/air boundary.
        let air = Arc::new(Material::Air);
        let glass = Arc::new(Material::Model(BuchdahlGlass::new(1.8, 40.0).unwrap()));
        let mut asm = OpticalAssembly::minimum(Arc::clone(&glass));
        asm.gap_mut(0).unwrap().set_thickness(10.0);
        asm.gap_mut(1).unwrap().set_material(glass);
        asm.gap_mut(1).unwrap().set_thickness(5.0);
        asm.push(Surface::flat(), Gap::new(5.0, air));
        asm.update_model();

        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let path = tracer.create_path(spectral_line::D_HELIUM);
        let dir = Vec3::new(0.0, 0.8, 0.6);
        let ray = tracer.trace_ray_throughout_path(&path, Point3::origin(), dir, Point2::origin());
        assert_eq!(ray.status(), RayStatus::TotalInternalReflection);
        // Object and stop reached, nothing appended for the TIR surface.
        assert_eq!(ray.len(), 2);
    }

    #[test]
    fn test_missed_sphere() {
        let air = Arc::new(Material::Air);
        let mut asm = OpticalAssembly::minimum(Arc::clone(&air));
        asm.gap_mut(0).unwrap().set_thickness(10.0);
        asm.push(Surface::spherical(5.0).unwrap(), Gap::new(5.0, air));
        asm.update_model();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let path = tracer.create_path(spectral_line::D_HELIUM);
        let ray = tracer.trace_ray_throughout_path(
            &path,
            Point3::new(0.0, 20.0, 0.0),
            Vec3::z(),
            Point2::origin(),
        );
        assert_eq!(ray.status(), RayStatus::MissedSurface);
        assert_eq!(ray.len(), 2);
    }

    #[test]
    fn test_object_angle_point() {
        let asm = flat_system();
        let mut spec = spec_with_fields(&[(0.0, 0.0)]);
        spec.fields.add(Field::new(0.0, 10.0));
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let field = &spec.fields.fields[1];
        let (pt0, dir) = tracer.pupil_to_object(Point2::origin(), field);
        assert!(pt0.y < 0.0);
        assert_abs_diff_eq!(dir.y / dir.z, 10.0_f64.to_radians().tan(), epsilon = 1e-9);

        let ray = tracer.trace_pupil_ray(Point2::origin(), field, spectral_line::D_HELIUM);
        assert!(ray.is_success());
        assert_abs_diff_eq!(ray.at(1).unwrap().y(), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(ray.back().unwrap().y(), 20.0 * 10.0_f64.to_radians().tan(), epsilon = 1e-4);
    }

    #[test]
    fn test_parallel_batch_matches_serial() {
        let asm = singlet();
        let spec = spec_with_fields(&[(0.0, 0.0)]);
        let fod = fod(&asm, &spec);
        let tracer = SequentialTrace::new(&asm, &spec, &fod);
        let field = &spec.fields.fields[0];
        let pupils: Vec<Point2> = (0..16)
            .map(|i| Point2::new(0.0, -1.0 + 2.0 * i as f64 / 15.0))
            .collect();
        let batch = tracer.trace_pupil_rays(&pupils, field, spectral_line::D_HELIUM);
        for (pupil, ray) in pupils.iter().zip(&batch) {
            assert_eq!(ray.pupil(), *pupil);
            let serial = tracer.trace_pupil_ray(*pupil, field, spectral_line::D_HELIUM);
            assert_eq!(&serial, ray);
        }
    }
}
