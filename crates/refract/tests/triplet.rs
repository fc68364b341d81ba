//! End-to-end checks on the Cooke triplet demo prescription.

use approx::assert_abs_diff_eq;
use refract::refract_math::Point2;
use refract::refract_trace::RayStatus;
use refract::{OpticalSystem, Prescription, SystemSettings};

const TRIPLET: &str = include_str!("../../../demos/triplet.toml");
const D_LINE: f64 = 587.562;
const STOP: usize = 4;

fn triplet() -> OpticalSystem {
    let mut system = Prescription::from_toml_str(TRIPLET)
        .unwrap()
        .build()
        .unwrap();
    system.update_model().unwrap();
    system
}

#[test]
fn test_prescription_layout() {
    let system = triplet();
    let asm = system.assembly();
    assert_eq!(system.title(), "Cooke triplet");
    assert_eq!(asm.surface_count(), 8);
    assert_eq!(asm.stop_index(), STOP);
    assert_eq!(asm.stop().label(), "Stop");
    assert_eq!(asm.gap(1).unwrap().material().name(), "1.62041:60.32");
    assert_eq!(system.spec().wavelengths.len(), 3);
    assert_abs_diff_eq!(system.spec().reference_wavelength().unwrap(), D_LINE);
}

#[test]
fn test_first_order_data() {
    let system = triplet();
    let fod = system.first_order_data();
    assert_abs_diff_eq!(fod.efl, 50.0213, epsilon = 1e-3);
    assert_abs_diff_eq!(fod.bfl, 42.4364, epsilon = 1e-3);
    assert_abs_diff_eq!(fod.enp_dist, 11.5058, epsilon = 1e-3);
    assert_abs_diff_eq!(fod.enp_radius, 5.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fod.fno, fod.efl / 10.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fod.img_ht.abs(), 50.0213 * 20f64.to_radians().tan(), epsilon = 1e-2);
}

#[test]
fn test_chief_rays_cross_stop_center() {
    let system = triplet();
    let tracer = system.sequential_trace();
    for field in &system.spec().fields.fields {
        let ray = tracer.trace_pupil_ray(Point2::origin(), field, D_LINE);
        assert_eq!(ray.status(), RayStatus::Success);
        assert!(ray.at(STOP).unwrap().height() < 1e-4);
    }
    let aims: Vec<f64> = system.spec().fields.fields.iter().map(|f| f.aim_pt.y).collect();
    assert_abs_diff_eq!(aims[0], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(aims[1], -0.0932, epsilon = 2e-3);
    assert_abs_diff_eq!(aims[2], -0.3260, epsilon = 2e-3);
}

#[test]
fn test_real_image_height_shows_barrel_distortion() {
    let system = triplet();
    let field = &system.spec().fields.fields[2];
    let ray = system
        .sequential_trace()
        .trace_pupil_ray(Point2::origin(), field, D_LINE);
    let image = ray.back().unwrap();
    let paraxial = system.first_order_data().img_ht.abs();
    assert_abs_diff_eq!(image.y().abs(), 18.138, epsilon = 1e-2);
    let distortion = (image.y().abs() - paraxial) / paraxial;
    assert!(distortion < 0.0 && distortion > -0.01, "distortion {distortion}");
}

#[test]
fn test_axial_spherical_aberration_is_small() {
    let system = triplet();
    let field = &system.spec().fields.fields[0];
    let rays = system
        .sequential_trace()
        .trace_pupil_rays(&[Point2::new(0.0, 1.0), Point2::new(0.0, -1.0)], field, D_LINE);
    let upper = rays[0].back().unwrap().y();
    let lower = rays[1].back().unwrap().y();
    assert!(upper.abs() < 0.01);
    assert_abs_diff_eq!(upper, -lower, epsilon = 1e-9);
}

#[test]
fn test_vignetting_factors() {
    let system = triplet();
    let fields = &system.spec().fields.fields;

    assert_eq!(fields[0].vignetting, Default::default());

    let v14 = fields[1].vignetting;
    assert_abs_diff_eq!(v14.vuy, 0.1645, epsilon = 5e-3);
    assert_abs_diff_eq!(v14.vly, 0.1354, epsilon = 5e-3);
    assert_eq!(v14.vux, 0.0);
    assert_eq!(v14.vlx, 0.0);

    let v20 = fields[2].vignetting;
    assert_abs_diff_eq!(v20.vuy, 0.4105, epsilon = 5e-3);
    assert_abs_diff_eq!(v20.vly, 0.4196, epsilon = 5e-3);
    assert!(v20.vuy > v14.vuy && v20.vly > v14.vly);
}

#[test]
fn test_semi_diameters_follow_vignetted_beam() {
    let system = triplet();
    let asm = system.assembly();
    let s1 = asm.surface(1).unwrap().semi_diameter();
    let s6 = asm.surface(6).unwrap().semi_diameter();
    assert!(s1 > 6.99 && s1 <= 7.0 + 1e-6, "s1 {s1}");
    assert!(s6 > 5.49 && s6 <= 5.5 + 1e-6, "s6 {s6}");
    assert_abs_diff_eq!(asm.stop().semi_diameter(), 3.8611, epsilon = 1e-3);
}

#[test]
fn test_vignetted_rays_pass_with_aperture_check() {
    let mut system = triplet();
    let mut settings: SystemSettings = *system.settings();
    settings.trace.aperture_check = true;
    system.set_settings(settings).unwrap();

    let tracer = system.sequential_trace();
    for field in &system.spec().fields.fields {
        for ray in tracer.trace_reference_rays(field, D_LINE) {
            assert_eq!(ray.status(), RayStatus::Success, "pupil {:?}", ray.pupil());
        }
    }

    // Without the vignetting reduction the 20 degree upper rim is clipped.
    settings.trace.apply_vignetting = false;
    system.set_settings(settings).unwrap();
    let field = &system.spec().fields.fields[2];
    let ray = system
        .sequential_trace()
        .trace_pupil_ray(Point2::new(0.0, 1.0), field, D_LINE);
    assert_eq!(ray.status(), RayStatus::Blocked);
}

#[test]
fn test_field_astigmatism_is_small() {
    let system = triplet();
    let focus = system
        .sequential_trace()
        .trace_coddington(&system.spec().fields.fields[1], D_LINE)
        .unwrap();
    assert!(focus.sagittal.is_finite() && focus.tangential.is_finite());
    assert!(focus.astigmatism().abs() < 2.0);
}

#[test]
fn test_lens_data_table_lists_every_surface() {
    let system = triplet();
    let table = system.to_string();
    assert!(table.starts_with("Cooke triplet"));
    assert!(table.contains("4*"));
    assert_eq!(table.lines().count(), 2 + system.assembly().surface_count());
}
