//! Vector refraction.

use refract_math::Vec3;

/// Refract unit direction `d_in` at a surface with unit normal `normal`.
///
/// ```text
/// cos I  = d . N
/// alpha  = sqrt(n_out^2 - n_in^2 (1 - cos^2 I)) sgn(cos I) - n_in cos I
/// d_out  = (n_in d + alpha N) / n_out
/// ```
///
/// Returns `None` on total internal reflection.
pub fn bend(d_in: &Vec3, normal: &Vec3, n_in: f64, n_out: f64) -> Option<Vec3> {
    let cos_i = d_in.dot(normal);
    let radicand = n_out * n_out - n_in * n_in * (1.0 - cos_i * cos_i);
    if radicand < 0.0 {
        return None;
    }
    let alpha = radicand.sqrt() * sign(cos_i) - n_in * cos_i;
    Some((n_in * d_in + alpha * normal) / n_out)
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
