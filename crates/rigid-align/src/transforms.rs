use glam::{DMat3, DQuat, DVec3};
use rand::Rng;

use crate::error::AlignmentError;

/// Compute the rotation matrix from an axis and angle.
///
/// # Arguments
///
/// * `axis` - The axis of rotation, normalized internally.
/// * `angle` - The angle of rotation in radians.
///
/// # Returns
///
/// The rotation matrix.
///
/// Example:
///
/// ```
/// use rigid_align::transforms::axis_angle_to_rotation_matrix;
/// use rigid_align::{DMat3, DVec3};
///
/// let rotation = axis_angle_to_rotation_matrix(DVec3::X, std::f64::consts::FRAC_PI_2).unwrap();
/// assert!(rotation.abs_diff_eq(DMat3::from_rotation_x(std::f64::consts::FRAC_PI_2), 1e-12));
/// ```
pub fn axis_angle_to_rotation_matrix(axis: DVec3, angle: f64) -> Result<DMat3, AlignmentError> {
    // normalize the vector
    let magnitude = axis.length();
    if !magnitude.is_finite() || magnitude < 1e-10 {
        return Err(AlignmentError::ZeroAxis);
    }
    Ok(DMat3::from_axis_angle(axis / magnitude, angle))
}

/// Sample a rotation uniformly over SO(3).
///
/// Draws a uniformly distributed unit quaternion (Shoemake's method).
pub fn random_rotation<R: Rng>(rng: &mut R) -> DMat3 {
    let r1: f64 = rng.random();
    let r2: f64 = rng.random();
    let r3: f64 = rng.random();

    let w = (1.0 - r1).sqrt() * (2.0 * std::f64::consts::PI * r2).sin();
    let x = (1.0 - r1).sqrt() * (2.0 * std::f64::consts::PI * r2).cos();
    let y = r1.sqrt() * (2.0 * std::f64::consts::PI * r3).sin();
    let z = r1.sqrt() * (2.0 * std::f64::consts::PI * r3).cos();

    DMat3::from_quat(DQuat::from_xyzw(x, y, z, w).normalize())
}

/// Sample a translation with each component uniform in `[0, scale)`.
pub fn random_translation<R: Rng>(rng: &mut R, scale: f64) -> DVec3 {
    DVec3::new(
        rng.random::<f64>() * scale,
        rng.random::<f64>() * scale,
        rng.random::<f64>() * scale,
    )
}
