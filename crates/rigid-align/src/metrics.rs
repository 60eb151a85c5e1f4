use glam::DMat3;

use crate::error::AlignmentError;
use crate::pointset::PointSet;
use crate::transform::RigidTransform;

/// Compute the sum of squared residuals `Σ ||b_i - (R * a_i + t)||²`.
///
/// # Arguments
///
/// * `source` - Source point set A.
/// * `target` - Target point set B.
/// * `transform` - The transform mapping A onto B.
///
/// # Errors
///
/// Returns [`AlignmentError::DimensionMismatch`] if the point sets differ in length.
pub fn sum_squared_residuals(
    source: &PointSet,
    target: &PointSet,
    transform: &RigidTransform,
) -> Result<f64, AlignmentError> {
    if source.len() != target.len() {
        return Err(AlignmentError::DimensionMismatch {
            source_len: source.len(),
            target_len: target.len(),
        });
    }

    Ok(source
        .iter()
        .zip(target.iter())
        .map(|(&a, &b)| (b - transform.apply(a)).length_squared())
        .sum())
}

/// Compute the root mean square of the residuals, zero for empty sets.
pub fn rmse(
    source: &PointSet,
    target: &PointSet,
    transform: &RigidTransform,
) -> Result<f64, AlignmentError> {
    let ssr = sum_squared_residuals(source, target, transform)?;
    if source.is_empty() {
        return Ok(0.0);
    }
    Ok((ssr / source.len() as f64).sqrt())
}

/// Geodesic distance in radians between two rotations, the angle of `r1^T * r2`.
pub fn rotation_angle_between(r1: &DMat3, r2: &DMat3) -> f64 {
    let delta = r1.transpose() * *r2;
    let trace = delta.x_axis.x + delta.y_axis.y + delta.z_axis.z;
    ((trace - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}
