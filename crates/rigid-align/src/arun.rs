//! Least-squares rigid alignment of two corresponding point sets.
//!
//! Given source points `a_i` and target points `b_i` with `b_i ≈ R * a_i + t`,
//! finds the proper rotation `R` and translation `t` minimizing
//! `Σ ||b_i - (R * a_i + t)||²`.
//!
//! The algorithm:
//! 1. Compute centroids of both point sets
//! 2. Center both point sets by subtracting their respective centroids
//! 3. Compute the cross-covariance matrix H = Σ[(a - a_mean) * (b - b_mean)^T]
//! 4. Compute the SVD of H = U * S * V^T
//! 5. Build the correction d = diag(1, 1, det(V) * det(U^T)), which flips the last
//!    singular vector when V * U^T would be a reflection
//! 6. Calculate rotation matrix R = V * d * U^T
//! 7. Calculate translation vector t = b_mean - R * a_mean
//!
//! For more details, see: Arun, K., Huang, T. S., and Blostein, S. D.
//! "Least-squares fitting of two 3-D point sets." IEEE PAMI, 1987.

use glam::{DMat3, DVec3};
use rigid_linalg::svd::svd3;
use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;
use crate::pointset::{demean_points, PointSet};
use crate::transform::RigidTransform;

/// Minimum number of correspondences for a well-posed problem.
pub const MIN_POINTS: usize = 3;

/// Largest distance to the centroid, relative to the largest coordinate norm,
/// below which the points of a set are considered coincident.
///
/// Demeaning loses the digits shared by all points, so the spread is only
/// meaningful above the rounding error of the raw coordinates.
const COINCIDENT_TOLERANCE: f64 = 1024.0 * f64::EPSILON;

/// Structure to define the solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArunParams {
    /// Ratio `σ₂ / σ₁` of the cross-covariance singular values below which the
    /// points are considered collinear and the rotation undetermined.
    pub degeneracy_tolerance: f64,
}

impl Default for ArunParams {
    fn default() -> Self {
        Self {
            degeneracy_tolerance: 1e-10,
        }
    }
}

/// Compute the cross-covariance matrix `H = Σ a_i * b_i^T` of two demeaned point sets.
///
/// PRECONDITION: both slices have the same length.
pub fn cross_covariance(src_demeaned: &[DVec3], dst_demeaned: &[DVec3]) -> DMat3 {
    src_demeaned
        .iter()
        .zip(dst_demeaned.iter())
        .fold(DMat3::ZERO, |h, (&a, &b)| {
            h + DMat3::from_cols(a * b.x, a * b.y, a * b.z)
        })
}

/// Estimate the rigid transform aligning `source` to `target` with default parameters.
///
/// See [`solve_with_params`].
///
/// Example:
///
/// ```
/// use rigid_align::{solve, DMat3, DVec3, PointSet, RigidTransform};
///
/// let source = PointSet::from_points(&[
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ]);
/// let expected = RigidTransform::new(DMat3::from_rotation_z(0.5), DVec3::new(1.0, 2.0, 3.0));
/// let target = expected.apply_all(&source);
///
/// let estimated = solve(&source, &target).unwrap();
/// assert!(estimated.rotation.abs_diff_eq(expected.rotation, 1e-9));
/// assert!(estimated.translation.abs_diff_eq(expected.translation, 1e-9));
/// ```
pub fn solve(source: &PointSet, target: &PointSet) -> Result<RigidTransform, AlignmentError> {
    solve_with_params(source, target, &ArunParams::default())
}

/// Estimate the rigid transform aligning `source` to `target`.
///
/// # Arguments
///
/// * `source` - Source point set A.
/// * `target` - Target point set B, point `i` corresponds to point `i` of `source`.
/// * `params` - Solver parameters.
///
/// # Returns
///
/// The transform `(R, t)` minimizing the sum of squared residuals `Σ ||b_i - (R * a_i + t)||²`
/// over proper rotations.
///
/// # Errors
///
/// * [`AlignmentError::DimensionMismatch`] if the point sets differ in length.
/// * [`AlignmentError::DegenerateInput`] for fewer than 3 points, or coincident or collinear points.
/// * [`AlignmentError::NonFiniteInput`] if a coordinate is NaN or infinite.
/// * [`AlignmentError::Svd`] if the decomposition fails.
pub fn solve_with_params(
    source: &PointSet,
    target: &PointSet,
    params: &ArunParams,
) -> Result<RigidTransform, AlignmentError> {
    solve_points(source.points(), target.points(), params)
}

/// Slice version of [`solve_with_params`].
pub fn solve_points(
    points_src: &[DVec3],
    points_dst: &[DVec3],
    params: &ArunParams,
) -> Result<RigidTransform, AlignmentError> {
    if points_src.len() != points_dst.len() {
        return Err(AlignmentError::DimensionMismatch {
            source_len: points_src.len(),
            target_len: points_dst.len(),
        });
    }

    let num_points = points_src.len();
    if num_points < MIN_POINTS {
        return Err(AlignmentError::DegenerateInput(format!(
            "need at least {MIN_POINTS} points, got {num_points}"
        )));
    }

    if !points_src.iter().chain(points_dst.iter()).all(|p| p.is_finite()) {
        return Err(AlignmentError::NonFiniteInput);
    }

    // centroids and vectors from the centroids
    let (src_centroid, src_demeaned) = demean_points(points_src);
    let (dst_centroid, dst_demeaned) = demean_points(points_dst);

    if is_coincident(points_src, &src_demeaned) || is_coincident(points_dst, &dst_demeaned) {
        log::warn!("Arun alignment: points are coincident, rotation is undetermined");
        return Err(AlignmentError::DegenerateInput(
            "points are coincident".to_string(),
        ));
    }

    let h = cross_covariance(&src_demeaned, &dst_demeaned);

    let svd = svd3(&h)?;
    let (u, s, v) = (*svd.u(), *svd.s(), *svd.v());

    log::debug!(
        "Arun alignment: {} correspondences, singular values {:?}",
        num_points,
        s
    );

    if s.y <= params.degeneracy_tolerance * s.x {
        log::warn!(
            "Arun alignment: points are collinear (sigma2 / sigma1 = {:e}), rotation is undetermined",
            s.y / s.x
        );
        return Err(AlignmentError::DegenerateInput(
            "points are collinear".to_string(),
        ));
    }

    // force a proper rotation, det(V) * det(U^T) is -1 when V * U^T is a reflection
    let d = v.determinant() * u.transpose().determinant();
    let sign = if d < 0.0 { -1.0 } else { 1.0 };
    let correction = DMat3::from_diagonal(DVec3::new(1.0, 1.0, sign));

    let rotation = v * correction * u.transpose();
    let translation = dst_centroid - rotation * src_centroid;

    Ok(RigidTransform {
        rotation,
        translation,
    })
}

fn max_norm(points: &[DVec3]) -> f64 {
    points.iter().map(|p| p.length()).fold(0.0, f64::max)
}

/// Check if every point sits on the centroid up to the rounding of the coordinates.
fn is_coincident(points: &[DVec3], demeaned: &[DVec3]) -> bool {
    max_norm(demeaned) <= COINCIDENT_TOLERANCE * max_norm(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::axis_angle_to_rotation_matrix;

    fn unit_points() -> PointSet {
        PointSet::from_points(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ])
    }

    #[test]
    fn test_cross_covariance_outer_product() {
        let a = [DVec3::new(1.0, 2.0, 3.0)];
        let b = [DVec3::new(4.0, 5.0, 6.0)];
        let h = cross_covariance(&a, &b);
        // H[r][c] = a[r] * b[c]
        assert_eq!(h.row(0), DVec3::new(4.0, 5.0, 6.0));
        assert_eq!(h.row(1), DVec3::new(8.0, 10.0, 12.0));
        assert_eq!(h.row(2), DVec3::new(12.0, 15.0, 18.0));
    }

    #[test]
    fn test_identity_transformation() -> Result<(), AlignmentError> {
        let points_src = unit_points();
        let points_dst = points_src.clone();

        let transform = solve(&points_src, &points_dst)?;

        assert!(
            transform.rotation.abs_diff_eq(DMat3::IDENTITY, 1e-9),
            "Expected identity rotation, got: {:?}",
            transform.rotation
        );
        assert!(
            transform.translation.abs_diff_eq(DVec3::ZERO, 1e-9),
            "Expected zero translation, got: {:?}",
            transform.translation
        );
        Ok(())
    }

    #[test]
    fn test_pure_rotation() -> Result<(), AlignmentError> {
        // Rotate 90° around X axis: y -> z, z -> -y
        let points_src = unit_points();
        let points_dst = PointSet::from_points(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, -1.0, 0.0],
        ]);

        let transform = solve(&points_src, &points_dst)?;

        let expected_r = axis_angle_to_rotation_matrix(DVec3::X, std::f64::consts::FRAC_PI_2)?;
        assert!(
            transform.rotation.abs_diff_eq(expected_r, 1e-9),
            "Expected rotation:\n{:?}\nGot:\n{:?}",
            expected_r,
            transform.rotation
        );
        assert!(transform.translation.abs_diff_eq(DVec3::ZERO, 1e-9));
        Ok(())
    }

    #[test]
    fn test_translation() -> Result<(), AlignmentError> {
        let translation = DVec3::new(5.0, -3.0, 2.0);
        let points_src = unit_points();
        let points_dst =
            RigidTransform::new(DMat3::IDENTITY, translation).apply_all(&points_src);

        let transform = solve(&points_src, &points_dst)?;

        assert!(transform.rotation.abs_diff_eq(DMat3::IDENTITY, 1e-9));
        assert!(
            transform.translation.abs_diff_eq(translation, 1e-9),
            "Expected translation {:?}, got: {:?}",
            translation,
            transform.translation
        );
        Ok(())
    }

    #[test]
    fn test_coplanar_square_z90() -> Result<(), AlignmentError> {
        // square in the XY plane, z = 0
        let points_src = PointSet::from_points(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]);
        let expected = RigidTransform::new(
            DMat3::from_rotation_z(std::f64::consts::FRAC_PI_2),
            DVec3::new(0.5, -0.3, 2.0),
        );
        let points_dst = expected.apply_all(&points_src);

        let transform = solve(&points_src, &points_dst)?;

        assert!(transform.rotation.abs_diff_eq(expected.rotation, 1e-9));
        assert!(transform.translation.abs_diff_eq(expected.translation, 1e-9));
        assert!(transform.is_proper_rotation(1e-9));
        Ok(())
    }

    #[test]
    fn test_reflected_target_gives_proper_rotation() -> Result<(), AlignmentError> {
        let points_src = PointSet::from_points(&[
            [1.0, 0.2, 0.1],
            [-0.5, 2.0, 0.3],
            [0.3, -1.0, 1.5],
            [2.0, 1.0, -1.0],
            [-1.0, -0.7, -0.4],
        ]);
        // mirror image through the XY plane, no proper rotation maps A onto B exactly
        let mirror = DMat3::from_diagonal(DVec3::new(1.0, 1.0, -1.0));
        let points_dst = RigidTransform::new(mirror, DVec3::ZERO).apply_all(&points_src);

        let transform = solve(&points_src, &points_dst)?;

        assert!(transform.is_proper_rotation(1e-9));
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() {
        let points_src = PointSet::new(vec![DVec3::X; 5]);
        let points_dst = PointSet::new(vec![DVec3::Y; 6]);
        assert_eq!(
            solve(&points_src, &points_dst),
            Err(AlignmentError::DimensionMismatch {
                source_len: 5,
                target_len: 6
            })
        );
    }

    #[test]
    fn test_too_few_points() {
        let points = PointSet::from_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        assert!(matches!(
            solve(&points, &points),
            Err(AlignmentError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_coincident_points() {
        let at_origin = PointSet::new(vec![DVec3::ZERO; 5]);
        assert!(matches!(
            solve(&at_origin, &at_origin),
            Err(AlignmentError::DegenerateInput(_))
        ));

        let repeated = PointSet::new(vec![DVec3::new(0.1, 0.2, 0.3); 7]);
        let target = unit_points();
        let target = PointSet::new(
            target
                .iter()
                .chain(target.iter())
                .take(7)
                .copied()
                .collect(),
        );
        assert!(matches!(
            solve(&repeated, &target),
            Err(AlignmentError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_small_box_far_from_origin() -> Result<(), AlignmentError> {
        let offset = DVec3::new(5e5, 5e6, 100.0);
        let points_src = PointSet::new(
            unit_points()
                .iter()
                .map(|&p| p * DVec3::new(0.5, 0.4, 0.3) + offset)
                .collect(),
        );
        let expected = RigidTransform::new(DMat3::from_rotation_z(0.2), DVec3::new(1.0, 2.0, 3.0));
        let points_dst = expected.apply_all(&points_src);

        let transform = solve(&points_src, &points_dst)?;

        assert!(transform.rotation.abs_diff_eq(expected.rotation, 1e-6));
        assert!(transform.is_proper_rotation(1e-9));
        Ok(())
    }

    #[test]
    fn test_coincident_points_far_from_origin() {
        let points_src = PointSet::new(vec![DVec3::new(5e5, 5e6, 100.0); 8]);
        let points_dst = PointSet::new(vec![DVec3::new(-3e4, 2e6, 7.5); 8]);
        assert!(matches!(
            solve(&points_src, &points_dst),
            Err(AlignmentError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_collinear_points() {
        let points_src = PointSet::new(
            (0..6)
                .map(|i| DVec3::new(1.0, 2.0, -1.0) * i as f64)
                .collect(),
        );
        let transform = RigidTransform::new(DMat3::from_rotation_y(0.4), DVec3::ONE);
        let points_dst = transform.apply_all(&points_src);
        assert!(matches!(
            solve(&points_src, &points_dst),
            Err(AlignmentError::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_non_finite_points() {
        let mut points = unit_points().points().to_vec();
        let points_src = PointSet::new(points.clone());
        points[2].x = f64::NAN;
        assert_eq!(
            solve(&points_src, &PointSet::new(points)),
            Err(AlignmentError::NonFiniteInput)
        );
    }

    #[test]
    fn test_params_from_json() -> Result<(), Box<dyn std::error::Error>> {
        let params: ArunParams = serde_json::from_str(r#"{"degeneracy_tolerance": 1e-6}"#)?;
        assert_eq!(params.degeneracy_tolerance, 1e-6);

        let params: ArunParams = serde_json::from_str("{}")?;
        assert_eq!(params, ArunParams::default());
        Ok(())
    }
}
