use glam::DMat3;

/// Frobenius norm of a 3x3 matrix.
pub fn frobenius_norm(m: &DMat3) -> f64 {
    m.to_cols_array().iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Frobenius norm of `m^T * m - I`, zero for an orthogonal matrix.
pub fn orthogonality_error(m: &DMat3) -> f64 {
    frobenius_norm(&(m.transpose() * *m - DMat3::IDENTITY))
}

/// Check that `m` is a proper rotation: orthogonal with determinant +1.
///
/// # Arguments
///
/// * `m` - The matrix to check.
/// * `tolerance` - Allowed deviation for both the orthogonality error and the determinant.
pub fn is_proper_rotation(m: &DMat3, tolerance: f64) -> bool {
    orthogonality_error(m) < tolerance && (m.determinant() - 1.0).abs() < tolerance
}
