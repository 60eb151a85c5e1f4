//! Double precision 3×3 Singular Value Decomposition (SVD).
//!
//! For any matrix A ∈ ℝ³ˣ³ the SVD decomposes it into three matrices:
//!
//! ```text
//! A = U Σ Vᵀ
//! ```
//!
//! where:
//! * U ∈ ℝ³ˣ³ is an orthogonal matrix (left singular vectors)
//! * Σ ∈ ℝ³ˣ³ is a diagonal matrix of singular values (σ₁ ≥ σ₂ ≥ σ₃ ≥ 0)
//! * V ∈ ℝ³ˣ³ is an orthogonal matrix (right singular vectors)
//!
//! # Implementation Details
//!
//! The right singular vectors are found with one-sided Jacobi rotations that
//! orthogonalize the columns of A·V (implicitly diagonalizing AᵀA without forming it).
//! The left singular vectors come from a Givens QR decomposition of A·V, which
//! stays well defined when A is rank deficient.
//!
//! # Example
//!
//! ```
//! use glam::{DMat3, DVec3};
//! use rigid_linalg::svd::svd3;
//!
//! let matrix = DMat3::from_diagonal(DVec3::new(1.0, 2.0, 3.0));
//!
//! let svd_result = svd3(&matrix).unwrap();
//! assert!((svd_result.s().x - 3.0).abs() < 1e-12);
//! assert!(matrix.abs_diff_eq(svd_result.reconstruct(), 1e-12));
//! ```
//!
//! # References
//!
//! * McAdams, Selle, Tamstorf, Teran, and Sifakis (2011).
//!   "Computing the Singular Value Decomposition of 3x3 matrices with minimal
//!   branching and elementary floating point operations."
//!   University of Wisconsin-Madison Technical Report TR1690.
//! * Golub and Van Loan, "Matrix Computations", section 8.5 (Jacobi methods).

use glam::{DMat3, DVec3};
use thiserror::Error;

/// Maximum number of cyclic Jacobi sweeps before giving up.
///
/// Cyclic Jacobi converges quadratically, a 3x3 matrix needs a handful of sweeps.
pub const MAX_SWEEPS: usize = 64;

/// Error type for the SVD.
#[derive(Debug, Error, PartialEq)]
pub enum SvdError {
    /// The Jacobi orthogonalization did not converge.
    #[error("Jacobi orthogonalization did not converge after {sweeps} sweeps")]
    NoConvergence {
        /// Number of sweeps performed.
        sweeps: usize,
    },

    /// The input matrix contains NaN or infinite values.
    #[error("Input matrix contains non-finite values")]
    NonFinite,
}

/// Result of the 3×3 SVD `A = U * diag(s) * V^T`.
#[derive(Debug, Clone, Copy)]
pub struct Svd3 {
    /// The matrix of left singular vectors.
    u: DMat3,

    /// The singular values in descending order.
    s: DVec3,

    /// The matrix of right singular vectors.
    v: DMat3,
}

impl Svd3 {
    /// Get the left singular vectors matrix.
    #[inline]
    pub fn u(&self) -> &DMat3 {
        &self.u
    }

    /// Get the singular values, sorted in descending order.
    #[inline]
    pub fn s(&self) -> &DVec3 {
        &self.s
    }

    /// Get the singular values as a diagonal matrix.
    #[inline]
    pub fn s_mat(&self) -> DMat3 {
        DMat3::from_diagonal(self.s)
    }

    /// Get the right singular vectors matrix.
    #[inline]
    pub fn v(&self) -> &DMat3 {
        &self.v
    }

    /// Rebuild the decomposed matrix as `U * S * V^T`.
    pub fn reconstruct(&self) -> DMat3 {
        self.u * self.s_mat() * self.v.transpose()
    }

    /// Numerical rank: the number of singular values above `tolerance * σ₁`.
    pub fn rank(&self, tolerance: f64) -> usize {
        let threshold = tolerance * self.s.x;
        [self.s.x, self.s.y, self.s.z]
            .iter()
            .filter(|&&sigma| sigma > threshold && sigma > 0.0)
            .count()
    }
}

/// Orthogonality tolerance between two columns, relative to their norms.
const ORTHOGONALITY_TOLERANCE: f64 = 16.0 * f64::EPSILON;

/// Rotates columns `p` and `q` of `w` until they are orthogonal, accumulating the rotation into `v`.
///
/// Returns `false` if the columns were already orthogonal.
#[inline(always)]
fn jacobi_rotate(w: &mut [DVec3; 3], v: &mut [DVec3; 3], p: usize, q: usize) -> bool {
    let alpha = w[p].length_squared();
    let beta = w[q].length_squared();
    let gamma = w[p].dot(w[q]);

    if gamma.abs() <= ORTHOGONALITY_TOLERANCE * alpha.sqrt() * beta.sqrt() {
        return false;
    }

    // tangent of the rotation angle, smaller root of t² + 2ζt - 1 = 0
    let zeta = (beta - alpha) / (2.0 * gamma);
    let t = if zeta.abs() > 1e150 {
        0.5 / zeta
    } else {
        zeta.signum() / (zeta.abs() + (zeta * zeta + 1.0).sqrt())
    };
    let cos_theta = 1.0 / (t * t + 1.0).sqrt();
    let sin_theta = t * cos_theta;

    let (w_p, w_q) = (w[p], w[q]);
    w[p] = w_p * cos_theta - w_q * sin_theta;
    w[q] = w_p * sin_theta + w_q * cos_theta;

    let (v_p, v_q) = (v[p], v[q]);
    v[p] = v_p * cos_theta - v_q * sin_theta;
    v[q] = v_p * sin_theta + v_q * cos_theta;

    true
}

/// One-sided (Hestenes) Jacobi: finds a rotation `V` such that the columns of `A * V` are
/// mutually orthogonal.
///
/// Working on the columns of A directly, instead of forming AᵀA, keeps small
/// singular values accurate relative to the large ones.
///
/// Returns `(A * V, V)`.
fn jacobi_orthogonalize(a: &DMat3) -> Result<(DMat3, DMat3), SvdError> {
    let mut w = [a.x_axis, a.y_axis, a.z_axis];
    let mut v = [DVec3::X, DVec3::Y, DVec3::Z];

    for _sweep in 0..MAX_SWEEPS {
        let mut rotated = jacobi_rotate(&mut w, &mut v, 0, 1);
        rotated |= jacobi_rotate(&mut w, &mut v, 0, 2);
        rotated |= jacobi_rotate(&mut w, &mut v, 1, 2);

        if !rotated {
            return Ok((
                DMat3::from_cols(w[0], w[1], w[2]),
                DMat3::from_cols(v[0], v[1], v[2]),
            ));
        }
    }

    Err(SvdError::NoConvergence {
        sweeps: MAX_SWEEPS,
    })
}

/// Sorts the singular values in descending order and adjusts the corresponding singular vectors accordingly
///
/// A swapped column is negated so that `det(v)` keeps its sign and `a * v == b` still holds.
pub fn sort_singular_values(b: &mut DMat3, v: &mut DMat3) {
    let mut b_cols = [b.x_axis, b.y_axis, b.z_axis];
    let mut v_cols = [v.x_axis, v.y_axis, v.z_axis];
    let mut rho = b_cols.map(|c| c.length_squared());

    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        if rho[i] < rho[j] {
            rho.swap(i, j);
            b_cols.swap(i, j);
            v_cols.swap(i, j);
            b_cols[j] = -b_cols[j];
            v_cols[j] = -v_cols[j];
        }
    }

    *b = DMat3::from_cols(b_cols[0], b_cols[1], b_cols[2]);
    *v = DMat3::from_cols(v_cols[0], v_cols[1], v_cols[2]);
}

/// Cosine and sine of a Givens rotation.
#[derive(Debug)]
struct Givens {
    /// The cosine of the angle in the Givens rotation.
    cos_theta: f64,

    /// The sine of the angle in the Givens rotation.
    sin_theta: f64,
}

/// Rotation that maps `(a1, a2)` onto `(ρ, 0)` with `ρ = |(a1, a2)|`.
#[inline(always)]
fn qr_givens(a1: f64, a2: f64) -> Givens {
    let rho = a1.hypot(a2);
    if rho == 0.0 {
        return Givens {
            cos_theta: 1.0,
            sin_theta: 0.0,
        };
    }
    Givens {
        cos_theta: a1 / rho,
        sin_theta: a2 / rho,
    }
}

/// Left-multiplies `m` by the transposed Givens rotation acting on rows `p` and `q`.
#[inline(always)]
fn apply_givens_rows(m: &mut DMat3, g: &Givens, p: usize, q: usize) {
    for c in 0..3 {
        let col = m.col_mut(c);
        let c_p = col[p];
        let c_q = col[q];
        col[p] = g.cos_theta * c_p + g.sin_theta * c_q;
        col[q] = -g.sin_theta * c_p + g.cos_theta * c_q;
    }
}

/// Factors of `A = Q * R`.
#[derive(Debug)]
struct QR3 {
    /// The orthogonal matrix Q from the QR decomposition.
    q: DMat3,

    /// The upper triangular matrix R from the QR decomposition.
    r: DMat3,
}

/// QR decomposition with three Givens rotations, `Q` is orthogonal even for rank deficient input.
fn qr_decomposition(mut r: DMat3) -> QR3 {
    // accumulates Q^T = G3^T * G2^T * G1^T
    let mut q_t = DMat3::IDENTITY;

    // zero out r[1][0]
    let g1 = qr_givens(r.x_axis.x, r.x_axis.y);
    apply_givens_rows(&mut r, &g1, 0, 1);
    apply_givens_rows(&mut q_t, &g1, 0, 1);

    // zero out r[2][0]
    let g2 = qr_givens(r.x_axis.x, r.x_axis.z);
    apply_givens_rows(&mut r, &g2, 0, 2);
    apply_givens_rows(&mut q_t, &g2, 0, 2);

    // zero out r[2][1]
    let g3 = qr_givens(r.y_axis.y, r.y_axis.z);
    apply_givens_rows(&mut r, &g3, 1, 2);
    apply_givens_rows(&mut q_t, &g3, 1, 2);

    QR3 {
        q: q_t.transpose(),
        r,
    }
}

/// Computes the singular value decomposition of a 3x3 matrix.
///
/// # Arguments
///
/// * `a` - The matrix to decompose.
///
/// # Returns
///
/// The decomposition with singular values sorted in descending order.
///
/// # Errors
///
/// Returns [`SvdError::NonFinite`] for NaN/infinite input and
/// [`SvdError::NoConvergence`] if the Jacobi sweeps fail to converge.
pub fn svd3(a: &DMat3) -> Result<Svd3, SvdError> {
    if !a.is_finite() {
        return Err(SvdError::NonFinite);
    }

    // V are the right singular vectors, B = A * V has orthogonal columns with norms σᵢ
    let (mut b, mut v) = jacobi_orthogonalize(a)?;

    sort_singular_values(&mut b, &mut v);

    let qr = qr_decomposition(b);

    let mut u = qr.q;
    let diag = DVec3::new(qr.r.x_axis.x, qr.r.y_axis.y, qr.r.z_axis.z);

    if diag.x < 0.0 {
        u.x_axis = -u.x_axis;
    }
    if diag.y < 0.0 {
        u.y_axis = -u.y_axis;
    }
    if diag.z < 0.0 {
        u.z_axis = -u.z_axis;
    }

    Ok(Svd3 {
        u,
        s: diag.abs(),
        v,
    })
}
