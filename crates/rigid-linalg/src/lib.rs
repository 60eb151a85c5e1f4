#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Helpers to inspect 3x3 matrices (orthogonality, properness).
pub mod mat3;

/// Module to calculate SVD of a 3x3 matrix
pub mod svd;
