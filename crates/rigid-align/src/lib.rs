#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Closed-form rigid alignment solver (Arun's method).
pub mod arun;

/// Error types for the alignment operations.
pub mod error;

/// Residual and rotation error metrics.
pub mod metrics;

/// Point set container.
pub mod pointset;

/// Rigid transform type returned by the solver.
pub mod transform;

/// 3D transforms utilities: axis-angle rotations and random sampling.
pub mod transforms;

pub use arun::{solve, solve_with_params, ArunParams};
pub use error::AlignmentError;
pub use pointset::PointSet;
pub use transform::RigidTransform;

// Re-export glam types that are used directly
pub use glam::{DMat3, DVec3};
