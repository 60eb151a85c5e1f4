use rigid_linalg::svd::SvdError;
use thiserror::Error;

/// Error type for the rigid alignment operations.
#[derive(Debug, Error, PartialEq)]
pub enum AlignmentError {
    /// Source and target point sets must have the same number of points.
    #[error("Point sets must have the same length, got {source_len} and {target_len}")]
    DimensionMismatch {
        /// Number of points in the source set.
        source_len: usize,
        /// Number of points in the target set.
        target_len: usize,
    },

    /// The rotation is not uniquely determined by the input points.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A point coordinate is NaN or infinite.
    #[error("Point coordinates must be finite")]
    NonFiniteInput,

    /// The coordinate rows of a 3xN point set have different lengths.
    #[error("Coordinate rows must have the same length, got x: {x}, y: {y}, z: {z}")]
    MalformedPointSet {
        /// Length of the x row.
        x: usize,
        /// Length of the y row.
        y: usize,
        /// Length of the z row.
        z: usize,
    },

    /// A rotation axis must not be the zero vector.
    #[error("Cannot compute rotation matrix from a zero axis")]
    ZeroAxis,

    /// The singular value decomposition failed.
    #[error(transparent)]
    Svd(#[from] SvdError),
}
