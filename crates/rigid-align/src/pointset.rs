use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// An ordered set of 3D points.
///
/// Two point sets used together correspond positionally: point `i` of the
/// source and point `i` of the target are the same physical point seen from
/// two coordinate frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<DVec3>,
}

impl PointSet {
    /// Create a point set taking ownership of the points.
    pub fn new(points: Vec<DVec3>) -> Self {
        Self { points }
    }

    /// Create a point set from a slice of `[x, y, z]` arrays.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self {
            points: points.iter().map(|p| DVec3::from_array(*p)).collect(),
        }
    }

    /// Create a point set from a 3xN matrix given as one row per coordinate.
    ///
    /// # Arguments
    ///
    /// * `x` - The x coordinates of the points.
    /// * `y` - The y coordinates of the points.
    /// * `z` - The z coordinates of the points.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::MalformedPointSet`] if the rows differ in length.
    ///
    /// Example:
    ///
    /// ```
    /// use rigid_align::PointSet;
    ///
    /// let points = PointSet::from_rows(&[0.0, 1.0], &[2.0, 3.0], &[4.0, 5.0]).unwrap();
    /// assert_eq!(points.len(), 2);
    /// assert_eq!(points.points()[1].to_array(), [1.0, 3.0, 5.0]);
    /// ```
    pub fn from_rows(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self, AlignmentError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(AlignmentError::MalformedPointSet {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }

        let points = x
            .iter()
            .zip(y.iter())
            .zip(z.iter())
            .map(|((&x, &y), &z)| DVec3::new(x, y, z))
            .collect();

        Ok(Self { points })
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get the points as a slice.
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, DVec3> {
        self.points.iter()
    }

    /// Arithmetic mean of the points, `None` for an empty set.
    pub fn centroid(&self) -> Option<DVec3> {
        (!self.is_empty()).then(|| compute_centroid(&self.points))
    }

    /// The points with the centroid subtracted.
    pub fn demeaned(&self) -> Vec<DVec3> {
        if self.is_empty() {
            return Vec::new();
        }
        demean_points(&self.points).1
    }

    /// The points as a 3xN matrix, one row per coordinate.
    pub fn to_rows(&self) -> [Vec<f64>; 3] {
        [
            self.points.iter().map(|p| p.x).collect(),
            self.points.iter().map(|p| p.y).collect(),
            self.points.iter().map(|p| p.z).collect(),
        ]
    }
}

impl From<Vec<DVec3>> for PointSet {
    fn from(points: Vec<DVec3>) -> Self {
        Self::new(points)
    }
}

impl AsRef<[DVec3]> for PointSet {
    fn as_ref(&self) -> &[DVec3] {
        &self.points
    }
}

/// Compute the centroid of a set of points.
///
/// PRECONDITION: `points` is not empty.
pub fn compute_centroid(points: &[DVec3]) -> DVec3 {
    points.iter().fold(DVec3::ZERO, |acc, &p| acc + p) / points.len() as f64
}

/// Compute the centroid of a set of points and the points relative to it.
///
/// PRECONDITION: `points` is not empty.
pub fn demean_points(points: &[DVec3]) -> (DVec3, Vec<DVec3>) {
    let centroid = compute_centroid(points);
    let demeaned = points.iter().map(|&p| p - centroid).collect();
    (centroid, demeaned)
}
