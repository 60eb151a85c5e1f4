use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::pointset::PointSet;

/// A rigid transform `x -> R * x + t` with a proper rotation `R`.
///
/// The transformation maps points from the source to the target frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Rotation matrix.
    pub rotation: DMat3,
    /// Translation vector.
    pub translation: DVec3,
}

impl RigidTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rotation: DMat3::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a transform from a rotation and a translation.
    pub fn new(rotation: DMat3, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Transform a single point.
    #[inline]
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }

    /// Transform every point of a set.
    pub fn apply_all(&self, points: &PointSet) -> PointSet {
        points.iter().map(|&p| self.apply(p)).collect::<Vec<_>>().into()
    }

    /// The inverse transform `x -> R^T * x - R^T * t`.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// Compose with another transform, applying `other` first.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Check that the rotation is orthogonal with determinant +1.
    pub fn is_proper_rotation(&self, tolerance: f64) -> bool {
        rigid_linalg::mat3::is_proper_rotation(&self.rotation, tolerance)
    }

    /// Split into the rotation and translation.
    pub fn into_parts(self) -> (DMat3, DVec3) {
        (self.rotation, self.translation)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
