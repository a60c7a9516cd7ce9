//! Rigid transformation between cluster pairs

use crate::correspondence::Correspondence;
use crate::point::FeaturePoint;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A directed rigid transformation from a source cluster to a target
/// cluster: a scalar distance plus one direction-cosine angle per axis
/// (degrees), along with the correspondences discovered when the
/// transformation was applied.
///
/// The angle vector doubles as a point in transformation-space, which is
/// what the group-consistency optimizer re-clusters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidTransformation {
    source_id: usize,
    target_id: usize,
    distance: f64,
    angles: DVector<f64>,
    correspondences: Vec<Correspondence>,
}

impl RigidTransformation {
    pub fn new(source_id: usize, target_id: usize, distance: f64, angles: Vec<f64>) -> Self {
        Self {
            source_id,
            target_id,
            distance,
            angles: DVector::from_vec(angles),
            correspondences: Vec::new(),
        }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn target_id(&self) -> usize {
        self.target_id
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Direction-cosine angles in degrees, one per axis
    pub fn angles(&self) -> &[f64] {
        self.angles.as_slice()
    }

    pub fn dimension(&self) -> usize {
        self.angles.len()
    }

    pub fn correspondences(&self) -> &[Correspondence] {
        &self.correspondences
    }

    pub fn set_correspondences(&mut self, correspondences: Vec<Correspondence>) {
        self.correspondences = correspondences;
    }

    /// Per-axis translation offset implied by the transformation:
    /// `distance * cos(angle_i)`.
    pub fn translation(&self) -> DVector<f64> {
        self.angles
            .map(|angle| self.distance * angle.to_radians().cos())
    }

    /// The angle vector viewed as a point in transformation-space
    pub fn angle_point(&self) -> FeaturePoint {
        FeaturePoint::from_slice(self.angles.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_translation_recovers_axis_offsets() {
        // distance 5 at 45 degrees to both axes of a 2D space
        let distance = 32.0_f64.sqrt();
        let t = RigidTransformation::new(0, 1, distance, vec![45.0, 45.0]);
        let offset = t.translation();
        assert_relative_eq!(offset[0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(offset[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angle_point_matches_angles() {
        let t = RigidTransformation::new(0, 1, 1.0, vec![90.0, 0.0]);
        assert_eq!(t.angle_point().features(), t.angles());
    }
}
