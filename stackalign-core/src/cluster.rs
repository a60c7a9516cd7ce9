//! Density cluster representation

use crate::point::FeaturePoint;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A cluster of feature points produced by a clustering run.
///
/// The point collection is ordered and never mutated after construction.
/// Clusters are distinguished by identity (id), not content: identical point
/// sets can legitimately arise from different clustering runs, so two
/// clusters compare equal only when their ids match. Ids are unique within a
/// single clustering run but not stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    id: usize,
    points: Vec<FeaturePoint>,
}

impl Cluster {
    pub fn new(id: usize, points: Vec<FeaturePoint>) -> Self {
        Self { id, points }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn points(&self) -> &[FeaturePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Feature dimensionality of the cluster's points (0 when empty)
    pub fn dimension(&self) -> usize {
        self.points.first().map_or(0, FeaturePoint::dimension)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeaturePoint> {
        self.points.iter()
    }

    /// Coordinate-wise arithmetic mean of the cluster's points.
    ///
    /// `None` for an empty cluster.
    pub fn centroid(&self) -> Option<FeaturePoint> {
        let first = self.points.first()?;
        let mut sum = DVector::zeros(first.dimension());
        for point in &self.points {
            sum += point.coords();
        }
        sum /= self.points.len() as f64;
        Some(FeaturePoint::new(sum.as_slice().to_vec()))
    }
}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cluster {}

impl<'a> IntoIterator for &'a Cluster {
    type Item = &'a FeaturePoint;
    type IntoIter = std::slice::Iter<'a, FeaturePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid() {
        let cluster = Cluster::new(
            0,
            vec![
                FeaturePoint::new(vec![0.0, 0.0]),
                FeaturePoint::new(vec![10.0, 10.0]),
            ],
        );
        let centroid = cluster.centroid().unwrap();
        assert_relative_eq!(centroid.features()[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(centroid.features()[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_centroid() {
        let cluster = Cluster::new(0, vec![]);
        assert!(cluster.centroid().is_none());
    }

    #[test]
    fn test_identity_equality() {
        let points = vec![FeaturePoint::new(vec![1.0])];
        let a = Cluster::new(0, points.clone());
        let b = Cluster::new(1, points);
        assert_ne!(a, b);
        assert_eq!(a, Cluster::new(0, vec![]));
    }
}
