//! Nearest neighbor search implementations

use kdtree::distance::squared_euclidean;
use stackalign_core::{Error, FeaturePoint, NearestNeighborSearch, NeighborStrategy, Result};

/// Build the nearest-neighbor index selected by `strategy`.
///
/// `max_distance` prunes results beyond the cutoff; pass
/// `f64::INFINITY` for an unbounded scan.
pub fn create_search(
    strategy: NeighborStrategy,
    max_distance: f64,
) -> Box<dyn NearestNeighborSearch> {
    match strategy {
        NeighborStrategy::BruteForce => Box::new(BruteForceSearch::new(max_distance)),
        NeighborStrategy::KdTree => Box::new(KdTreeSearch::new(max_distance)),
    }
}

/// Exhaustive nearest-neighbor scan.
///
/// Distances are computed to every reference point and grouped by exact
/// distance value, so exactly-equidistant points stay together; groups are
/// emitted in ascending distance order (ties inside a group by reference
/// index) until `k` results have accumulated. The scan stops early as soon
/// as a group's distance exceeds `max_distance`.
pub struct BruteForceSearch {
    reference: Option<Vec<FeaturePoint>>,
    max_distance: f64,
}

impl BruteForceSearch {
    pub fn new(max_distance: f64) -> Self {
        Self {
            reference: None,
            max_distance,
        }
    }

    /// A scan with no distance cutoff
    pub fn unbounded() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn build(&mut self, reference: &[FeaturePoint]) -> Result<()> {
        if reference.is_empty() {
            return Err(Error::InvalidParameters(
                "reference point set is empty".to_string(),
            ));
        }
        self.reference = Some(reference.to_vec());
        Ok(())
    }

    fn k_nearest(&self, query: &FeaturePoint, k: usize) -> Result<Vec<(usize, f64)>> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(Error::NotInitialized("nearest-neighbor index not built"))?;
        if k == 0 {
            return Err(Error::InvalidParameters(
                "k must be at least 1".to_string(),
            ));
        }

        let mut by_distance: Vec<(f64, usize)> = reference
            .iter()
            .enumerate()
            .map(|(index, point)| (query.distance_to(point), index))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut neighbors = Vec::new();
        for (distance, index) in by_distance {
            if distance > self.max_distance {
                break;
            }
            neighbors.push((index, distance));
            if neighbors.len() == k {
                break;
            }
        }
        Ok(neighbors)
    }
}

/// Balanced spatial tree with logarithmic k-nearest-neighbor lookups,
/// backed by the `kdtree` crate.
///
/// Returns the same set of nearest points as [`BruteForceSearch`] for the
/// same inputs; the order of exactly-equidistant points may differ.
pub struct KdTreeSearch {
    tree: Option<kdtree::KdTree<f64, usize, Vec<f64>>>,
    max_distance: f64,
}

impl KdTreeSearch {
    pub fn new(max_distance: f64) -> Self {
        Self {
            tree: None,
            max_distance,
        }
    }

    /// A lookup with no distance cutoff
    pub fn unbounded() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl NearestNeighborSearch for KdTreeSearch {
    fn build(&mut self, reference: &[FeaturePoint]) -> Result<()> {
        let first = reference.first().ok_or_else(|| {
            Error::InvalidParameters("reference point set is empty".to_string())
        })?;

        let mut tree = kdtree::KdTree::with_capacity(first.dimension(), reference.len());
        for (index, point) in reference.iter().enumerate() {
            tree.add(point.features().to_vec(), index).map_err(|e| {
                Error::InvalidData(format!("kd-tree insert failed: {:?}", e))
            })?;
        }
        self.tree = Some(tree);
        Ok(())
    }

    fn k_nearest(&self, query: &FeaturePoint, k: usize) -> Result<Vec<(usize, f64)>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or(Error::NotInitialized("nearest-neighbor index not built"))?;
        if k == 0 {
            return Err(Error::InvalidParameters(
                "k must be at least 1".to_string(),
            ));
        }

        let nearest = tree
            .nearest(query.features(), k, &squared_euclidean)
            .map_err(|e| Error::InvalidData(format!("kd-tree query failed: {:?}", e)))?;

        Ok(nearest
            .into_iter()
            .map(|(squared, &index)| (index, squared.sqrt()))
            .take_while(|&(_, distance)| distance <= self.max_distance)
            .collect())
    }
}
