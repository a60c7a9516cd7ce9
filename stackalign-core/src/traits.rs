//! Core traits for stackalign

use crate::cluster::Cluster;
use crate::correspondence::Match;
use crate::error::Result;
use crate::point::FeaturePoint;
use crate::transform::RigidTransformation;

/// Trait for k-nearest-neighbor lookup over a reference point set.
///
/// Implementations are built once per reference set and queried many times.
/// Querying before [`build`](NearestNeighborSearch::build) fails with
/// [`Error::NotInitialized`](crate::Error::NotInitialized).
pub trait NearestNeighborSearch {
    /// Index the reference point set
    fn build(&mut self, reference: &[FeaturePoint]) -> Result<()>;

    /// Find up to `k` nearest reference points to `query`, as
    /// `(reference index, distance)` pairs in ascending distance order.
    fn k_nearest(&self, query: &FeaturePoint, k: usize) -> Result<Vec<(usize, f64)>>;
}

/// Trait for discovering a one-to-one correspondence set between a source
/// cluster and a target cluster under a candidate transformation.
pub trait CorrespondenceMatcher {
    /// Translate the source cluster per `transformation`, pair translated
    /// points with nearby target points, and return a conflict-free scored
    /// match. An empty match is a valid "no support" outcome.
    fn find_match(
        &self,
        source: &Cluster,
        target: &Cluster,
        transformation: &RigidTransformation,
    ) -> Result<Match>;
}
