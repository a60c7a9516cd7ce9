//! Correspondence discovery between translated source points and target
//! points

use crate::nearest_neighbor::create_search;
use stackalign_core::{
    Cluster, Correspondence, CorrespondenceMatcher, Error, FeaturePoint, Match,
    NeighborStrategy, RegistrationParams, Result, RigidTransformation,
};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A pending correspondence awaiting greedy selection.
///
/// Orders by error ascending, with ties broken by source index then target
/// index so the drain order never depends on insertion or hash order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPair {
    error: f64,
    source: usize,
    target: usize,
}

impl Eq for PendingPair {}

impl Ord for PendingPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error
            .total_cmp(&other.error)
            .then(self.source.cmp(&other.source))
            .then(self.target.cmp(&other.target))
    }
}

impl PartialOrd for PendingPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedily drain the pending heap into a one-to-one correspondence set.
///
/// The lowest-error pair wins whenever neither of its endpoints has been
/// consumed; the drain stops once either point set is exhausted. The result
/// trades optimality for linear-in-candidates running time; it is not a
/// minimum-cost bipartite matching.
fn drain_one_to_one(
    mut heap: BinaryHeap<Reverse<PendingPair>>,
    source: &Cluster,
    target: &Cluster,
) -> Vec<Correspondence> {
    let mut used_source = vec![false; source.len()];
    let mut used_target = vec![false; target.len()];
    let mut remaining_source = source.len();
    let mut remaining_target = target.len();

    let mut accepted = Vec::new();
    while let Some(Reverse(pair)) = heap.pop() {
        if remaining_source == 0 || remaining_target == 0 {
            break;
        }
        if used_source[pair.source] || used_target[pair.target] {
            continue;
        }
        used_source[pair.source] = true;
        used_target[pair.target] = true;
        remaining_source -= 1;
        remaining_target -= 1;

        accepted.push(Correspondence::new(
            source.points()[pair.source].clone(),
            target.points()[pair.target].clone(),
            pair.error,
        ));
    }
    accepted
}

/// Collect candidate pairs: every translated source point against its
/// nearest target neighbors within the matcher threshold.
fn pending_pairs(
    translated: &[FeaturePoint],
    target: &Cluster,
    strategy: NeighborStrategy,
    threshold: f64,
    neighbor_limit: usize,
) -> Result<BinaryHeap<Reverse<PendingPair>>> {
    let mut index = create_search(strategy, threshold);
    index.build(target.points())?;

    let mut heap = BinaryHeap::new();
    for (source_index, candidate) in translated.iter().enumerate() {
        for (target_index, distance) in index.k_nearest(candidate, neighbor_limit)? {
            heap.push(Reverse(PendingPair {
                error: distance,
                source: source_index,
                target: target_index,
            }));
        }
    }
    Ok(heap)
}

/// Centroid-anchored matcher.
///
/// Each source point keeps its offset from the source centroid but is
/// re-anchored at the target centroid, i.e. every point is translated by
/// the rigid offset implied by the transformation. The aggregate score is
/// the mean of squared accepted errors (lower is better, 0 when empty).
pub struct CentroidMatcher {
    threshold: f64,
    strategy: NeighborStrategy,
}

impl CentroidMatcher {
    pub fn new(threshold: f64, strategy: NeighborStrategy) -> Self {
        Self {
            threshold,
            strategy,
        }
    }

    pub fn from_params(params: &RegistrationParams) -> Self {
        Self::new(params.threshold, params.strategy)
    }
}

impl CorrespondenceMatcher for CentroidMatcher {
    fn find_match(
        &self,
        source: &Cluster,
        target: &Cluster,
        transformation: &RigidTransformation,
    ) -> Result<Match> {
        if source.is_empty() || target.is_empty() {
            return Ok(Match::empty());
        }
        if transformation.dimension() != source.dimension() {
            return Err(Error::InvalidData(format!(
                "transformation dimension {} does not match cluster dimension {}",
                transformation.dimension(),
                source.dimension()
            )));
        }

        let offset = transformation.translation();
        let translated: Vec<_> = source.iter().map(|p| p.translated(&offset)).collect();

        // every target point is a potential partner for every candidate
        let heap = pending_pairs(&translated, target, self.strategy, self.threshold, target.len())?;
        let accepted = drain_one_to_one(heap, source, target);

        if accepted.is_empty() {
            return Ok(Match::empty());
        }
        let mean_squared = accepted.iter().map(|c| c.error() * c.error()).sum::<f64>()
            / accepted.len() as f64;
        Ok(Match::new(mean_squared, accepted))
    }
}

/// Rank-scored matcher.
///
/// Translates every source point by the transformation's translation
/// vector, pairs candidates with up to `neighbor_limit` target neighbors,
/// and scores the accepted correspondence at rank `r` as
/// `alpha*r - (1-alpha)*error`. Acceptance stops as soon as the running
/// score drops, so the match keeps only the prefix of pairs that still
/// improve it. Higher scores are better.
pub struct RankedMatcher {
    threshold: f64,
    neighbor_limit: usize,
    alpha: f64,
    strategy: NeighborStrategy,
}

impl RankedMatcher {
    pub fn new(
        threshold: f64,
        neighbor_limit: usize,
        alpha: f64,
        strategy: NeighborStrategy,
    ) -> Self {
        Self {
            threshold,
            neighbor_limit,
            alpha,
            strategy,
        }
    }

    pub fn from_params(params: &RegistrationParams) -> Self {
        Self::new(
            params.threshold,
            params.neighbor_limit,
            params.alpha,
            params.strategy,
        )
    }

    fn score(&self, rank: usize, error: f64) -> f64 {
        self.alpha * rank as f64 - (1.0 - self.alpha) * error
    }
}

impl CorrespondenceMatcher for RankedMatcher {
    fn find_match(
        &self,
        source: &Cluster,
        target: &Cluster,
        transformation: &RigidTransformation,
    ) -> Result<Match> {
        if source.is_empty() || target.is_empty() {
            return Ok(Match::empty());
        }
        if transformation.dimension() != source.dimension() {
            return Err(Error::InvalidData(format!(
                "transformation dimension {} does not match cluster dimension {}",
                transformation.dimension(),
                source.dimension()
            )));
        }

        let offset = transformation.translation();
        let translated: Vec<_> = source.iter().map(|p| p.translated(&offset)).collect();

        let mut heap = pending_pairs(
            &translated,
            target,
            self.strategy,
            self.threshold,
            self.neighbor_limit,
        )?;

        let mut used_source = vec![false; source.len()];
        let mut used_target = vec![false; target.len()];
        let mut accepted = Vec::new();
        let mut best_score = f64::MIN;

        while let Some(Reverse(pair)) = heap.pop() {
            if accepted.len() == source.len() || accepted.len() == target.len() {
                break;
            }
            if used_source[pair.source] || used_target[pair.target] {
                continue;
            }

            let score = self.score(accepted.len() + 1, pair.error);
            if score < best_score {
                // adding noisier pairs no longer pays off
                break;
            }
            best_score = score;
            used_source[pair.source] = true;
            used_target[pair.target] = true;
            accepted.push(Correspondence::new(
                source.points()[pair.source].clone(),
                target.points()[pair.target].clone(),
                pair.error,
            ));
        }

        if accepted.is_empty() {
            return Ok(Match::empty());
        }
        Ok(Match::new(best_score, accepted))
    }
}
