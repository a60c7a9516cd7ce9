//! End-to-end point-set registration pipeline

use crate::clustering::dbscan;
use crate::estimation::estimate_transformation;
use crate::grouping::optimize;
use crate::matching::{CentroidMatcher, RankedMatcher};
use stackalign_core::{
    Cluster, Correspondence, CorrespondenceMatcher, Error, FeaturePoint, MatcherKind,
    RegistrationParams, Result, RigidTransformation,
};

/// Candidates need at least this many correspondences to count as evidence
/// for a cluster pairing.
const MIN_CANDIDATE_CORRESPONDENCES: usize = 2;

/// Result of one registration invocation
#[derive(Debug, Clone)]
pub struct Registration {
    /// The mutually-consistent transformations selected by the group
    /// optimizer (empty when no consensus was found)
    pub transformations: Vec<RigidTransformation>,
    /// The selected transformations' correspondences, flattened
    pub correspondences: Vec<Correspondence>,
    /// Number of source clusters found
    pub source_clusters: usize,
    /// Number of target clusters found
    pub target_clusters: usize,
}

/// Build the correspondence matcher selected by the configuration
pub fn create_matcher(params: &RegistrationParams) -> Box<dyn CorrespondenceMatcher> {
    match params.matcher {
        MatcherKind::Centroid => Box::new(CentroidMatcher::from_params(params)),
        MatcherKind::Ranked => Box::new(RankedMatcher::from_params(params)),
    }
}

/// Register a source point set against a target point set.
///
/// Clusters both sets, evaluates every (source cluster, target cluster)
/// pair for a supporting transformation, and selects the subset of
/// transformations that agree most tightly in transformation-space. The
/// returned correspondences belong to the winning transformations.
///
/// Parameter validation failures abort the invocation; failures confined
/// to a single cluster pair (degenerate centroids, matcher errors) are
/// logged and exclude only that pair. An empty result is a valid outcome
/// meaning no consistent registration was found.
///
/// The function is purely functional over its inputs and safe to call from
/// multiple threads with independent arguments.
pub fn register(
    source: &[FeaturePoint],
    target: &[FeaturePoint],
    params: &RegistrationParams,
) -> Result<Registration> {
    params.validate()?;

    let source_clusters = dbscan(source, params.min_points, params.eps)?;
    let target_clusters = dbscan(target, params.min_points, params.eps)?;
    log::info!(
        "registering {} source clusters against {} target clusters",
        source_clusters.len(),
        target_clusters.len()
    );

    let matcher = create_matcher(params);
    let candidates = collect_candidates(&source_clusters, &target_clusters, matcher.as_ref());

    let selection = optimize(&candidates, params.group_eps);
    let (transformations, correspondences) = match selection {
        Some(selection) => {
            let correspondences = selection.correspondences();
            (selection.transformations, correspondences)
        }
        None => {
            log::info!("no mutually consistent transformation group found");
            (Vec::new(), Vec::new())
        }
    };

    Ok(Registration {
        transformations,
        correspondences,
        source_clusters: source_clusters.len(),
        target_clusters: target_clusters.len(),
    })
}

/// Evaluate every cluster pair, returning the viable candidate
/// transformations per source cluster.
fn collect_candidates(
    source_clusters: &[Cluster],
    target_clusters: &[Cluster],
    matcher: &dyn CorrespondenceMatcher,
) -> Vec<Vec<RigidTransformation>> {
    source_clusters
        .iter()
        .map(|source_cluster| {
            let mut viable = Vec::new();
            for target_cluster in target_clusters {
                match evaluate_pair(source_cluster, target_cluster, matcher) {
                    Ok(Some(transformation)) => viable.push(transformation),
                    Ok(None) => {}
                    Err(e) => log::warn!(
                        "skipping cluster pair ({}, {}): {}",
                        source_cluster.id(),
                        target_cluster.id(),
                        e
                    ),
                }
            }
            viable
        })
        .collect()
}

/// Estimate and match one cluster pair. `Ok(None)` means the pair offers
/// too little support to be a candidate.
fn evaluate_pair(
    source: &Cluster,
    target: &Cluster,
    matcher: &dyn CorrespondenceMatcher,
) -> Result<Option<RigidTransformation>> {
    let mut transformation = match estimate_transformation(source, target) {
        Ok(transformation) => transformation,
        Err(Error::DegenerateTransformation(reason)) => {
            // coincident centroids carry no direction; zero support
            log::debug!("{}", reason);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let found = matcher.find_match(source, target, &transformation)?;
    if found.len() < MIN_CANDIDATE_CORRESPONDENCES {
        return Ok(None);
    }

    transformation.set_correspondences(found.into_correspondences());
    Ok(Some(transformation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(f64, f64)]) -> Vec<FeaturePoint> {
        values
            .iter()
            .map(|&(x, y)| FeaturePoint::new(vec![x, y]))
            .collect()
    }

    fn params(min_points: usize, eps: f64, threshold: f64) -> RegistrationParams {
        RegistrationParams {
            min_points,
            eps,
            threshold,
            ..RegistrationParams::default()
        }
    }

    #[test]
    fn test_invalid_parameters_abort() {
        let source = points(&[(0.0, 0.0), (1.0, 1.0)]);
        let target = source.clone();
        let result = register(&source, &target, &params(0, 1.0, 1.0));
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_min_points_exceeding_input_aborts() {
        let source = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let target = source.clone();
        let result = register(&source, &target, &params(5, 1.0, 1.0));
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_two_shifted_clusters_register() {
        // two well-separated source clusters, both shifted by (5, 0)
        let source = points(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (100.0, 100.0),
            (101.0, 100.0),
            (100.0, 101.0),
        ]);
        let target = points(&[
            (5.0, 0.0),
            (6.0, 0.0),
            (5.0, 1.0),
            (105.0, 100.0),
            (106.0, 100.0),
            (105.0, 101.0),
        ]);

        let result = register(&source, &target, &params(3, 2.0, 1.0)).unwrap();
        assert_eq!(result.source_clusters, 2);
        assert_eq!(result.target_clusters, 2);
        assert_eq!(result.transformations.len(), 2);
        assert_eq!(result.correspondences.len(), 6);
        for c in &result.correspondences {
            assert!(c.error() <= 1.0);
        }
    }

    #[test]
    fn test_no_support_is_empty_not_error() {
        // the cluster shapes disagree badly: after centroid-anchored
        // translation no pair falls inside the threshold
        let source = points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let target = points(&[(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)]);

        let result = register(&source, &target, &params(3, 30.0, 0.5)).unwrap();
        assert!(result.transformations.is_empty());
        assert!(result.correspondences.is_empty());
    }

    #[test]
    fn test_single_cluster_pair_is_no_group() {
        // one source and one target cluster: a lone transformation can
        // never witness mutual consistency
        let source = points(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]);
        let target = points(&[(5.0, 0.0), (6.0, 0.0), (5.0, 1.0)]);

        let result = register(&source, &target, &params(3, 2.0, 1.0)).unwrap();
        assert_eq!(result.source_clusters, 1);
        assert_eq!(result.target_clusters, 1);
        assert!(result.correspondences.is_empty());
    }
}
