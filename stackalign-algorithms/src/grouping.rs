//! Group-consistency optimization over candidate transformations
//!
//! Every source cluster may offer several candidate transformations, each
//! pointing at some target cluster. The optimizer picks at most one
//! candidate per source cluster (with no two picks claiming the same
//! target cluster) such that the chosen transformations agree with each
//! other most tightly in transformation-space.

use crate::clustering::dbscan_indices;
use stackalign_core::{Correspondence, FeaturePoint, RigidTransformation};
use std::collections::BTreeSet;

/// Transformation-space clusters need at least two members to witness
/// mutual consistency.
const GROUP_MIN_POINTS: usize = 2;

/// The winning combination: the mutually-consistent transformations and
/// their total absolute deviation from the group mean (smaller is tighter).
#[derive(Debug, Clone)]
pub struct GroupSelection {
    pub transformations: Vec<RigidTransformation>,
    pub deviation: f64,
}

impl GroupSelection {
    /// All correspondences of the selected transformations, flattened in
    /// selection order.
    pub fn correspondences(&self) -> Vec<Correspondence> {
        self.transformations
            .iter()
            .flat_map(|t| t.correspondences().iter().cloned())
            .collect()
    }
}

/// One branch of the combination search. Each frame owns its claim set and
/// choice list outright, so no claim can leak into a sibling branch.
struct Frame {
    next: usize,
    claimed: BTreeSet<usize>,
    chosen: Vec<(usize, usize)>,
}

/// Exhaustively search the (source cluster x candidate) combination space
/// and return the tightest mutually-consistent transformation group.
///
/// `candidates[i]` holds the viable transformations for source cluster `i`.
/// At every source cluster the search either skips it or picks one of its
/// candidates whose target cluster is still unclaimed on this branch. A
/// completed combination with fewer than two claimed targets carries no
/// group evidence and is rejected; otherwise the chosen transformations'
/// angle vectors are re-clustered (`min_points = 2`, `eps = group_eps`) and
/// the sub-group with the smallest total absolute deviation from its own
/// coordinate-wise mean becomes the combination's score.
///
/// The search is exhaustive over an exponential space; in practice the
/// number of source clusters per invocation is small. Returns `None` when
/// no combination produces a group, which is a valid "no consensus"
/// outcome.
pub fn optimize(
    candidates: &[Vec<RigidTransformation>],
    group_eps: f64,
) -> Option<GroupSelection> {
    let mut best: Option<(f64, Vec<(usize, usize)>)> = None;
    let mut leaves = 0usize;

    let mut stack = vec![Frame {
        next: 0,
        claimed: BTreeSet::new(),
        chosen: Vec::new(),
    }];

    while let Some(frame) = stack.pop() {
        if frame.next == candidates.len() {
            leaves += 1;
            if frame.chosen.len() < GROUP_MIN_POINTS {
                continue;
            }
            let picks: Vec<&RigidTransformation> = frame
                .chosen
                .iter()
                .map(|&(source, candidate)| &candidates[source][candidate])
                .collect();
            if let Some((deviation, members)) = tightest_group(&picks, group_eps) {
                let better = match &best {
                    Some((best_deviation, _)) => deviation < *best_deviation,
                    None => true,
                };
                if better {
                    let selection = members.iter().map(|&m| frame.chosen[m]).collect();
                    best = Some((deviation, selection));
                }
            }
            continue;
        }

        // branch: leave this source cluster unassigned
        stack.push(Frame {
            next: frame.next + 1,
            claimed: frame.claimed.clone(),
            chosen: frame.chosen.clone(),
        });

        // branch: each candidate whose target cluster is still free
        for (index, candidate) in candidates[frame.next].iter().enumerate() {
            if frame.claimed.contains(&candidate.target_id()) {
                continue;
            }
            let mut claimed = frame.claimed.clone();
            claimed.insert(candidate.target_id());
            let mut chosen = frame.chosen.clone();
            chosen.push((frame.next, index));
            stack.push(Frame {
                next: frame.next + 1,
                claimed,
                chosen,
            });
        }
    }

    log::debug!("group optimizer explored {} combinations", leaves);

    let (deviation, selection) = best?;
    Some(GroupSelection {
        transformations: selection
            .into_iter()
            .map(|(source, candidate)| candidates[source][candidate].clone())
            .collect(),
        deviation,
    })
}

/// Cluster the picked transformations' angle vectors and return the
/// tightest resulting sub-group as `(total deviation, member positions)`.
fn tightest_group(
    picks: &[&RigidTransformation],
    group_eps: f64,
) -> Option<(f64, Vec<usize>)> {
    let angle_points: Vec<FeaturePoint> = picks.iter().map(|t| t.angle_point()).collect();

    let groups = match dbscan_indices(&angle_points, GROUP_MIN_POINTS, group_eps) {
        Ok(groups) => groups,
        Err(_) => return None,
    };

    groups
        .into_iter()
        .map(|members| (total_absolute_deviation(&angle_points, &members), members))
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

/// Sum over the group of per-axis absolute deviations from the group's
/// coordinate-wise mean.
fn total_absolute_deviation(points: &[FeaturePoint], members: &[usize]) -> f64 {
    let dimension = points[members[0]].dimension();
    let mut mean = vec![0.0; dimension];
    for &m in members {
        for (axis, value) in points[m].features().iter().enumerate() {
            mean[axis] += value;
        }
    }
    for value in &mut mean {
        *value /= members.len() as f64;
    }

    members
        .iter()
        .map(|&m| {
            points[m]
                .features()
                .iter()
                .zip(&mean)
                .map(|(value, center)| (value - center).abs())
                .sum::<f64>()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformation(
        source_id: usize,
        target_id: usize,
        angles: Vec<f64>,
        tag: f64,
    ) -> RigidTransformation {
        let mut t = RigidTransformation::new(source_id, target_id, 1.0, angles);
        // tag the correspondences so outputs can be traced back in asserts
        t.set_correspondences(vec![Correspondence::new(
            FeaturePoint::new(vec![tag, 0.0]),
            FeaturePoint::new(vec![tag, 1.0]),
            0.0,
        )]);
        t
    }

    #[test]
    fn test_two_distinct_targets_both_selected() {
        // one viable candidate per source cluster, pointing at distinct
        // target clusters with near-identical angles
        let candidates = vec![
            vec![transformation(0, 0, vec![10.0, 80.0], 1.0)],
            vec![transformation(1, 1, vec![10.1, 79.9], 2.0)],
        ];

        let selection = optimize(&candidates, 1.0).unwrap();
        assert_eq!(selection.transformations.len(), 2);

        let correspondences = selection.correspondences();
        assert_eq!(correspondences.len(), 2);
    }

    #[test]
    fn test_conflicting_target_claims() {
        // both source clusters want target 0; only a combination that
        // leaves one of them out is feasible, and a single claim is no
        // group, so the consistent pair via distinct targets must win
        let candidates = vec![
            vec![
                transformation(0, 0, vec![10.0, 80.0], 1.0),
                transformation(0, 1, vec![45.0, 45.0], 2.0),
            ],
            vec![transformation(1, 0, vec![45.2, 44.8], 3.0)],
        ];

        // candidate angles only agree between (0 -> target 1) and
        // (1 -> target 0)
        let selection = optimize(&candidates, 1.0).unwrap();
        assert_eq!(selection.transformations.len(), 2);
        let targets: BTreeSet<usize> = selection
            .transformations
            .iter()
            .map(|t| t.target_id())
            .collect();
        assert_eq!(targets.len(), 2);
        for t in &selection.transformations {
            assert!((t.angles()[0] - 45.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_no_consensus_returns_none() {
        // angle vectors too far apart to form any transformation-space
        // cluster
        let candidates = vec![
            vec![transformation(0, 0, vec![10.0, 80.0], 1.0)],
            vec![transformation(1, 1, vec![120.0, 30.0], 2.0)],
        ];

        assert!(optimize(&candidates, 1.0).is_none());
    }

    #[test]
    fn test_tightest_group_wins() {
        // three sources; two tight candidate agreements exist, one tighter
        // than the other
        let candidates = vec![
            vec![
                transformation(0, 0, vec![10.0, 80.0], 1.0),
                transformation(0, 2, vec![50.0, 40.0], 2.0),
            ],
            vec![
                transformation(1, 1, vec![10.8, 79.2], 3.0),
                transformation(1, 3, vec![50.01, 39.99], 4.0),
            ],
            vec![],
        ];

        let selection = optimize(&candidates, 2.0).unwrap();
        assert_eq!(selection.transformations.len(), 2);
        // the 50/40-degree agreement deviates less than the 10/80 one
        for t in &selection.transformations {
            assert!((t.angles()[0] - 50.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert!(optimize(&[], 1.0).is_none());
        assert!(optimize(&[vec![], vec![]], 1.0).is_none());
    }

    #[test]
    fn test_claims_do_not_leak_between_branches() {
        // source 0 may claim target 0 on one branch; source 1 must still
        // be able to claim target 0 on the sibling branch where source 0
        // skipped, pairing with source 2 instead
        let candidates = vec![
            vec![transformation(0, 0, vec![170.0, 10.0], 1.0)],
            vec![transformation(1, 0, vec![30.0, 60.0], 2.0)],
            vec![transformation(2, 1, vec![30.1, 59.9], 3.0)],
        ];

        let selection = optimize(&candidates, 1.0).unwrap();
        let sources: BTreeSet<usize> = selection
            .transformations
            .iter()
            .map(|t| t.source_id())
            .collect();
        assert_eq!(sources, BTreeSet::from([1, 2]));
    }
}
