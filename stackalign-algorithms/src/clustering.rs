//! Density-based clustering

use stackalign_core::{Cluster, Error, FeaturePoint, Result};
use std::collections::VecDeque;

/// Group points into density-connected clusters, discarding noise.
///
/// A point is a core point when at least `min_points` points (itself
/// included) lie within Euclidean distance `eps`. Clusters grow by
/// transitive expansion through core neighborhoods; points reachable from
/// no core point are noise and appear in no cluster.
///
/// Cluster membership is deterministic for a fixed input order and fixed
/// parameters: points are visited in insertion order and neighborhoods are
/// scanned in index order, so ties between equidistant points always
/// resolve the same way. Cluster ids are positional and not stable across
/// runs.
///
/// # Arguments
/// * `points` - Input points, all of the same dimensionality
/// * `min_points` - Minimum neighborhood size for a core point
/// * `eps` - Neighborhood radius
///
/// # Returns
/// * `Result<Vec<Cluster>>` - The density clusters, in discovery order
pub fn dbscan(points: &[FeaturePoint], min_points: usize, eps: f64) -> Result<Vec<Cluster>> {
    let partitions = dbscan_indices(points, min_points, eps)?;
    Ok(partitions
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            Cluster::new(id, members.iter().map(|&i| points[i].clone()).collect())
        })
        .collect())
}

/// Index-level variant of [`dbscan`]: returns each cluster as a list of
/// indices into `points`, in discovery order.
///
/// Used directly by the group-consistency optimizer, which needs to map
/// clustered transformation-space points back to the transformations they
/// came from.
pub fn dbscan_indices(
    points: &[FeaturePoint],
    min_points: usize,
    eps: f64,
) -> Result<Vec<Vec<usize>>> {
    if min_points == 0 {
        return Err(Error::InvalidParameters(
            "min_points must be at least 1".to_string(),
        ));
    }
    if min_points > points.len() {
        return Err(Error::InvalidParameters(format!(
            "min_points ({}) cannot exceed the number of points ({})",
            min_points,
            points.len()
        )));
    }
    if !eps.is_finite() || eps <= 0.0 {
        return Err(Error::InvalidParameters(format!(
            "eps must be a positive number, got {}",
            eps
        )));
    }

    let mut visited = vec![false; points.len()];
    let mut assigned = vec![false; points.len()];
    let mut clusters = Vec::new();

    for seed in 0..points.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;

        let neighbors = region_query(points, seed, eps);
        if neighbors.len() < min_points {
            // noise unless a later cluster absorbs it as a border point
            continue;
        }

        let mut members = Vec::new();
        let mut queue: VecDeque<usize> = neighbors.into();
        assigned[seed] = true;
        members.push(seed);

        while let Some(index) = queue.pop_front() {
            if !assigned[index] {
                assigned[index] = true;
                members.push(index);
            }
            if !visited[index] {
                visited[index] = true;
                let expansion = region_query(points, index, eps);
                if expansion.len() >= min_points {
                    queue.extend(expansion);
                }
            }
        }

        clusters.push(members);
    }

    log::debug!(
        "dbscan: {} points -> {} clusters ({} noise)",
        points.len(),
        clusters.len(),
        assigned.iter().filter(|&&a| !a).count()
    );

    Ok(clusters)
}

/// Indices of all points within `eps` of `center`, in index order.
/// The center itself is always included.
fn region_query(points: &[FeaturePoint], center: usize, eps: f64) -> Vec<usize> {
    let center_point = &points[center];
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| center_point.distance_to(p) <= eps)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: &[(f64, f64)]) -> Vec<FeaturePoint> {
        values
            .iter()
            .map(|&(x, y)| FeaturePoint::new(vec![x, y]))
            .collect()
    }

    #[test]
    fn test_single_cluster() {
        let points = grid(&[(0.0, 0.0), (10.0, 10.0)]);
        let clusters = dbscan(&points, 2, 15.0).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_two_clusters_with_noise() {
        let points = grid(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (100.0, 100.0),
            (101.0, 100.0),
            (100.0, 101.0),
            (50.0, 50.0), // noise
        ]);
        let clusters = dbscan(&points, 3, 2.0).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].len(), 3);

        let total: usize = clusters.iter().map(Cluster::len).sum();
        assert_eq!(total, 6, "noise point must not appear in any cluster");
    }

    #[test]
    fn test_border_point_absorbed_once() {
        // chain: 0 and 2 are core, 1 is density-reachable from both
        let points = grid(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.5, 0.0), (1.5, 0.0)]);
        let clusters = dbscan_indices(&points, 3, 0.75).unwrap();
        let total: usize = clusters.iter().map(Vec::len).sum();
        let mut seen: Vec<usize> = clusters.concat();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), total, "no point may be assigned twice");
    }

    #[test]
    fn test_min_points_exceeding_input_fails() {
        let points = grid(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let result = dbscan(&points, 5, 1.0);
        assert!(matches!(result, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn test_invalid_eps_fails() {
        let points = grid(&[(0.0, 0.0)]);
        assert!(dbscan(&points, 1, 0.0).is_err());
        assert!(dbscan(&points, 1, f64::NAN).is_err());
    }

    #[test]
    fn test_deterministic_membership() {
        let points = grid(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (0.5, 0.5),
            (10.0, 10.0),
            (11.0, 10.0),
            (10.5, 10.5),
        ]);
        let first = dbscan_indices(&points, 2, 1.5).unwrap();
        let second = dbscan_indices(&points, 2, 1.5).unwrap();
        assert_eq!(first, second);
    }
}
