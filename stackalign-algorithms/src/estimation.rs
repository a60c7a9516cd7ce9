//! Cluster-pair rigid transformation estimation

use stackalign_core::{Cluster, Error, Result, RigidTransformation};

/// Estimate the rigid transformation between two cluster centroids.
///
/// The centroid of each cluster is the coordinate-wise arithmetic mean of
/// its points; `distance` is the Euclidean distance between the centroids
/// and each axis gets the direction-cosine angle
/// `acos((target_i - source_i) / distance)` in degrees. The returned
/// transformation carries no correspondences; matching fills them in.
///
/// # Errors
/// * `DegenerateTransformation` when the centroids coincide; the direction
///   angles are undefined and callers must treat the pair as having zero
///   candidate correspondences.
/// * `InvalidData` when the clusters are empty or disagree on
///   dimensionality.
pub fn estimate_transformation(
    source: &Cluster,
    target: &Cluster,
) -> Result<RigidTransformation> {
    let source_centroid = source
        .centroid()
        .ok_or_else(|| Error::InvalidData("source cluster is empty".to_string()))?;
    let target_centroid = target
        .centroid()
        .ok_or_else(|| Error::InvalidData("target cluster is empty".to_string()))?;

    if source_centroid.dimension() != target_centroid.dimension() {
        return Err(Error::InvalidData(format!(
            "dimension mismatch between clusters: {} vs {}",
            source_centroid.dimension(),
            target_centroid.dimension()
        )));
    }

    let distance = source_centroid.distance_to(&target_centroid);
    if distance == 0.0 {
        return Err(Error::DegenerateTransformation(format!(
            "clusters {} and {} share a centroid",
            source.id(),
            target.id()
        )));
    }

    let angles = source_centroid
        .features()
        .iter()
        .zip(target_centroid.features())
        .map(|(s, t)| {
            // the ratio can drift past [-1, 1] by a rounding error; clamp
            // so acos never yields NaN
            let ratio = ((t - s) / distance).clamp(-1.0, 1.0);
            ratio.acos().to_degrees()
        })
        .collect();

    Ok(RigidTransformation::new(
        source.id(),
        target.id(),
        distance,
        angles,
    ))
}
