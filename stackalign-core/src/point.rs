//! Feature point types and related functionality

use crate::error::{Error, Result};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An immutable n-dimensional feature point.
///
/// Points are value types: equality and ordering are determined by the
/// feature vector. A point is never mutated after construction; translation
/// produces a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePoint {
    features: DVector<f64>,
}

impl FeaturePoint {
    /// Create a point from its feature values
    pub fn new(features: Vec<f64>) -> Self {
        Self {
            features: DVector::from_vec(features),
        }
    }

    /// Create a point from a slice of feature values
    pub fn from_slice(features: &[f64]) -> Self {
        Self {
            features: DVector::from_column_slice(features),
        }
    }

    /// Number of feature dimensions
    pub fn dimension(&self) -> usize {
        self.features.len()
    }

    /// Feature values as a slice
    pub fn features(&self) -> &[f64] {
        self.features.as_slice()
    }

    /// Feature values as a vector
    pub fn coords(&self) -> &DVector<f64> {
        &self.features
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &FeaturePoint) -> f64 {
        (&self.features - &other.features).norm()
    }

    /// Return a new point translated by the given per-axis offset
    pub fn translated(&self, offset: &DVector<f64>) -> FeaturePoint {
        FeaturePoint {
            features: &self.features + offset,
        }
    }

    /// Lexicographic comparison by feature value.
    ///
    /// Total over all float values (`f64::total_cmp`), so equidistant and
    /// otherwise-tied points always compare the same way.
    pub fn cmp_features(&self, other: &FeaturePoint) -> Ordering {
        for (a, b) in self.features.iter().zip(other.features.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.dimension().cmp(&other.dimension())
    }
}

impl PartialOrd for FeaturePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_features(other))
    }
}

impl fmt::Display for FeaturePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.features.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

impl FromStr for FeaturePoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let features = s
            .split(',')
            .map(|field| {
                field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidData(format!("invalid feature value [{}]", field)))
            })
            .collect::<Result<Vec<f64>>>()?;

        if features.is_empty() {
            return Err(Error::InvalidData("empty feature point record".to_string()));
        }

        Ok(FeaturePoint::new(features))
    }
}
