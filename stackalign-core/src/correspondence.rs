//! Correspondences between source and target points, and match sets

use crate::error::{Error, Result};
use crate::point::FeaturePoint;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A claimed one-to-one pairing between a source point and a target point.
///
/// `error` is the Euclidean distance between the translated source point and
/// the matched target point. The textual record format is
/// `src1,src2,...#tgt1,tgt2,...`; the error is an artifact of matching and
/// is not part of the record, so parsed correspondences carry an error of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    source: FeaturePoint,
    target: FeaturePoint,
    error: f64,
}

impl Correspondence {
    pub fn new(source: FeaturePoint, target: FeaturePoint, error: f64) -> Self {
        Self {
            source,
            target,
            error,
        }
    }

    pub fn source(&self) -> &FeaturePoint {
        &self.source
    }

    pub fn target(&self) -> &FeaturePoint {
        &self.target
    }

    pub fn error(&self) -> f64 {
        self.error
    }
}

impl fmt::Display for Correspondence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source, self.target)
    }
}

impl FromStr for Correspondence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut blocks = s.splitn(2, '#');
        let source = blocks
            .next()
            .ok_or_else(|| Error::InvalidData(format!("malformed correspondence [{}]", s)))?;
        let target = blocks
            .next()
            .ok_or_else(|| Error::InvalidData(format!("malformed correspondence [{}]", s)))?;

        Ok(Correspondence::new(
            source.parse()?,
            target.parse()?,
            0.0,
        ))
    }
}

/// A conflict-free set of correspondences with an aggregate score.
///
/// Two scoring conventions exist depending on the producing matcher: mean
/// squared correspondence error (lower is better) or the rank/error
/// trade-off `alpha*rank - (1-alpha)*error` (higher is better). An empty
/// match always scores 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    score: f64,
    correspondences: Vec<Correspondence>,
}

impl Match {
    pub fn new(score: f64, correspondences: Vec<Correspondence>) -> Self {
        Self {
            score,
            correspondences,
        }
    }

    pub fn empty() -> Self {
        Self {
            score: 0.0,
            correspondences: Vec::new(),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn correspondences(&self) -> &[Correspondence] {
        &self.correspondences
    }

    pub fn into_correspondences(self) -> Vec<Correspondence> {
        self.correspondences
    }

    pub fn len(&self) -> usize {
        self.correspondences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correspondences.is_empty()
    }

    /// Order by score descending, ties broken by correspondence count
    /// descending.
    pub fn cmp_by_score(&self, other: &Match) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(other.correspondences.len().cmp(&self.correspondences.len()))
    }
}
