//! Per-invocation registration parameters

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Nearest-neighbor index implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeighborStrategy {
    /// Exhaustive distance scan; best for small reference sets
    BruteForce,
    /// Balanced spatial tree with logarithmic lookups; best for large
    /// reference sets
    KdTree,
}

/// Correspondence matcher implementation selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatcherKind {
    /// Centroid-anchored translation with mean-squared-error scoring
    Centroid,
    /// Transformation-vector translation with rank/error trade-off scoring
    Ranked,
}

/// Configuration for one registration invocation.
///
/// Parsed from a `key=value,key=value,...` string. Keys are
/// case-insensitive; values are trimmed. Recognized keys:
///
/// | key         | meaning                                     | default      |
/// |-------------|---------------------------------------------|--------------|
/// | `minpoints` | DBSCAN minimum neighborhood size            | required     |
/// | `eps`       | DBSCAN neighborhood radius                  | required     |
/// | `threshold` | maximum acceptable correspondence distance  | unbounded    |
/// | `k`         | ranked-matcher neighbor bucket size         | 50           |
/// | `alpha`     | ranked-matcher size/error trade-off         | 0.5          |
/// | `group_eps` | transformation-space clustering radius      | 1.0          |
/// | `index`     | `brute` or `kdtree`                         | `brute`      |
/// | `matcher`   | `centroid` or `ranked`                      | `centroid`   |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationParams {
    pub min_points: usize,
    pub eps: f64,
    pub threshold: f64,
    pub neighbor_limit: usize,
    pub alpha: f64,
    pub group_eps: f64,
    pub strategy: NeighborStrategy,
    pub matcher: MatcherKind,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            min_points: 2,
            eps: 1.0,
            threshold: f64::INFINITY,
            neighbor_limit: 50,
            alpha: 0.5,
            group_eps: 1.0,
            strategy: NeighborStrategy::BruteForce,
            matcher: MatcherKind::Centroid,
        }
    }
}

impl RegistrationParams {
    /// Parse a comma-delimited `key=value` parameter string on top of the
    /// defaults. `minpoints` and `eps` must be supplied; everything else is
    /// optional.
    pub fn parse(params: &str) -> Result<Self> {
        let mut parsed = Self::default();
        let seen = parsed.merge_str(params, ",")?;
        for required in ["minpoints", "eps"] {
            if !seen.iter().any(|key| key == required) {
                return Err(Error::InvalidParameters(format!(
                    "missing required param [{}]",
                    required
                )));
            }
        }
        parsed.validate()?;
        Ok(parsed)
    }

    /// Merge a delimited `key=value` parameter string into this
    /// configuration, returning the keys that were set. Unknown keys and
    /// malformed values are rejected.
    pub fn merge_str(&mut self, params: &str, delimiter: &str) -> Result<Vec<String>> {
        let mut seen = Vec::new();
        for pair in params.split(delimiter) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::InvalidParameters(format!("malformed param [{}]", pair)))?;

            let key = key.trim().to_lowercase();
            let value = value.trim();

            match key.as_str() {
                "minpoints" => self.min_points = parse_value(&key, value)?,
                "eps" => self.eps = parse_value(&key, value)?,
                "threshold" => self.threshold = parse_value(&key, value)?,
                "k" => self.neighbor_limit = parse_value(&key, value)?,
                "alpha" => self.alpha = parse_value(&key, value)?,
                "group_eps" => self.group_eps = parse_value(&key, value)?,
                "index" => {
                    self.strategy = match value.to_lowercase().as_str() {
                        "brute" => NeighborStrategy::BruteForce,
                        "kdtree" => NeighborStrategy::KdTree,
                        other => {
                            return Err(Error::InvalidParameters(format!(
                                "unknown index strategy [{}]",
                                other
                            )))
                        }
                    }
                }
                "matcher" => {
                    self.matcher = match value.to_lowercase().as_str() {
                        "centroid" => MatcherKind::Centroid,
                        "ranked" => MatcherKind::Ranked,
                        other => {
                            return Err(Error::InvalidParameters(format!(
                                "unknown matcher [{}]",
                                other
                            )))
                        }
                    }
                }
                other => {
                    return Err(Error::InvalidParameters(format!(
                        "unknown param [{}]",
                        other
                    )))
                }
            }
            seen.push(key);
        }
        Ok(seen)
    }

    /// Check value ranges. Called by [`RegistrationParams::parse`]; callers
    /// constructing the struct directly should call it before registering.
    pub fn validate(&self) -> Result<()> {
        if self.min_points == 0 {
            return Err(Error::InvalidParameters(
                "minpoints must be at least 1".to_string(),
            ));
        }
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "eps must be a positive number, got {}",
                self.eps
            )));
        }
        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if self.neighbor_limit == 0 {
            return Err(Error::InvalidParameters(
                "k must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(Error::InvalidParameters(format!(
                "alpha must be in [0, 1], got {}",
                self.alpha
            )));
        }
        if !self.group_eps.is_finite() || self.group_eps <= 0.0 {
            return Err(Error::InvalidParameters(format!(
                "group_eps must be a positive number, got {}",
                self.group_eps
            )));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidParameters(format!("invalid value [{}] for [{}]", value, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_defaults() {
        let params = RegistrationParams::parse("minpoints=4, eps=12.5, threshold=6").unwrap();
        assert_eq!(params.min_points, 4);
        assert_eq!(params.eps, 12.5);
        assert_eq!(params.threshold, 6.0);
        assert_eq!(params.neighbor_limit, 50);
        assert_eq!(params.strategy, NeighborStrategy::BruteForce);
    }

    #[test]
    fn test_parse_strategy_and_matcher() {
        let params =
            RegistrationParams::parse("minpoints=2,eps=1,index=kdtree,matcher=ranked").unwrap();
        assert_eq!(params.strategy, NeighborStrategy::KdTree);
        assert_eq!(params.matcher, MatcherKind::Ranked);
    }

    #[test]
    fn test_parse_requires_minpoints_and_eps() {
        assert!(RegistrationParams::parse("eps=1.0").is_err());
        assert!(RegistrationParams::parse("minpoints=2,group_eps=1.0").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        assert!(RegistrationParams::parse("minpoints=2,eps=1,bogus=3").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_eps() {
        assert!(RegistrationParams::parse("minpoints=2,eps=abc").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_pair() {
        assert!(RegistrationParams::parse("minpoints").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_eps() {
        let mut params = RegistrationParams::default();
        params.eps = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let params = RegistrationParams::parse("MinPoints=3,EPS=2.0").unwrap();
        assert_eq!(params.min_points, 3);
        assert_eq!(params.eps, 2.0);
    }
}
