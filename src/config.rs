//! Search parameters.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Depth used when the caller asks for an unbounded search (`depth == -1`).
pub const MAX_DEPTH: usize = 1000;

/// How the skeleton is pruned from the complete graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyStrategy {
    /// Tiered search on frozen neighbourhoods; first independent subset removes the edge.
    #[default]
    Stable,
    /// Tiered search that gathers every p-value of a tier and decides by FDR cutoff.
    FdrRefinement,
    /// `Stable`, then the FDR tiers over the resulting skeleton.
    StableThenRefine,
}

/// What to do with an unshielded triple for which neither the sets containing the
/// middle node nor the sets excluding it support independence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeitherPolicy {
    /// Underline the triple so that the closure rules may use it.
    #[default]
    NonCollider,
    /// Mark the triple ambiguous; the closure rules ignore it.
    Ambiguous,
    /// Leave the triple unannotated; it is only reported.
    Unannotated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest conditioning set size; -1 means unbounded.
    pub depth: i32,
    /// Significance level for the FDR cutoff. `None` takes the oracle's alpha.
    pub alpha: Option<f64>,
    /// Scales the p-values of conditioning sets that exclude the middle node.
    pub collider_factor: f64,
    /// Scales the p-values of conditioning sets that contain the middle node.
    pub noncollider_factor: f64,
    pub adjacency: AdjacencyStrategy,
    pub neither_policy: NeitherPolicy,
    /// Refuse any orientation that would close a directed cycle.
    pub prevent_cycles: bool,
    /// Run independence tests of a tier on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: -1,
            alpha: None,
            collider_factor: 0.4,
            noncollider_factor: 1.0,
            adjacency: AdjacencyStrategy::Stable,
            neither_policy: NeitherPolicy::NonCollider,
            prevent_cycles: false,
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn from_json(json: &str) -> Result<Self, SearchError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SearchError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.depth < -1 {
            return Err(SearchError::InvalidConfiguration(format!(
                "depth must be -1 (unbounded) or >= 0, got {}",
                self.depth
            )));
        }
        if let Some(alpha) = self.alpha {
            validate_alpha(alpha)?;
        }
        for (name, factor) in [
            ("collider_factor", self.collider_factor),
            ("noncollider_factor", self.noncollider_factor),
        ] {
            if !(factor > 0.0 && factor.is_finite()) {
                return Err(SearchError::InvalidConfiguration(format!(
                    "{} must be a positive number, got {}",
                    name, factor
                )));
            }
        }
        Ok(())
    }

    pub fn effective_depth(&self) -> usize {
        if self.depth < 0 { MAX_DEPTH } else { self.depth as usize }
    }

    /// The alpha in force: the configured one, else the oracle's.
    pub fn resolve_alpha(&self, oracle_alpha: f64) -> Result<f64, SearchError> {
        let alpha = self.alpha.unwrap_or(oracle_alpha);
        validate_alpha(alpha)?;
        Ok(alpha)
    }
}

fn validate_alpha(alpha: f64) -> Result<(), SearchError> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(SearchError::InvalidConfiguration(format!(
            "alpha must lie in (0, 1), got {}",
            alpha
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, MAX_DEPTH)]
    #[case(0, 0)]
    #[case(3, 3)]
    #[case(5000, 5000)]
    fn test_effective_depth(#[case] depth: i32, #[case] expected: usize) {
        let config = SearchConfig { depth, ..Default::default() };
        assert_eq!(config.effective_depth(), expected);
    }

    #[rstest]
    #[case(SearchConfig { depth: -2, ..Default::default() })]
    #[case(SearchConfig { alpha: Some(0.0), ..Default::default() })]
    #[case(SearchConfig { alpha: Some(1.0), ..Default::default() })]
    #[case(SearchConfig { collider_factor: 0.0, ..Default::default() })]
    #[case(SearchConfig { noncollider_factor: f64::NAN, ..Default::default() })]
    fn test_invalid_configuration_rejected(#[case] config: SearchConfig) {
        assert!(matches!(config.validate(), Err(SearchError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_oracle_alpha_is_validated_too() {
        let config = SearchConfig::default();
        assert_eq!(config.resolve_alpha(0.05).unwrap(), 0.05);
        assert!(config.resolve_alpha(1.5).is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SearchConfig::from_json(
            r#"{ "depth": 2, "adjacency": "fdr_refinement", "neither_policy": "ambiguous" }"#,
        )
        .unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.adjacency, AdjacencyStrategy::FdrRefinement);
        assert_eq!(config.neither_policy, NeitherPolicy::Ambiguous);
        assert_eq!(config.collider_factor, 0.4);
        assert!(config.parallel);
    }

    #[test]
    fn test_from_json_validates() {
        let err = SearchConfig::from_json(r#"{ "depth": -7 }"#).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }
}
