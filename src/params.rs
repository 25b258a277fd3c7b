//! Runtime searcher parameters.
//!
//! Deserializable with serde so a surrounding system can hand the searcher a
//! JSON/TOML fragment; every field has a default matching the documented
//! configuration table, so `SearcherParams::default()` is a valid baseline
//! configuration.

use crate::config;
use serde::{Deserialize, Serialize};

/// Parameters accepted by [`Searcher::init`](crate::searcher::Searcher::init).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearcherParams {
    /// Beam width for layer-0 search. The effective width of a query is
    /// `max(ef, k)`.
    #[serde(default = "default_ef")]
    pub ef: usize,
    /// Adaptive-mode (OMEGA) parameters.
    #[serde(default)]
    pub omega: OmegaParams,
}

/// Adaptive-mode parameters, keyed `omega.*` in flat configuration systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmegaParams {
    /// Arm adaptive mode at load time (`omega.enabled`).
    #[serde(default)]
    pub enabled: bool,
    /// Target recall passed to the predictor (`omega.target_recall`).
    #[serde(default = "default_target_recall")]
    pub target_recall: f32,
    /// Disable adaptive mode on graphs smaller than this
    /// (`omega.min_vector_threshold`).
    #[serde(default = "default_min_vector_threshold")]
    pub min_vector_threshold: u32,
    /// Filesystem path to the predictor model bundle (`omega.model_dir`).
    /// Empty means no model.
    #[serde(default)]
    pub model_dir: String,
}

fn default_ef() -> usize {
    config::DEFAULT_EF_SEARCH
}

fn default_target_recall() -> f32 {
    config::DEFAULT_TARGET_RECALL
}

fn default_min_vector_threshold() -> u32 {
    config::DEFAULT_MIN_VECTOR_THRESHOLD
}

impl Default for SearcherParams {
    fn default() -> Self {
        Self { ef: default_ef(), omega: OmegaParams::default() }
    }
}

impl Default for OmegaParams {
    fn default() -> Self {
        Self {
            enabled: false,
            target_recall: default_target_recall(),
            min_vector_threshold: default_min_vector_threshold(),
            model_dir: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table() {
        let p = SearcherParams::default();
        assert!(!p.omega.enabled);
        assert_eq!(p.omega.target_recall, 0.95);
        assert_eq!(p.omega.min_vector_threshold, 10_000);
        assert!(p.omega.model_dir.is_empty());
        assert_eq!(p.ef, config::DEFAULT_EF_SEARCH);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let p: SearcherParams =
            serde_json::from_str(r#"{"omega": {"enabled": true, "model_dir": "/tmp/m"}}"#).unwrap();
        assert!(p.omega.enabled);
        assert_eq!(p.omega.model_dir, "/tmp/m");
        assert_eq!(p.omega.target_recall, 0.95);
        assert_eq!(p.ef, config::DEFAULT_EF_SEARCH);
    }
}
