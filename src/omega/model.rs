//! Predictor model bundle.
//!
//! A bundle directory holds one `model.json` with the trained coefficients
//! of a logistic recall estimator. Training happens elsewhere; this module
//! only loads the bundle and evaluates it. Everything beyond the inference
//! surface is private so bundles can change shape without touching search
//! code.

use crate::config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Model format version this build understands.
const SUPPORTED_VERSION: u32 = 1;

/// Query-time features the estimator consumes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Features {
    /// Frontier pops so far.
    pub hops: u64,
    /// Distance comparisons so far.
    pub cmps: u64,
    /// Fraction of the sliding window that entered the best set.
    pub window_gain: f32,
    /// Current best distance over the entry-point distance.
    pub dist_ratio: f32,
}

/// Loaded predictor model: a logistic estimate of the recall already
/// achieved by the beam at its current position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmegaModel {
    version: u32,
    /// Sliding-window length the model was trained against.
    #[serde(default)]
    window_size: usize,
    bias: f32,
    w_hops: f32,
    w_cmps: f32,
    w_window_gain: f32,
    w_dist_ratio: f32,
    #[serde(skip)]
    loaded: bool,
}

impl OmegaModel {
    /// File name of the coefficient bundle inside `model_dir`.
    pub const BUNDLE_FILE: &'static str = "model.json";

    /// Load a bundle from `model_dir`. I/O and parse failures surface as
    /// storage faults; the caller decides whether to fall back.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let path = model_dir.join(Self::BUNDLE_FILE);
        let bytes = std::fs::read(&path)?;
        let mut model: OmegaModel = serde_json::from_slice(&bytes)?;
        if model.version != SUPPORTED_VERSION {
            return Err(Error::StorageFault(format!(
                "unsupported predictor model version {} in {}",
                model.version,
                path.display()
            )));
        }
        if model.window_size == 0 {
            model.window_size = config::DEFAULT_OMEGA_WINDOW;
        }
        model.loaded = true;
        Ok(model)
    }

    /// Whether the bundle was fully materialized.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Sliding-window length per-query handles should use.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Estimated recall already achieved, in \[0, 1\].
    pub(crate) fn predicted_recall(&self, f: &Features) -> f32 {
        let x = self.bias
            + self.w_hops * (1.0 + f.hops as f32).ln()
            + self.w_cmps * (1.0 + f.cmps as f32).ln()
            + self.w_window_gain * f.window_gain
            + self.w_dist_ratio * f.dist_ratio;
        1.0 / (1.0 + (-x).exp())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A hand-built model for tests: `bias` dominates, so the estimator is
    /// effectively a constant. Strongly negative never stops; strongly
    /// positive stops as soon as the window fills.
    pub(crate) fn constant_model(bias: f32, window_size: usize) -> OmegaModel {
        OmegaModel {
            version: SUPPORTED_VERSION,
            window_size,
            bias,
            w_hops: 0.0,
            w_cmps: 0.0,
            w_window_gain: 0.0,
            w_dist_ratio: 0.0,
            loaded: true,
        }
    }

    /// Serialize a model into `dir/model.json` the way a training job would.
    pub(crate) fn write_bundle(dir: &Path, model: &OmegaModel) {
        let path = dir.join(OmegaModel::BUNDLE_FILE);
        std::fs::write(path, serde_json::to_vec_pretty(model).unwrap()).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let model = test_support::constant_model(-3.0, 16);
        test_support::write_bundle(dir.path(), &model);

        let loaded = OmegaModel::load(dir.path()).unwrap();
        assert!(loaded.is_loaded());
        assert_eq!(loaded.window_size(), 16);
    }

    #[test]
    fn test_missing_bundle_is_storage_fault() {
        let dir = TempDir::new().unwrap();
        let err = OmegaModel::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::StorageFault(_)));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(OmegaModel::BUNDLE_FILE),
            r#"{"version": 99, "window_size": 8, "bias": 0.0, "w_hops": 0.0,
                "w_cmps": 0.0, "w_window_gain": 0.0, "w_dist_ratio": 0.0}"#,
        )
        .unwrap();
        assert!(OmegaModel::load(dir.path()).is_err());
    }

    #[test]
    fn test_zero_window_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(OmegaModel::BUNDLE_FILE),
            r#"{"version": 1, "bias": 0.0, "w_hops": 0.0,
                "w_cmps": 0.0, "w_window_gain": 0.0, "w_dist_ratio": 0.0}"#,
        )
        .unwrap();
        let model = OmegaModel::load(dir.path()).unwrap();
        assert_eq!(model.window_size(), crate::config::DEFAULT_OMEGA_WINDOW);
    }

    #[test]
    fn test_predicted_recall_monotone_in_bias() {
        let low = test_support::constant_model(-8.0, 8);
        let high = test_support::constant_model(8.0, 8);
        let f = Features { hops: 10, cmps: 100, window_gain: 0.1, dist_ratio: 0.5 };
        assert!(low.predicted_recall(&f) < 0.01);
        assert!(high.predicted_recall(&f) > 0.99);
    }

    #[test]
    fn test_unloaded_default_state() {
        let model: OmegaModel = serde_json::from_str(
            r#"{"version": 1, "window_size": 8, "bias": 0.0, "w_hops": 0.0,
                "w_cmps": 0.0, "w_window_gain": 0.0, "w_dist_ratio": 0.0}"#,
        )
        .unwrap();
        // Deserialized but not loaded through `load`: stays unloaded.
        assert!(!model.is_loaded());
    }
}
