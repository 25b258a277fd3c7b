//! Per-query predictor handle.
//!
//! Created after the upper-layer descent, destroyed with the query. Ingests
//! one event per frontier pop (`report_hop`) and one per scored neighbor
//! (`report_visit`), and maintains a sliding window over whether recent
//! visits still improved the best set. `should_predict` gates
//! `should_stop`: with an under-full window there is no evidence, so the
//! answer is always "keep going".

use crate::error::{Error, Result};
use crate::graph::NodeId;
use crate::omega::model::{Features, OmegaModel};
use crate::search::layer::SearchProbe;
use std::collections::VecDeque;

/// Diagnostic counters of one query's predictor handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OmegaStats {
    /// Frontier pops observed.
    pub hops: u64,
    /// Scored neighbors observed.
    pub cmps: u64,
    /// Scored neighbors that entered the best set.
    pub collected: u64,
}

/// Stateful per-query wrapper around a loaded [`OmegaModel`].
#[derive(Debug)]
pub struct OmegaState<'m> {
    model: &'m OmegaModel,
    target_recall: f32,
    k: usize,
    window_size: usize,
    // true = the visit entered the best set
    window: VecDeque<bool>,
    stats: OmegaStats,
    dist_start: f32,
    best_dist: f32,
}

impl<'m> OmegaState<'m> {
    /// Acquire a handle for one query. Fails when the model is unusable or
    /// the parameters are out of range; the searcher logs and falls back to
    /// baseline in that case.
    pub fn new(
        model: &'m OmegaModel,
        target_recall: f32,
        k: usize,
        window_size: usize,
    ) -> Result<Self> {
        if !model.is_loaded() {
            return Err(Error::InvalidState("predictor model is not loaded"));
        }
        if !(0.0..=1.0).contains(&target_recall) {
            return Err(Error::InvalidArgument(format!(
                "target recall {target_recall} outside [0, 1]"
            )));
        }
        if k == 0 || window_size == 0 {
            return Err(Error::InvalidArgument(format!(
                "predictor handle needs k > 0 and a window (k={k}, window={window_size})"
            )));
        }
        Ok(Self {
            model,
            target_recall,
            k,
            window_size,
            window: VecDeque::with_capacity(window_size),
            stats: OmegaStats::default(),
            dist_start: 0.0,
            best_dist: f32::MAX,
        })
    }

    /// Record the distance to the entry point after the upper-layer descent.
    pub fn set_dist_start(&mut self, dist: f32) {
        self.dist_start = dist;
        self.best_dist = dist;
    }

    /// One frontier pop consumed.
    pub fn report_hop(&mut self) {
        self.stats.hops += 1;
    }

    /// One scored neighbor; `entered_best` is the admission verdict judged
    /// before the best set mutated.
    pub fn report_visit(&mut self, _node: NodeId, dist: f32, entered_best: bool) {
        self.stats.cmps += 1;
        if entered_best {
            self.stats.collected += 1;
        }
        if dist < self.best_dist {
            self.best_dist = dist;
        }
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(entered_best);
    }

    /// Whether enough evidence has accumulated for a meaningful prediction:
    /// the sliding window is full and at least `k` visits entered the best
    /// set.
    pub fn should_predict(&self) -> bool {
        self.window.len() >= self.window_size && self.stats.collected >= self.k as u64
    }

    /// Whether further beam work is unlikely to improve recall below the
    /// model's estimate of the target. Always false before
    /// [`should_predict`](Self::should_predict) holds.
    pub fn should_stop(&self) -> bool {
        if !self.should_predict() {
            return false;
        }
        let gained = self.window.iter().filter(|&&entered| entered).count();
        let features = Features {
            hops: self.stats.hops,
            cmps: self.stats.cmps,
            window_gain: gained as f32 / self.window.len() as f32,
            dist_ratio: if self.dist_start.abs() > f32::EPSILON {
                self.best_dist / self.dist_start
            } else {
                1.0
            },
        };
        self.model.predicted_recall(&features) >= self.target_recall
    }

    /// Diagnostic counters.
    pub fn stats(&self) -> OmegaStats {
        self.stats
    }
}

impl SearchProbe for OmegaState<'_> {
    fn on_hop(&mut self) {
        self.report_hop();
    }

    fn on_visit(&mut self, node: NodeId, dist: f32, entered_best: bool) {
        self.report_visit(node, dist, entered_best);
    }

    fn should_stop(&mut self) -> bool {
        OmegaState::should_stop(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::omega::model::test_support::constant_model;

    #[test]
    fn test_rejects_unloaded_model() {
        let model: OmegaModel = serde_json::from_str(
            r#"{"version": 1, "window_size": 4, "bias": 0.0, "w_hops": 0.0,
                "w_cmps": 0.0, "w_window_gain": 0.0, "w_dist_ratio": 0.0}"#,
        )
        .unwrap();
        assert!(OmegaState::new(&model, 0.95, 10, 4).is_err());
    }

    #[test]
    fn test_rejects_bad_params() {
        let model = constant_model(0.0, 4);
        assert!(OmegaState::new(&model, 1.5, 10, 4).is_err());
        assert!(OmegaState::new(&model, 0.95, 0, 4).is_err());
        assert!(OmegaState::new(&model, 0.95, 10, 0).is_err());
    }

    #[test]
    fn test_no_stop_before_window_full() {
        // Eager model: would stop on any full window.
        let model = constant_model(10.0, 4);
        let mut state = OmegaState::new(&model, 0.95, 1, 4).unwrap();
        state.set_dist_start(100.0);
        for i in 0..3 {
            state.report_visit(i, 10.0 - i as f32, true);
            assert!(!state.should_predict());
            assert!(!state.should_stop());
        }
        state.report_visit(3, 1.0, true);
        assert!(state.should_predict());
        assert!(state.should_stop());
    }

    #[test]
    fn test_no_stop_before_k_collected() {
        let model = constant_model(10.0, 2);
        let mut state = OmegaState::new(&model, 0.95, 5, 2).unwrap();
        state.set_dist_start(100.0);
        // Window fills, but fewer than k visits entered the best set.
        state.report_visit(0, 5.0, true);
        state.report_visit(1, 6.0, false);
        state.report_visit(2, 7.0, false);
        assert!(!state.should_predict());
        assert!(!state.should_stop());
    }

    #[test]
    fn test_pessimistic_model_never_stops() {
        let model = constant_model(-10.0, 2);
        let mut state = OmegaState::new(&model, 0.95, 1, 2).unwrap();
        state.set_dist_start(100.0);
        for i in 0..50 {
            state.report_hop();
            state.report_visit(i, 50.0, true);
        }
        assert!(state.should_predict());
        assert!(!state.should_stop());
    }

    #[test]
    fn test_stats_counters() {
        let model = constant_model(0.0, 8);
        let mut state = OmegaState::new(&model, 0.9, 2, 8).unwrap();
        state.set_dist_start(10.0);
        state.report_hop();
        state.report_hop();
        state.report_visit(1, 4.0, true);
        state.report_visit(2, 6.0, false);
        state.report_visit(3, 3.0, true);
        let stats = state.stats();
        assert_eq!(stats, OmegaStats { hops: 2, cmps: 3, collected: 2 });
    }

    #[test]
    fn test_window_slides() {
        let model = constant_model(0.0, 2);
        let mut state = OmegaState::new(&model, 0.9, 1, 2).unwrap();
        state.set_dist_start(10.0);
        state.report_visit(1, 4.0, true);
        state.report_visit(2, 5.0, true);
        state.report_visit(3, 6.0, false);
        state.report_visit(4, 7.0, false);
        // Window holds only the two most recent outcomes.
        assert_eq!(state.window.len(), 2);
        assert!(state.window.iter().all(|&entered| !entered));
    }
}
