//! Adaptive early-termination ("OMEGA") predictor.
//!
//! [`OmegaModel`] is the loaded, immutable model bundle shared by all
//! queries; [`OmegaState`] is the per-query handle that ingests hop and
//! visit events and answers whether further beam work is statistically
//! unlikely to improve recall. The search core treats both as opaque: the
//! only contract it relies on is that `should_stop()` is false until
//! `should_predict()` reports enough evidence.

/// Predictor model bundle: load and inspect.
pub mod model;
/// Per-query predictor handle.
pub mod state;

pub use model::OmegaModel;
pub use state::{OmegaState, OmegaStats};
