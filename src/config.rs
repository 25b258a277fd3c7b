//! Compile-time defaults for omega-search.
//!
//! Build-time graph parameters, search beam widths, and predictor thresholds
//! are defined here. Runtime overrides travel through
//! [`SearcherParams`](crate::params::SearcherParams).

/// Default number of bidirectional links per node on levels above 0.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64.
pub const DEFAULT_M: usize = 16;

/// Default maximum links per node at level 0 (conventionally `2 * M`).
pub const DEFAULT_M0: usize = 32;

/// Default candidate list size during graph construction.
///
/// Controls the beam width used to collect link candidates while inserting.
/// Higher values produce a better graph but slow down the build.
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default beam width (`ef`) for layer-0 search.
///
/// Higher values improve recall at the cost of latency. The effective beam
/// width for a query is `max(ef, k)`.
pub const DEFAULT_EF_SEARCH: usize = 100;

/// Maximum number of levels in the graph.
pub const DEFAULT_MAX_LEVELS: usize = 16;

/// Default target recall handed to the predictor in adaptive mode.
pub const DEFAULT_TARGET_RECALL: f32 = 0.95;

/// Default minimum corpus size for adaptive mode.
///
/// Below this vector count the predictor's statistics are too noisy to
/// beat the deterministic baseline, so adaptive mode stays off.
pub const DEFAULT_MIN_VECTOR_THRESHOLD: u32 = 10_000;

/// Sliding-window length used by the predictor when the loaded model does
/// not carry its own.
pub const DEFAULT_OMEGA_WINDOW: usize = 64;

/// Default seed for level assignment during construction.
pub const DEFAULT_BUILD_SEED: u64 = 0x5eed_0123;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum number of results (`k`) per search request.
pub const MAX_K: usize = 10_000;
