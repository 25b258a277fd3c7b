//! # omega-search
//!
//! Adaptive graph-based nearest-neighbor search core. Answers k-NN and
//! radius queries over a hierarchical proximity graph (HNSW-style) with two
//! interchangeable search paths: a deterministic hierarchical beam search,
//! and an adaptive variant that consults a pre-trained predictor to stop the
//! layer-0 beam once the target recall is statistically likely to have been
//! reached.
//!
//! The loaded graph is immutable and shared across threads; all per-query
//! state (heaps, visited filter, result buffer) lives in a reusable
//! [`SearchContext`] so the hot path allocates nothing.

/// Compile-time defaults: graph fan-out, beam widths, predictor thresholds.
pub mod config;
/// Distance metrics and their scalar kernels, normalized to lower-is-better.
pub mod distance;
/// Typed error kinds surfaced by the searcher lifecycle and query path.
pub mod error;
/// Immutable proximity graph: read-only view and HNSW construction.
pub mod graph;
/// Index and query metadata: data type, dimension, metric.
pub mod meta;
/// Predictor model bundle and the per-query early-termination handle.
pub mod omega;
/// Runtime searcher parameters with serde defaults.
pub mod params;
/// Search primitives: visited filter, heaps, beam search, query context.
pub mod search;
/// Searcher lifecycle: init/load/unload/cleanup and query routing.
pub mod searcher;

pub use distance::Metric;
pub use error::{Error, Result};
pub use graph::{Graph, GraphBuilder, GraphSource, MemorySource, NodeId, INVALID_NODE_ID};
pub use meta::{DataType, IndexMeta, QueryMeta};
pub use params::{OmegaParams, SearcherParams};
pub use search::SearchContext;
pub use searcher::Searcher;
