//! Immutable hierarchical proximity graph.
//!
//! [`Graph`] is the loaded, read-only representation the searcher traverses;
//! [`GraphBuilder`] constructs one; [`GraphSource`] abstracts where a graph
//! is materialized from at load time.

/// HNSW construction: level assignment, bidirectional linking, pruning.
pub mod builder;
/// Read-only graph view backed by a Struct-of-Arrays layout.
pub mod view;

pub use builder::{BuildParams, GraphBuilder};
pub use view::{Graph, GraphSource, MemorySource, NodeId, INVALID_NODE_ID};
