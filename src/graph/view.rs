//! Read-only graph view.
//!
//! The graph uses a Struct-of-Arrays layout for cache-friendly access:
//! all vector components live contiguously in one arena, with separate
//! arrays for keys, level assignments, and per-level neighbor lists. Once
//! loaded the structure is immutable; concurrent searches share it without
//! locking.

use crate::error::{Error, Result};
use crate::meta::IndexMeta;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Internal node identifier.
pub type NodeId = u32;

/// Reserved invalid node id.
pub const INVALID_NODE_ID: NodeId = u32::MAX;

/// Immutable hierarchical proximity graph.
///
/// Level 0 contains every node; each higher level is a sparser subset. A
/// non-empty graph has exactly one entry point at the current maximum level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub(crate) meta: IndexMeta,
    // SoA: vector arena, node_count * dimension components
    pub(crate) vectors: Vec<f32>,
    // Caller-assigned keys, surfaced in results
    pub(crate) keys: Vec<u64>,
    // [node][level][neighbor_ids], bounded by the build-time fan-out
    pub(crate) neighbors: Vec<Vec<Vec<NodeId>>>,
    pub(crate) levels: Vec<u8>,
    pub(crate) entry_point: Option<NodeId>,
    pub(crate) max_level: usize,
}

/// Portable software prefetch hint (L1 cache, read).
/// No-op on unsupported platforms.
#[inline(always)]
fn prefetch_read(ptr: *const u8) {
    #[cfg(target_arch = "aarch64")]
    unsafe {
        std::arch::asm!(
            "prfm pldl1keep, [{ptr}]",
            ptr = in(reg) ptr,
            options(nostack, preserves_flags)
        );
    }
    #[cfg(target_arch = "x86_64")]
    unsafe {
        std::arch::x86_64::_mm_prefetch(ptr as *const i8, std::arch::x86_64::_MM_HINT_T0);
    }
    #[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
    let _ = ptr;
}

impl Graph {
    pub(crate) fn empty(meta: IndexMeta) -> Self {
        Self {
            meta,
            vectors: Vec::new(),
            keys: Vec::new(),
            neighbors: Vec::new(),
            levels: Vec::new(),
            entry_point: None,
            max_level: 0,
        }
    }

    /// Entry point of the hierarchy; [`INVALID_NODE_ID`] iff the graph is
    /// empty.
    #[inline]
    pub fn entry_point(&self) -> NodeId {
        self.entry_point.unwrap_or(INVALID_NODE_ID)
    }

    /// Highest level currently populated.
    #[inline]
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Neighbor list of `node` at `level`; empty when the node does not
    /// participate in that level.
    #[inline]
    pub fn neighbors(&self, level: usize, node: NodeId) -> &[NodeId] {
        self.neighbors
            .get(node as usize)
            .and_then(|per_level| per_level.get(level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Vector payload of `node`. A reference outside the arena is a storage
    /// fault and aborts the query.
    #[inline]
    pub fn vector(&self, node: NodeId) -> Result<&[f32]> {
        let dim = self.meta.dimension;
        let start = node as usize * dim;
        self.vectors
            .get(start..start + dim)
            .ok_or_else(|| Error::StorageFault(format!("vector fetch out of bounds: node {node}")))
    }

    /// Caller-assigned key of `node`.
    #[inline]
    pub fn key_of(&self, node: NodeId) -> u64 {
        self.keys[node as usize]
    }

    /// Highest level `node` participates in.
    #[inline]
    pub fn level_of(&self, node: NodeId) -> usize {
        self.levels[node as usize] as usize
    }

    /// Number of vectors in the graph.
    #[inline]
    pub fn vector_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Prefetch a node's vector data into L1. Two cache lines for
    /// dimensions above 16 floats.
    #[inline(always)]
    pub fn prefetch_vector(&self, node: NodeId) {
        let start = node as usize * self.meta.dimension;
        if start < self.vectors.len() {
            let ptr = unsafe { self.vectors.as_ptr().add(start) as *const u8 };
            prefetch_read(ptr);
            if self.meta.dimension > 16 {
                prefetch_read(unsafe { ptr.add(64) });
            }
        }
    }
}

/// Where a graph is materialized from during `load`.
///
/// The on-disk segment format is the storage layer's concern; the searcher
/// only asks a source to produce the loaded, shareable graph.
pub trait GraphSource {
    fn open_graph(&self) -> Result<Arc<Graph>>;
}

/// In-memory source wrapping an already-built graph.
#[derive(Debug, Clone)]
pub struct MemorySource {
    graph: Arc<Graph>,
}

impl MemorySource {
    pub fn new(graph: Graph) -> Self {
        Self { graph: Arc::new(graph) }
    }
}

impl GraphSource for MemorySource {
    fn open_graph(&self) -> Result<Arc<Graph>> {
        Ok(Arc::clone(&self.graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Metric;

    fn two_node_graph() -> Graph {
        let meta = IndexMeta::new(2, Metric::SquaredEuclidean);
        Graph {
            meta,
            vectors: vec![0.0, 0.0, 3.0, 4.0],
            keys: vec![10, 20],
            neighbors: vec![vec![vec![1]], vec![vec![0]]],
            levels: vec![0, 0],
            entry_point: Some(0),
            max_level: 0,
        }
    }

    #[test]
    fn test_empty_graph_entry_point_invalid() {
        let g = Graph::empty(IndexMeta::new(4, Metric::SquaredEuclidean));
        assert_eq!(g.entry_point(), INVALID_NODE_ID);
        assert!(g.is_empty());
        assert_eq!(g.vector_count(), 0);
    }

    #[test]
    fn test_vector_access() {
        let g = two_node_graph();
        assert_eq!(g.vector(1).unwrap(), &[3.0, 4.0]);
        assert_eq!(g.key_of(1), 20);
    }

    #[test]
    fn test_vector_out_of_bounds_is_storage_fault() {
        let g = two_node_graph();
        assert!(matches!(g.vector(5), Err(Error::StorageFault(_))));
    }

    #[test]
    fn test_neighbors_above_node_level_empty() {
        let g = two_node_graph();
        assert_eq!(g.neighbors(0, 0), &[1]);
        assert!(g.neighbors(3, 0).is_empty());
    }

    #[test]
    fn test_memory_source_shares_graph() {
        let src = MemorySource::new(two_node_graph());
        let a = src.open_graph().unwrap();
        let b = src.open_graph().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_prefetch_no_panic() {
        let g = two_node_graph();
        g.prefetch_vector(0);
        g.prefetch_vector(99); // out of range is a silent no-op
    }
}
