//! Reusable per-query search context.
//!
//! Owns the heaps, visited filter, scratch buffers, and result vector so
//! repeated searches on the same thread allocate nothing. A context is
//! thread-affine: it must not be shared across threads concurrently, though
//! it may migrate between searches.

use crate::search::heaps::{CandidateHeap, TopkHeap};
use crate::search::visited::VisitedFilter;

/// Cooperative cancellation predicate, checked once per popped candidate.
pub type CancelFn = Box<dyn Fn() -> bool + Send>;

/// Per-query work counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontier pops consumed.
    pub hops: usize,
    /// Nodes scored against the query.
    pub scored: usize,
}

/// Mutable state for one in-flight query, recyclable across queries.
pub struct SearchContext {
    topk: usize,
    threshold: Option<f32>,
    cancel: Option<CancelFn>,
    pub(crate) visited: VisitedFilter,
    pub(crate) candidates: CandidateHeap,
    pub(crate) best: TopkHeap,
    pub(crate) scratch_ids: Vec<u32>,
    pub(crate) scratch_dists: Vec<f32>,
    pub(crate) stats: SearchStats,
    results: Vec<(u64, f32)>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self {
            topk: 0,
            threshold: None,
            cancel: None,
            visited: VisitedFilter::default(),
            candidates: CandidateHeap::new(),
            best: TopkHeap::new(),
            scratch_ids: Vec::new(),
            scratch_dists: Vec::new(),
            stats: SearchStats::default(),
            results: Vec::new(),
        }
    }

    /// Number of results requested by the next search.
    pub fn set_topk(&mut self, k: usize) {
        self.topk = k;
    }

    pub fn topk(&self) -> usize {
        self.topk
    }

    /// Radius filter in the caller's score convention; results strictly
    /// beyond it are dropped.
    pub fn set_threshold(&mut self, radius: f32) {
        self.threshold = Some(radius);
    }

    pub fn reset_threshold(&mut self) {
        self.threshold = None;
    }

    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    /// Install a cancellation predicate. The beam loop polls it once per
    /// popped candidate; when it reports true the search returns
    /// `Cancelled` with whatever the top-k already holds.
    pub fn set_cancellation(&mut self, cancel: CancelFn) {
        self.cancel = Some(cancel);
    }

    pub fn clear_cancellation(&mut self) {
        self.cancel = None;
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|f| f())
    }

    /// Ordered `(key, score)` pairs from the most recent search.
    pub fn results(&self) -> &[(u64, f32)] {
        &self.results
    }

    /// Work counters from the most recent search.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset per-query state ahead of a search over `vector_count` nodes.
    pub(crate) fn begin(&mut self, vector_count: usize) {
        self.visited.ensure_capacity(vector_count);
        self.visited.clear();
        self.candidates.clear();
        self.best.clear();
        self.scratch_ids.clear();
        self.scratch_dists.clear();
        self.stats = SearchStats::default();
        self.results.clear();
    }

    pub(crate) fn clear_results(&mut self) {
        self.results.clear();
    }

    pub(crate) fn set_results(&mut self, results: impl Iterator<Item = (u64, f32)>) {
        self.results.clear();
        self.results.extend(results);
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("topk", &self.topk)
            .field("threshold", &self.threshold)
            .field("cancel", &self.cancel.is_some())
            .field("results", &self.results.len())
            .finish()
    }
}
