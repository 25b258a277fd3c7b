//! Beam-search heaps.
//!
//! [`CandidateHeap`] is the unbounded min-heap driving the frontier;
//! [`TopkHeap`] is the bounded max-heap holding the best set seen so far,
//! worst at the root for O(1) eviction. Both are ordinary binary heaps over
//! `OrderedFloat<f32>`; at the beam widths in use nothing fancier pays off.
//! Ties order by node id so extraction is fully deterministic.

use crate::graph::NodeId;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A scored node: internal (lower-is-better) distance plus id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub dist: f32,
    pub node: NodeId,
}

impl Scored {
    #[inline]
    pub fn new(dist: f32, node: NodeId) -> Self {
        Self { dist, node }
    }

    #[inline]
    fn ord_key(self) -> (OrderedFloat<f32>, NodeId) {
        (OrderedFloat(self.dist), self.node)
    }

    #[inline]
    fn from_key(key: (OrderedFloat<f32>, NodeId)) -> Self {
        Self { dist: key.0 .0, node: key.1 }
    }
}

/// Min-heap over distance: the beam frontier.
#[derive(Debug, Default)]
pub struct CandidateHeap {
    heap: BinaryHeap<Reverse<(OrderedFloat<f32>, NodeId)>>,
}

impl CandidateHeap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, item: Scored) {
        self.heap.push(Reverse(item.ord_key()));
    }

    #[inline]
    pub fn pop_min(&mut self) -> Option<Scored> {
        self.heap.pop().map(|Reverse(key)| Scored::from_key(key))
    }

    #[inline]
    pub fn peek_min(&self) -> Option<Scored> {
        self.heap.peek().map(|&Reverse(key)| Scored::from_key(key))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Bounded max-heap over distance: the current best set.
///
/// Pushing into a full heap rejects an element strictly worse than the
/// current worst and otherwise replaces the worst.
#[derive(Debug, Default)]
pub struct TopkHeap {
    heap: BinaryHeap<(OrderedFloat<f32>, NodeId)>,
    limit: usize,
}

impl TopkHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bound. Existing worst entries are evicted if the new bound
    /// is tighter.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.heap.len() > limit {
            self.heap.pop();
        }
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[inline]
    pub fn push(&mut self, item: Scored) {
        if self.heap.len() < self.limit {
            self.heap.push(item.ord_key());
        } else if let Some(&worst) = self.heap.peek() {
            if item.ord_key() <= worst {
                self.heap.pop();
                self.heap.push(item.ord_key());
            }
        }
    }

    #[inline]
    pub fn peek_max(&self) -> Option<Scored> {
        self.heap.peek().map(|&key| Scored::from_key(key))
    }

    #[inline]
    pub fn pop_max(&mut self) -> Option<Scored> {
        self.heap.pop().map(Scored::from_key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Drain into a distance-ascending vector, leaving the heap empty and
    /// reusable.
    pub fn take_sorted(&mut self) -> Vec<Scored> {
        std::mem::take(&mut self.heap)
            .into_sorted_vec()
            .into_iter()
            .map(Scored::from_key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_heap_pops_ascending() {
        let mut h = CandidateHeap::new();
        for (d, n) in [(3.0, 3), (1.0, 1), (2.0, 2)] {
            h.push(Scored::new(d, n));
        }
        assert_eq!(h.peek_min().unwrap().node, 1);
        assert_eq!(h.pop_min().unwrap().dist, 1.0);
        assert_eq!(h.pop_min().unwrap().dist, 2.0);
        assert_eq!(h.pop_min().unwrap().dist, 3.0);
        assert!(h.is_empty());
    }

    #[test]
    fn test_candidate_heap_tie_breaks_by_node() {
        let mut h = CandidateHeap::new();
        h.push(Scored::new(1.0, 9));
        h.push(Scored::new(1.0, 2));
        assert_eq!(h.pop_min().unwrap().node, 2);
        assert_eq!(h.pop_min().unwrap().node, 9);
    }

    #[test]
    fn test_topk_bounded_replacement() {
        let mut h = TopkHeap::new();
        h.set_limit(2);
        h.push(Scored::new(5.0, 1));
        h.push(Scored::new(3.0, 2));
        // Strictly worse than the worst: rejected.
        h.push(Scored::new(9.0, 3));
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek_max().unwrap().dist, 5.0);
        // Better: replaces the worst.
        h.push(Scored::new(1.0, 4));
        assert_eq!(h.len(), 2);
        assert_eq!(h.peek_max().unwrap().dist, 3.0);
    }

    #[test]
    fn test_topk_take_sorted_ascending() {
        let mut h = TopkHeap::new();
        h.set_limit(4);
        for (d, n) in [(4.0, 4), (1.0, 1), (3.0, 3), (2.0, 2)] {
            h.push(Scored::new(d, n));
        }
        let sorted = h.take_sorted();
        let dists: Vec<f32> = sorted.iter().map(|s| s.dist).collect();
        assert_eq!(dists, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(h.is_empty());
        // Heap remains usable after draining.
        h.push(Scored::new(0.5, 9));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn test_topk_tighter_limit_evicts() {
        let mut h = TopkHeap::new();
        h.set_limit(3);
        for (d, n) in [(1.0, 1), (2.0, 2), (3.0, 3)] {
            h.push(Scored::new(d, n));
        }
        h.set_limit(1);
        assert_eq!(h.len(), 1);
        assert_eq!(h.peek_max().unwrap().dist, 1.0);
    }
}
