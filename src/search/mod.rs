//! Search primitives shared by the baseline and adaptive paths.
//!
//! The beam machinery lives in [`layer`]; everything else here is the
//! per-query state it runs against. [`brute_force`] is the exhaustive
//! reference scan used by recall validation.

/// Per-query distance calculator with batch scoring.
pub mod calculator;
/// Reusable per-query context: heaps, visited filter, results, cancellation.
pub mod context;
/// Candidate min-heap and bounded top-k max-heap.
pub mod heaps;
/// Greedy descent and layer-0 beam search.
pub(crate) mod layer;
/// Generation-based visited filter.
pub mod visited;

pub use context::{SearchContext, SearchStats};
pub use heaps::{CandidateHeap, Scored, TopkHeap};
pub use visited::VisitedFilter;

use crate::error::Result;
use crate::graph::Graph;

/// Exhaustive k-NN scan over every vector in the graph.
///
/// Linear in corpus size; used as the ground-truth oracle when validating
/// graph search recall.
pub fn brute_force(graph: &Graph, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
    let metric = graph.meta().metric;
    let mut scored: Vec<Scored> = Vec::with_capacity(graph.vector_count());
    for node in 0..graph.vector_count() as u32 {
        scored.push(Scored::new(metric.distance(query, graph.vector(node)?), node));
    }
    scored.sort_unstable_by(|a, b| {
        a.dist
            .partial_cmp(&b.dist)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.node.cmp(&b.node))
    });
    scored.truncate(k);
    Ok(scored
        .into_iter()
        .map(|s| (graph.key_of(s.node), metric.denormalize(s.dist)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Metric;
    use crate::graph::GraphBuilder;
    use crate::meta::IndexMeta;

    #[test]
    fn test_brute_force_orders_by_distance() {
        let meta = IndexMeta::new(2, Metric::SquaredEuclidean);
        let mut b = GraphBuilder::new(meta).unwrap();
        for i in 0..10 {
            b.insert(i as u64, &[i as f32, 0.0]).unwrap();
        }
        let g = b.finish();
        let hits = brute_force(&g, &[3.2, 0.0], 3).unwrap();
        let keys: Vec<u64> = hits.iter().map(|&(k, _)| k).collect();
        assert_eq!(keys, vec![3, 4, 2]);
    }

    #[test]
    fn test_brute_force_inner_product_scores() {
        let meta = IndexMeta::new(2, Metric::InnerProduct);
        let mut b = GraphBuilder::new(meta).unwrap();
        for i in 0..5 {
            b.insert(i as u64, &[i as f32, 1.0]).unwrap();
        }
        let g = b.finish();
        let hits = brute_force(&g, &[1.0, 0.0], 2).unwrap();
        // Largest inner product first, scores back in caller convention.
        assert_eq!(hits[0], (4, 4.0));
        assert_eq!(hits[1], (3, 3.0));
    }
}
