//! Per-query distance calculator.
//!
//! Binds one query vector to the graph and metric at search start and
//! answers distance requests for the rest of that query. One instance is
//! used by exactly one in-flight query; identical inputs yield identical
//! bits.

use crate::distance::Metric;
use crate::error::Result;
use crate::graph::{Graph, NodeId};

#[derive(Debug)]
pub struct QueryDistance<'a> {
    graph: &'a Graph,
    metric: Metric,
    query: &'a [f32],
}

impl<'a> QueryDistance<'a> {
    /// Bind `query` for the duration of one search. The caller has already
    /// verified the query shape against the index meta.
    pub fn new(graph: &'a Graph, query: &'a [f32]) -> Self {
        Self { graph, metric: graph.meta().metric, query }
    }

    /// Internal (lower-is-better) distance to a stored node.
    #[inline]
    pub fn dist_to(&self, node: NodeId) -> Result<f32> {
        let stored = self.graph.vector(node)?;
        Ok(self.metric.distance(self.query, stored))
    }

    /// Internal distance to a raw vector not resident in the graph.
    #[inline]
    pub fn dist_raw(&self, raw: &[f32]) -> f32 {
        self.metric.distance(self.query, raw)
    }

    /// Score a batch of nodes, appending one distance per id to `out`.
    /// The next vector is prefetched while the current one is scored.
    pub fn score_batch(&self, ids: &[NodeId], out: &mut Vec<f32>) -> Result<()> {
        out.clear();
        out.reserve(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            if i + 1 < ids.len() {
                self.graph.prefetch_vector(ids[i + 1]);
            }
            out.push(self.dist_to(id)?);
        }
        Ok(())
    }
}
