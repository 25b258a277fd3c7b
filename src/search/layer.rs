//! Hierarchical traversal: upper-layer greedy descent and the layer-0 beam.
//!
//! Both passes are free functions over the graph view, the distance
//! calculator, and the query context, so the baseline and adaptive searchers
//! share them verbatim; the adaptive variant differs only in the
//! [`SearchProbe`] it plugs into the beam loop.

use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::search::calculator::QueryDistance;
use crate::search::context::SearchContext;
use crate::search::heaps::Scored;

/// Observation hooks the beam loop feeds while it runs.
///
/// The default implementations make the baseline a zero-cost no-op; the
/// adaptive searcher implements them on its predictor handle.
pub(crate) trait SearchProbe {
    fn on_hop(&mut self) {}
    fn on_visit(&mut self, _node: NodeId, _dist: f32, _entered_best: bool) {}
    /// Consulted after the convergence test and before the next pop.
    fn should_stop(&mut self) -> bool {
        false
    }
}

/// Probe of the deterministic baseline.
pub(crate) struct NoProbe;

impl SearchProbe for NoProbe {}

/// Greedy strict-improvement descent from `max_level` down to level 1.
///
/// No visited filter is needed above layer 0: strict improvement rules out
/// cycles. Ties keep the currently-held node.
pub(crate) fn greedy_descent(
    graph: &Graph,
    calc: &QueryDistance<'_>,
    ctx: &mut SearchContext,
    entry: Scored,
) -> Result<Scored> {
    let mut best = entry;
    for level in (1..=graph.max_level()).rev() {
        loop {
            ctx.scratch_ids.clear();
            ctx.scratch_ids.extend_from_slice(graph.neighbors(level, best.node));
            if ctx.scratch_ids.is_empty() {
                break;
            }
            calc.score_batch(&ctx.scratch_ids, &mut ctx.scratch_dists)?;
            ctx.stats.scored += ctx.scratch_ids.len();

            let mut next = best;
            for i in 0..ctx.scratch_ids.len() {
                let d = ctx.scratch_dists[i];
                if d < next.dist {
                    next = Scored::new(d, ctx.scratch_ids[i]);
                }
            }
            if next.node == best.node {
                break;
            }
            best = next;
        }
    }
    Ok(best)
}

/// Layer-0 beam search. Seeds the frontier and best set with the descent
/// result and runs until the frontier converges, the probe calls a stop, or
/// the caller cancels. On cancellation the best set is left intact so the
/// caller can emit partial results.
pub(crate) fn beam_search(
    graph: &Graph,
    calc: &QueryDistance<'_>,
    ctx: &mut SearchContext,
    seed: Scored,
    ef: usize,
    probe: &mut dyn SearchProbe,
) -> Result<()> {
    ctx.best.set_limit(ef);
    ctx.candidates.push(seed);
    ctx.best.push(seed);
    ctx.visited.mark(seed.node);
    let mut lower_bound = seed.dist;

    loop {
        let Some(head) = ctx.candidates.peek_min() else {
            break;
        };
        if head.dist > lower_bound && ctx.best.len() >= ef {
            break;
        }
        if probe.should_stop() {
            break;
        }
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let cur = ctx.candidates.pop_min().expect("frontier non-empty after peek");
        ctx.stats.hops += 1;
        probe.on_hop();

        ctx.scratch_ids.clear();
        for &nb in graph.neighbors(0, cur.node) {
            if !ctx.visited.mark(nb) {
                ctx.scratch_ids.push(nb);
            }
        }
        calc.score_batch(&ctx.scratch_ids, &mut ctx.scratch_dists)?;
        ctx.stats.scored += ctx.scratch_ids.len();

        for i in 0..ctx.scratch_ids.len() {
            let node = ctx.scratch_ids[i];
            let dn = ctx.scratch_dists[i];
            // Admission is judged before the best set mutates; the probe
            // sees the same verdict the heap acts on.
            let admit = ctx.best.len() < ef || dn < lower_bound;
            probe.on_visit(node, dn, admit);
            if admit {
                ctx.candidates.push(Scored::new(dn, node));
                ctx.best.push(Scored::new(dn, node));
                if ctx.best.len() >= ef {
                    lower_bound = ctx.best.peek_max().map_or(f32::MAX, |s| s.dist);
                }
            }
        }
    }
    Ok(())
}

/// Drain the best set into ordered `(key, score)` results: ascending by
/// internal distance, truncated to `k`, radius-filtered, scores mapped back
/// to the caller's convention.
pub(crate) fn emit_results(graph: &Graph, ctx: &mut SearchContext, k: usize) {
    let metric = graph.meta().metric;
    let mut items = ctx.best.take_sorted();
    items.truncate(k);
    if let Some(radius) = ctx.threshold() {
        let limit = metric.denormalize(radius);
        items.retain(|s| s.dist <= limit);
    }
    ctx.set_results(items.into_iter().map(|s| (graph.key_of(s.node), metric.denormalize(s.dist))));
}
