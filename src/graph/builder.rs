//! HNSW graph construction.
//!
//! Inserts vectors one at a time with bidirectional links and diversity
//! pruning (Algorithm 4 from the HNSW paper). Level assignment draws from a
//! seeded generator so identical input produces an identical graph. The
//! builder is single-threaded; the searcher only ever sees the finished,
//! immutable [`Graph`].

use crate::config;
use crate::error::{Error, Result};
use crate::graph::view::{Graph, NodeId, INVALID_NODE_ID};
use crate::meta::IndexMeta;
use crate::search::calculator::QueryDistance;
use crate::search::heaps::{CandidateHeap, Scored, TopkHeap};
use crate::search::visited::VisitedFilter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build-time graph parameters.
#[derive(Debug, Clone)]
pub struct BuildParams {
    /// Links per node on levels above 0.
    pub m: usize,
    /// Links per node at level 0.
    pub m_max0: usize,
    /// Candidate beam width while inserting.
    pub ef_construction: usize,
    /// Hard cap on level assignment.
    pub max_levels: usize,
    /// Seed for level assignment.
    pub seed: u64,
}

impl Default for BuildParams {
    fn default() -> Self {
        Self {
            m: config::DEFAULT_M,
            m_max0: config::DEFAULT_M0,
            ef_construction: config::DEFAULT_EF_CONSTRUCTION,
            max_levels: config::DEFAULT_MAX_LEVELS,
            seed: config::DEFAULT_BUILD_SEED,
        }
    }
}

/// Incremental HNSW builder producing an immutable [`Graph`].
#[derive(Debug)]
pub struct GraphBuilder {
    graph: Graph,
    params: BuildParams,
    // Level multiplier 1/ln(M)
    ml: f64,
    rng: StdRng,
    visited: VisitedFilter,
}

impl GraphBuilder {
    pub fn new(meta: IndexMeta) -> Result<Self> {
        Self::with_params(meta, BuildParams::default())
    }

    pub fn with_params(meta: IndexMeta, params: BuildParams) -> Result<Self> {
        meta.validate()?;
        if params.m < 2 || params.m_max0 < params.m || params.ef_construction == 0 {
            return Err(Error::InvalidArgument(format!(
                "bad build params: m={} m_max0={} ef_construction={}",
                params.m, params.m_max0, params.ef_construction
            )));
        }
        let ml = 1.0 / (params.m as f64).ln();
        let rng = StdRng::seed_from_u64(params.seed);
        Ok(Self { graph: Graph::empty(meta), params, ml, rng, visited: VisitedFilter::default() })
    }

    pub fn len(&self) -> usize {
        self.graph.vector_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Exponentially-decaying level assignment.
    fn random_level(&mut self) -> usize {
        let r: f64 = self.rng.gen();
        let level = (-r.ln() * self.ml).floor() as usize;
        level.min(self.params.max_levels - 1)
    }

    /// Insert one vector under a caller-assigned key.
    pub fn insert(&mut self, key: u64, vector: &[f32]) -> Result<NodeId> {
        let dim = self.graph.meta.dimension;
        if vector.len() != dim {
            return Err(Error::InvalidArgument(format!(
                "vector dimension {} does not match index {dim}",
                vector.len()
            )));
        }
        if self.graph.vector_count() as u64 >= INVALID_NODE_ID as u64 {
            return Err(Error::InvalidArgument("graph is full".into()));
        }

        let id = self.graph.vector_count() as NodeId;
        let level = self.random_level();

        // Push SoA fields first; the new node has no in-links yet so the
        // search phase below can never reach it.
        self.graph.vectors.extend_from_slice(vector);
        self.graph.keys.push(key);
        self.graph.levels.push(level as u8);
        self.graph.neighbors.push(vec![Vec::new(); level + 1]);

        let Some(entry) = self.graph.entry_point else {
            self.graph.entry_point = Some(id);
            self.graph.max_level = level;
            return Ok(id);
        };

        // Phase 1+2: read-only traversal collecting link candidates.
        let top = level.min(self.graph.max_level);
        let links = {
            let graph = &self.graph;
            let visited = &mut self.visited;
            let calc = QueryDistance::new(graph, vector);

            let mut cur = Scored::new(calc.dist_to(entry)?, entry);
            for l in ((level + 1)..=graph.max_level).rev() {
                cur = greedy_step(graph, &calc, cur, l)?;
            }

            let mut links: Vec<Vec<NodeId>> = vec![Vec::new(); top + 1];
            for l in (0..=top).rev() {
                let candidates =
                    layer_candidates(graph, &calc, visited, cur, self.params.ef_construction, l)?;
                let m_max = if l == 0 { self.params.m_max0 } else { self.params.m };
                links[l] = select_diverse(graph, &candidates, m_max)?;
                if let Some(&best) = candidates.first() {
                    cur = best;
                }
            }
            links
        };

        // Phase 3: wire forward links, then backlinks with pruning.
        for (l, selected) in links.iter().enumerate() {
            self.graph.neighbors[id as usize][l] = selected.clone();
        }
        for (l, selected) in links.iter().enumerate() {
            let m_max = if l == 0 { self.params.m_max0 } else { self.params.m };
            for &nb in selected {
                self.graph.neighbors[nb as usize][l].push(id);
                if self.graph.neighbors[nb as usize][l].len() > m_max {
                    self.prune_neighbors(nb, l, m_max)?;
                }
            }
        }

        if level > self.graph.max_level {
            self.graph.max_level = level;
            self.graph.entry_point = Some(id);
        }
        Ok(id)
    }

    /// Re-select an over-capacity neighbor list around its owner's vector.
    fn prune_neighbors(&mut self, node: NodeId, level: usize, m_max: usize) -> Result<()> {
        let base = self.graph.vector(node)?;
        let metric = self.graph.meta.metric;
        let mut scored: Vec<Scored> = Vec::with_capacity(self.graph.neighbors[node as usize][level].len());
        for &nb in &self.graph.neighbors[node as usize][level] {
            scored.push(Scored::new(metric.distance(base, self.graph.vector(nb)?), nb));
        }
        scored.sort_unstable_by(|a, b| {
            a.dist.partial_cmp(&b.dist).unwrap_or(std::cmp::Ordering::Equal).then(a.node.cmp(&b.node))
        });
        let pruned = select_diverse(&self.graph, &scored, m_max)?;
        self.graph.neighbors[node as usize][level] = pruned;
        Ok(())
    }

    /// Finalize and hand over the immutable graph.
    pub fn finish(self) -> Graph {
        self.graph
    }
}

/// One greedy strict-improvement walk at `level`.
fn greedy_step(
    graph: &Graph,
    calc: &QueryDistance<'_>,
    mut cur: Scored,
    level: usize,
) -> Result<Scored> {
    loop {
        let mut best = cur;
        for &nb in graph.neighbors(level, cur.node) {
            let d = calc.dist_to(nb)?;
            if d < best.dist {
                best = Scored::new(d, nb);
            }
        }
        if best.node == cur.node {
            return Ok(cur);
        }
        cur = best;
    }
}

/// Bounded beam at one level, returning up to `ef` closest nodes ascending.
fn layer_candidates(
    graph: &Graph,
    calc: &QueryDistance<'_>,
    visited: &mut VisitedFilter,
    entry: Scored,
    ef: usize,
    level: usize,
) -> Result<Vec<Scored>> {
    visited.ensure_capacity(graph.vector_count());
    visited.clear();

    let mut frontier = CandidateHeap::new();
    let mut best = TopkHeap::new();
    best.set_limit(ef);
    let mut worst = f32::MAX;

    visited.mark(entry.node);
    frontier.push(entry);
    best.push(entry);
    if best.len() >= ef {
        worst = best.peek_max().map_or(f32::MAX, |s| s.dist);
    }

    while let Some(cur) = frontier.pop_min() {
        if best.len() >= ef && cur.dist > worst {
            break;
        }
        for &nb in graph.neighbors(level, cur.node) {
            if visited.mark(nb) {
                continue;
            }
            let d = calc.dist_to(nb)?;
            if best.len() < ef || d < worst {
                frontier.push(Scored::new(d, nb));
                best.push(Scored::new(d, nb));
                if best.len() >= ef {
                    worst = best.peek_max().map_or(f32::MAX, |s| s.dist);
                }
            }
        }
    }
    Ok(best.take_sorted())
}

/// Diversity selection: a candidate is kept only if it is closer to the base
/// vector than to any already-selected neighbor; remaining slots are filled
/// with the closest unused candidates.
fn select_diverse(graph: &Graph, sorted: &[Scored], m: usize) -> Result<Vec<NodeId>> {
    let metric = graph.meta().metric;
    let mut selected: Vec<Scored> = Vec::with_capacity(m);

    for &cand in sorted {
        if selected.len() >= m {
            break;
        }
        let cand_vec = graph.vector(cand.node)?;
        let mut diverse = true;
        for sel in &selected {
            let to_selected = metric.distance(cand_vec, graph.vector(sel.node)?);
            if to_selected < cand.dist {
                diverse = false;
                break;
            }
        }
        if diverse {
            selected.push(cand);
        }
    }

    if selected.len() < m {
        for &cand in sorted {
            if selected.len() >= m {
                break;
            }
            if !selected.iter().any(|s| s.node == cand.node) {
                selected.push(cand);
            }
        }
    }

    Ok(selected.into_iter().map(|s| s.node).collect())
}
