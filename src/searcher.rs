//! Searcher lifecycle and query routing.
//!
//! A searcher walks `INIT → INITED → LOADED` and back. Once loaded it is
//! immutable: `search` takes `&self` and any number of threads may query it
//! concurrently, each with its own [`SearchContext`]. Adaptive mode is
//! decided once at load time; per-query predictor failures fall back to the
//! baseline path without failing the query.

use crate::config;
use crate::error::{Error, Result};
use crate::graph::{Graph, GraphSource};
use crate::meta::QueryMeta;
use crate::omega::{OmegaModel, OmegaState};
use crate::params::SearcherParams;
use crate::search::calculator::QueryDistance;
use crate::search::context::SearchContext;
use crate::search::heaps::Scored;
use crate::search::layer::{beam_search, emit_results, greedy_descent, NoProbe};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Inited,
    Loaded,
}

/// Long-lived searcher over one loaded graph.
#[derive(Debug)]
pub struct Searcher {
    state: State,
    params: SearcherParams,
    graph: Option<Arc<Graph>>,
    model: Option<OmegaModel>,
    // Adaptive mode armed at load time
    adaptive: bool,
}

impl Searcher {
    pub fn new() -> Self {
        Self {
            state: State::Init,
            params: SearcherParams::default(),
            graph: None,
            model: None,
            adaptive: false,
        }
    }

    /// Accept configuration. Calling `init` twice without an intervening
    /// `cleanup` is an error.
    pub fn init(&mut self, params: SearcherParams) -> Result<()> {
        if self.state != State::Init {
            return Err(Error::DuplicateInit);
        }
        if params.ef == 0 {
            return Err(Error::InvalidArgument("ef must be positive".into()));
        }
        if !(0.0..=1.0).contains(&params.omega.target_recall) {
            return Err(Error::InvalidArgument(format!(
                "target recall {} outside [0, 1]",
                params.omega.target_recall
            )));
        }
        info!(
            ef = params.ef,
            omega_enabled = params.omega.enabled,
            target_recall = params.omega.target_recall,
            min_vector_threshold = params.omega.min_vector_threshold,
            "searcher initialized"
        );
        self.params = params;
        self.state = State::Inited;
        Ok(())
    }

    /// Materialize the graph and, when armed, the predictor model. A second
    /// `load` without an intervening `unload` is an error. Model problems
    /// never fail the load; they leave the searcher in baseline-only mode.
    pub fn load(&mut self, source: &dyn GraphSource) -> Result<()> {
        if self.state != State::Inited {
            return Err(Error::InvalidState("load requires an initialized, unloaded searcher"));
        }
        let graph = source.open_graph()?;

        self.adaptive = false;
        self.model = None;
        let omega = &self.params.omega;
        if omega.enabled {
            if (graph.vector_count() as u64) < u64::from(omega.min_vector_threshold) {
                info!(
                    vector_count = graph.vector_count(),
                    threshold = omega.min_vector_threshold,
                    "graph below adaptive threshold, using baseline search"
                );
            } else if omega.model_dir.is_empty() {
                warn!("adaptive mode enabled but model_dir not set, using baseline search");
            } else {
                match OmegaModel::load(Path::new(&omega.model_dir)) {
                    Ok(model) if model.is_loaded() => {
                        info!(model_dir = %omega.model_dir, "predictor model loaded, adaptive search armed");
                        self.model = Some(model);
                        self.adaptive = true;
                    }
                    Ok(_) => {
                        warn!(model_dir = %omega.model_dir, "predictor model incomplete, using baseline search");
                    }
                    Err(err) => {
                        warn!(model_dir = %omega.model_dir, error = %err, "failed to load predictor model, using baseline search");
                    }
                }
            }
        }

        self.graph = Some(graph);
        self.state = State::Loaded;
        Ok(())
    }

    /// Release the graph and model. A no-op unless loaded.
    pub fn unload(&mut self) -> Result<()> {
        if self.state != State::Loaded {
            return Ok(());
        }
        self.graph = None;
        self.model = None;
        self.adaptive = false;
        self.state = State::Inited;
        Ok(())
    }

    /// Return to the pristine state. A no-op when already pristine.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.state == State::Init {
            return Ok(());
        }
        self.unload()?;
        self.params = SearcherParams::default();
        self.state = State::Init;
        Ok(())
    }

    /// Create a per-query context. Contexts are recyclable across queries
    /// on the same thread.
    pub fn create_context(&self) -> SearchContext {
        SearchContext::new()
    }

    /// Whether adaptive mode was armed at load time.
    pub fn adaptive_active(&self) -> bool {
        self.adaptive
    }

    /// The loaded graph, if any.
    pub fn graph(&self) -> Option<&Arc<Graph>> {
        self.graph.as_ref()
    }

    /// k-NN (and, with a context threshold, radius) search.
    ///
    /// The context's `topk` is the requested `k`; results land in
    /// `ctx.results()` ordered best-first. An empty result is a valid
    /// outcome. On cancellation the context holds the partial best set
    /// truncated to `k` and the call returns [`Error::Cancelled`]; every
    /// other failure leaves the context with empty results.
    pub fn search(&self, query: &[f32], qmeta: &QueryMeta, ctx: &mut SearchContext) -> Result<()> {
        let graph = match (self.state, self.graph.as_ref()) {
            (State::Loaded, Some(graph)) => graph,
            _ => return Err(Error::NotReady),
        };
        graph.meta().check_query(qmeta)?;
        if query.len() != qmeta.dimension {
            return Err(Error::InvalidArgument(format!(
                "query holds {} components but meta declares {}",
                query.len(),
                qmeta.dimension
            )));
        }
        let k = ctx.topk();
        if k == 0 {
            return Err(Error::InvalidArgument("k must be positive".into()));
        }
        if k > config::MAX_K {
            return Err(Error::InvalidArgument(format!("k {k} exceeds limit {}", config::MAX_K)));
        }

        ctx.begin(graph.vector_count());
        if graph.is_empty() {
            return Ok(());
        }

        match self.run_query(graph, query, k, ctx) {
            Ok(()) => {
                emit_results(graph, ctx, k);
                Ok(())
            }
            Err(Error::Cancelled) => {
                emit_results(graph, ctx, k);
                Err(Error::Cancelled)
            }
            Err(err) => {
                ctx.clear_results();
                Err(err)
            }
        }
    }

    fn run_query(&self, graph: &Graph, query: &[f32], k: usize, ctx: &mut SearchContext) -> Result<()> {
        let calc = QueryDistance::new(graph, query);
        let ep = graph.entry_point();
        let entry = Scored::new(calc.dist_to(ep)?, ep);
        ctx.stats.scored += 1;

        let seed = greedy_descent(graph, &calc, ctx, entry)?;
        let ef = self.params.ef.max(k);

        if self.adaptive {
            if let Some(model) = self.model.as_ref() {
                match OmegaState::new(model, self.params.omega.target_recall, k, model.window_size())
                {
                    Ok(mut state) => {
                        state.set_dist_start(seed.dist);
                        return beam_search(graph, &calc, ctx, seed, ef, &mut state);
                    }
                    Err(err) => {
                        // Stay armed; the next query constructs a fresh handle.
                        warn!(error = %err, "predictor handle unavailable, baseline search for this query");
                    }
                }
            }
        }
        beam_search(graph, &calc, ctx, seed, ef, &mut NoProbe)
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
