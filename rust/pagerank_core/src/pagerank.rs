//! PageRank computation with parallel iteration.
//!
//! [`PageRankComputer`] drives the power iteration: it owns the graph and the
//! configuration, builds a fixed-size Rayon pool for the run, and repeats
//! [`IterationStep`] until the [`ConvergencePolicy`] says stop or the
//! iteration cap is reached.

use std::time::{Duration, Instant};

use hashbrown::HashMap;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use crate::convergence::{ConvergencePolicy, Decision, DEFAULT_TOLERANCE};
use crate::error::{PageRankError, Result};
use crate::graph::{EdgePolicy, Graph};
use crate::rank::RankBuffers;
use crate::step::{IterationStep, UpdateStrategy};

/// Default damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Tunables for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    /// Probability of following an out-edge, in `(0, 1)`.
    pub damping: f64,
    /// Absolute L1 threshold; the run stops once the change is below it.
    pub tolerance: f64,
    /// Give up after this many iterations. `None` iterates until convergence.
    pub max_iterations: Option<usize>,
    /// Worker threads. `None` uses Rayon's default (available parallelism).
    pub threads: Option<usize>,
    pub strategy: UpdateStrategy,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
            threads: None,
            strategy: UpdateStrategy::Scatter,
        }
    }
}

impl PageRankConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Iteration cap as front ends take it: `0` means no cap.
    pub fn with_iteration_cap(self, cap: usize) -> Self {
        self.with_max_iterations((cap > 0).then_some(cap))
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check every value against its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(PageRankError::InvalidConfig(format!(
                "damping must be in (0, 1), got {}",
                self.damping
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PageRankError::InvalidConfig(format!(
                "tolerance must be a positive finite number, got {}",
                self.tolerance
            )));
        }
        if self.threads == Some(0) {
            return Err(PageRankError::InvalidConfig(
                "thread count must be positive".into(),
            ));
        }
        if self.max_iterations == Some(0) {
            return Err(PageRankError::InvalidConfig(
                "iteration cap must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The last change was below the tolerance.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
}

/// Result of a PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankResult {
    /// Scores for each node (indexed by node ID)
    pub scores: Vec<f64>,
    /// Number of iterations performed
    pub iterations: usize,
    /// Change measured in the final iteration
    pub delta: f64,
    pub status: RunStatus,
    /// Wall-clock time spent iterating
    pub elapsed: Duration,
}

impl PageRankResult {
    pub fn converged(&self) -> bool {
        self.status == RunStatus::Converged
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Sum of all scores; 1.0 up to rounding.
    pub fn total_mass(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Highest-ranked nodes, ties broken by node id.
    pub fn top_n(&self, n: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.scores.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.truncate(n);
        indexed
    }

    pub fn to_map(&self) -> HashMap<usize, f64> {
        self.scores.iter().copied().enumerate().collect()
    }
}

/// State visible to an observer after each iteration.
#[derive(Debug, Clone, Copy)]
pub struct IterationSnapshot<'a> {
    /// 1-based iteration number.
    pub iteration: usize,
    pub delta: f64,
    pub dangling_mass: f64,
    /// The rank vector this iteration produced.
    pub ranks: &'a [f64],
}

/// PageRank computer over an owned graph.
pub struct PageRankComputer {
    graph: Graph,
    config: PageRankConfig,
}

impl PageRankComputer {
    /// Create a new PageRank computer, rejecting invalid configuration.
    pub fn new(graph: Graph, config: PageRankConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    /// Build the graph from an edge list and wrap it.
    ///
    /// # Arguments
    ///
    /// * `num_nodes` - Total number of nodes in the graph
    /// * `edges` - Slice of (source, target) directed edges
    /// * `policy` - What to do with edges outside `0..num_nodes`
    /// * `config` - Run parameters
    pub fn from_edges(
        num_nodes: usize,
        edges: &[(usize, usize)],
        policy: EdgePolicy,
        config: PageRankConfig,
    ) -> Result<Self> {
        config.validate()?;
        let graph = Graph::with_policy(num_nodes, edges, policy)?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Compute PageRank scores using power iteration.
    pub fn compute(&self) -> Result<PageRankResult> {
        self.compute_with_observer(|_| {})
    }

    /// Like [`compute`](Self::compute), calling `observer` after every
    /// iteration with the freshly computed rank vector.
    pub fn compute_with_observer<F>(&self, mut observer: F) -> Result<PageRankResult>
    where
        F: FnMut(&IterationSnapshot<'_>),
    {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("pagerank-{i}"));
        if let Some(threads) = self.config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        let workers = pool.current_num_threads();

        let n = self.graph.num_nodes();
        let policy = ConvergencePolicy::new(self.config.tolerance);
        let mut step = IterationStep::new(&self.graph, self.config.damping, self.config.strategy, workers);
        let mut buffers = RankBuffers::uniform(n);

        info!(
            nodes = n,
            edges = self.graph.num_edges(),
            damping = self.config.damping,
            tolerance = self.config.tolerance,
            threads = workers,
            strategy = ?self.config.strategy,
            "starting PageRank"
        );

        let start = Instant::now();
        let mut iterations = 0usize;

        let (status, delta) = loop {
            iterations += 1;

            let (current, next) = buffers.split();
            let outcome = pool.install(|| step.run(current, next));

            debug!(
                iteration = iterations,
                delta = outcome.delta,
                dangling_mass = outcome.dangling_mass,
                "iteration finished"
            );
            observer(&IterationSnapshot {
                iteration: iterations,
                delta: outcome.delta,
                dangling_mass: outcome.dangling_mass,
                ranks: buffers.next(),
            });

            if policy.decide(outcome.delta) == Decision::Stop {
                break (RunStatus::Converged, outcome.delta);
            }
            if self.config.max_iterations.is_some_and(|cap| iterations >= cap) {
                break (RunStatus::IterationLimit, outcome.delta);
            }

            buffers.hand_over();
        };

        let elapsed = start.elapsed();
        match status {
            RunStatus::Converged => info!(
                iterations,
                delta,
                elapsed_secs = elapsed.as_secs_f64(),
                "PageRank converged"
            ),
            RunStatus::IterationLimit => warn!(
                iterations,
                delta,
                tolerance = self.config.tolerance,
                "PageRank hit the iteration cap before converging"
            ),
        }

        Ok(PageRankResult {
            scores: buffers.into_next(),
            iterations,
            delta,
            status,
            elapsed,
        })
    }

    /// Compute PageRank and return as HashMap.
    pub fn compute_as_map(&self) -> Result<HashMap<usize, f64>> {
        Ok(self.compute()?.to_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computer(num_nodes: usize, edges: &[(usize, usize)], config: PageRankConfig) -> PageRankComputer {
        PageRankComputer::from_edges(num_nodes, edges, EdgePolicy::Lenient, config).unwrap()
    }

    fn assert_sums_to_one(scores: &[f64]) {
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "mass {total}");
    }

    #[test]
    fn test_simple_graph() {
        // Simple chain: 0 -> 1 -> 2 -> 3
        let edges = vec![(0, 1), (1, 2), (2, 3)];
        let result = computer(4, &edges, PageRankConfig::default()).compute().unwrap();

        assert_eq!(result.scores.len(), 4);
        assert!(result.converged());
        // Node 3 should have highest score (sink node)
        assert!(result.scores[3] > result.scores[0]);
        assert_sums_to_one(&result.scores);
    }

    #[test]
    fn test_cycle_is_uniform() {
        let n = 6;
        let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        let result = computer(n, &edges, PageRankConfig::default()).compute().unwrap();

        for score in &result.scores {
            assert!((score - 1.0 / n as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hub_node() {
        // Hub pattern: 0, 1, 2 all point to 3
        let edges = vec![(0, 3), (1, 3), (2, 3)];
        let result = computer(4, &edges, PageRankConfig::default()).compute().unwrap();

        let top = result.top_n(1);
        assert_eq!(top[0].0, 3);
        assert!(result.scores[3] > result.scores[0]);
    }

    #[test]
    fn test_isolated_nodes_converge_in_one_iteration() {
        let edges: Vec<(usize, usize)> = vec![];
        let result = computer(5, &edges, PageRankConfig::default()).compute().unwrap();

        assert_eq!(result.iterations, 1);
        assert!(result.converged());
        for score in &result.scores {
            assert!((score - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mass_and_sign_every_iteration() {
        let edges = vec![(0, 1), (0, 2), (1, 2), (2, 0), (3, 2), (4, 4), (5, 1)];
        let mut seen = 0;
        let result = computer(7, &edges, PageRankConfig::default())
            .compute_with_observer(|snap| {
                seen += 1;
                assert_eq!(snap.iteration, seen);
                assert_sums_to_one(snap.ranks);
                assert!(snap.ranks.iter().all(|&r| r >= 0.0));
            })
            .unwrap();

        assert_eq!(seen, result.iterations);
    }

    #[test]
    fn test_four_node_scenario() {
        // Node 3 links into the cycle at 2, or at 0
        for last in [(3, 2), (3, 0)] {
            let edges = vec![(0, 1), (0, 2), (1, 2), (2, 0), last];
            let config = PageRankConfig::default().with_max_iterations(None);
            let result = computer(4, &edges, config).compute().unwrap();

            assert!(result.converged(), "{last:?}");
            assert!(result.iterations > 1);
            assert!(result.delta < 1e-6);
            assert!(result.scores.iter().all(|&r| r > 0.0));
            assert_sums_to_one(&result.scores);
            // Node 3 has no in-edges and keeps only teleport mass
            assert!((result.scores[3] - 0.15 / 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_four_node_scenario_into_zero() {
        let edges = vec![(0, 1), (0, 2), (1, 2), (2, 0), (3, 0)];
        let result = computer(4, &edges, PageRankConfig::default()).compute().unwrap();

        let expected = [0.3869, 0.2020, 0.3736, 0.0375];
        for (got, want) in result.scores.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{got} vs {want}");
        }
        assert_eq!(result.top_n(2).iter().map(|&(i, _)| i).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_iteration_cap_zero_means_unbounded() {
        assert_eq!(PageRankConfig::default().with_iteration_cap(0).max_iterations, None);
        assert_eq!(
            PageRankConfig::default().with_iteration_cap(25).max_iterations,
            Some(25)
        );
        assert!(PageRankConfig::default().with_iteration_cap(0).validate().is_ok());
    }

    #[test]
    fn test_thread_counts_agree() {
        let n = 3000;
        let edges: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| [(i, (i * 31 + 7) % n), (i, (i * i + 1) % n)])
            .filter(|&(i, _)| i % 17 != 0)
            .collect();

        let single = computer(n, &edges, PageRankConfig::default().with_threads(Some(1)))
            .compute()
            .unwrap();
        let many = computer(n, &edges, PageRankConfig::default().with_threads(Some(8)))
            .compute()
            .unwrap();

        assert_eq!(single.iterations, many.iterations);
        for (a, b) in single.scores.iter().zip(many.scores.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_thread_count_is_reproducible() {
        let edges = vec![(0, 1), (1, 2), (2, 0), (2, 3), (3, 1), (4, 0)];
        let config = PageRankConfig::default().with_threads(Some(3));

        let a = computer(6, &edges, config).compute().unwrap();
        let b = computer(6, &edges, config).compute().unwrap();

        assert_eq!(a.scores, b.scores);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_gather_matches_scatter() {
        let edges = vec![(0, 1), (0, 2), (1, 2), (2, 0), (3, 2), (3, 3), (5, 4)];
        let scatter = computer(6, &edges, PageRankConfig::default()).compute().unwrap();
        let gather = computer(
            6,
            &edges,
            PageRankConfig::default().with_strategy(UpdateStrategy::Gather),
        )
        .compute()
        .unwrap();

        assert_eq!(scatter.iterations, gather.iterations);
        for (a, b) in scatter.scores.iter().zip(gather.scores.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_iteration_cap() {
        let edges = vec![(0, 1), (1, 2), (2, 0), (2, 1), (3, 0)];
        let config = PageRankConfig::default()
            .with_tolerance(1e-300)
            .with_max_iterations(Some(3));
        let result = computer(4, &edges, config).compute().unwrap();

        assert_eq!(result.status, RunStatus::IterationLimit);
        assert!(!result.converged());
        assert_eq!(result.iterations, 3);
        assert_sums_to_one(&result.scores);
    }

    #[test]
    fn test_invalid_config() {
        let graph = Graph::new(2, &[(0, 1)]).unwrap();
        for config in [
            PageRankConfig::default().with_damping(1.0),
            PageRankConfig::default().with_damping(0.0),
            PageRankConfig::default().with_damping(f64::NAN),
            PageRankConfig::default().with_tolerance(0.0),
            PageRankConfig::default().with_tolerance(f64::INFINITY),
            PageRankConfig::default().with_threads(Some(0)),
            PageRankConfig::default().with_max_iterations(Some(0)),
        ] {
            let err = PageRankComputer::new(graph.clone(), config).err();
            assert!(matches!(err, Some(PageRankError::InvalidConfig(_))), "{config:?}");
        }
    }

    #[test]
    fn test_compute_as_map() {
        let edges = vec![(0, 1), (1, 0)];
        let map = computer(2, &edges, PageRankConfig::default())
            .compute_as_map()
            .unwrap();

        assert_eq!(map.len(), 2);
        assert!((map[&0] - 0.5).abs() < 1e-9);
    }
}
