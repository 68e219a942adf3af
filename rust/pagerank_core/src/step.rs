//! One power-iteration update.
//!
//! Each call runs three parallel phases with a barrier between them:
//!
//! 1. **Contribution**: every partition of the node range spreads
//!    `d * rank[i] / out_degree(i)` into its own partial buffer (scatter) and
//!    sums the rank of its dangling nodes.
//! 2. **Combine**: every `next[j]` is written exactly once as teleport mass,
//!    plus the partials in partition order (or the pulled predecessor shares
//!    for gather), plus the uniform dangling share.
//! 3. **Signal**: per-partition L1 distances between `current` and `next`.
//!
//! Per-partition sums are combined sequentially in partition order, so for
//! a fixed partition count the result is bit-for-bit reproducible. Different
//! partition counts only reassociate floating-point additions.

use std::ops::Range;

use rayon::prelude::*;

use crate::graph::Graph;

/// Minimum number of nodes handed to one rayon task in per-node loops.
const MIN_NODES_PER_TASK: usize = 1024;

/// How contributions travel along edges.
///
/// Scatter keeps one partial buffer per partition, each spanning the lowest
/// to the highest target that partition writes. On graphs whose edges point
/// anywhere that span approaches N, so memory and combine work grow as
/// `P × N` for P partitions. Prefer [`UpdateStrategy::Gather`] when running
/// many threads over such graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// Push shares along out-edges into per-partition accumulators.
    #[default]
    Scatter,
    /// Pull shares from predecessors; needs no partial buffers.
    Gather,
}

/// What one update produced besides the new rank vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// L1 distance between the old and new rank vectors.
    pub delta: f64,
    /// Rank held by dangling nodes before the update.
    pub dangling_mass: f64,
}

/// Reusable workspace for repeated updates over one graph.
///
/// All buffers are allocated in [`IterationStep::new`]; [`IterationStep::run`]
/// does not allocate.
pub struct IterationStep<'g> {
    graph: &'g Graph,
    damping: f64,
    strategy: UpdateStrategy,
    partitions: Vec<Range<usize>>,
    /// Target range written by each partition; `partials[p]` covers exactly
    /// `spans[p]`.
    spans: Vec<Range<usize>>,
    partials: Vec<Vec<f64>>,
    dangling_partials: Vec<f64>,
    delta_partials: Vec<f64>,
}

impl<'g> IterationStep<'g> {
    /// Prepare a workspace splitting the node range into `workers`
    /// contiguous partitions (at most one per node).
    pub fn new(graph: &'g Graph, damping: f64, strategy: UpdateStrategy, workers: usize) -> Self {
        let partitions = partition(graph.num_nodes(), workers);
        let spans: Vec<Range<usize>> = match strategy {
            UpdateStrategy::Scatter => partitions
                .par_iter()
                .map(|range| target_span(graph, range.clone()))
                .collect(),
            UpdateStrategy::Gather => Vec::new(),
        };
        let partials = spans.iter().map(|span| vec![0.0; span.len()]).collect();
        let dangling_partials = vec![0.0; partitions.len()];
        let delta_partials = vec![0.0; partitions.len()];

        Self {
            graph,
            damping,
            strategy,
            partitions,
            spans,
            partials,
            dangling_partials,
            delta_partials,
        }
    }

    /// Compute `next` from `current` and measure how far it moved.
    ///
    /// Both slices must have one entry per node. `current` is only read.
    pub fn run(&mut self, current: &[f64], next: &mut [f64]) -> StepOutcome {
        let n = self.graph.num_nodes();
        debug_assert_eq!(current.len(), n);
        debug_assert_eq!(next.len(), n);

        let n_f64 = n as f64;
        let teleport = (1.0 - self.damping) / n_f64;

        let dangling_mass = match self.strategy {
            UpdateStrategy::Scatter => self.scatter(current),
            UpdateStrategy::Gather => self.dangling_sum(current),
        };
        let dangling_contrib = self.damping * dangling_mass / n_f64;

        match self.strategy {
            UpdateStrategy::Scatter => {
                let partials = &self.partials;
                let spans = &self.spans;
                next.par_iter_mut()
                    .with_min_len(MIN_NODES_PER_TASK)
                    .enumerate()
                    .for_each(|(j, slot)| {
                        let mut acc = teleport;
                        for (partial, span) in partials.iter().zip(spans) {
                            if span.contains(&j) {
                                acc += partial[j - span.start];
                            }
                        }
                        *slot = acc + dangling_contrib;
                    });
            }
            UpdateStrategy::Gather => {
                let graph = self.graph;
                let damping = self.damping;
                next.par_iter_mut()
                    .with_min_len(MIN_NODES_PER_TASK)
                    .enumerate()
                    .for_each(|(j, slot)| {
                        let mut acc = teleport;
                        for &i in graph.predecessors(j) {
                            acc += damping * current[i] / graph.out_degree(i) as f64;
                        }
                        *slot = acc + dangling_contrib;
                    });
            }
        }

        let delta = self.l1_distance(current, next);

        StepOutcome {
            delta,
            dangling_mass,
        }
    }

    /// Phase 1 for scatter: fill partials, return the dangling mass.
    fn scatter(&mut self, current: &[f64]) -> f64 {
        let graph = self.graph;
        let damping = self.damping;

        self.partials
            .par_iter_mut()
            .zip(self.dangling_partials.par_iter_mut())
            .zip(self.partitions.par_iter().zip(self.spans.par_iter()))
            .for_each(|((partial, dangling), (range, span))| {
                partial.fill(0.0);
                let mut local_dangling = 0.0;
                for i in range.clone() {
                    let succ = graph.successors(i);
                    if succ.is_empty() {
                        local_dangling += current[i];
                        continue;
                    }
                    let share = damping * current[i] / succ.len() as f64;
                    for &j in succ {
                        partial[j - span.start] += share;
                    }
                }
                *dangling = local_dangling;
            });

        self.dangling_partials.iter().sum()
    }

    /// Phase 1 for gather: only the dangling mass is needed up front.
    fn dangling_sum(&mut self, current: &[f64]) -> f64 {
        let graph = self.graph;

        self.dangling_partials
            .par_iter_mut()
            .zip(self.partitions.par_iter())
            .for_each(|(dangling, range)| {
                *dangling = range
                    .clone()
                    .filter(|&i| graph.is_dangling(i))
                    .map(|i| current[i])
                    .sum();
            });

        self.dangling_partials.iter().sum()
    }

    fn l1_distance(&mut self, current: &[f64], next: &[f64]) -> f64 {
        self.delta_partials
            .par_iter_mut()
            .zip(self.partitions.par_iter())
            .for_each(|(delta, range)| {
                *delta = current[range.clone()]
                    .iter()
                    .zip(&next[range.clone()])
                    .map(|(old, new)| (new - old).abs())
                    .sum();
            });

        self.delta_partials.iter().sum()
    }
}

/// Smallest range holding every successor of the nodes in `range`.
fn target_span(graph: &Graph, range: Range<usize>) -> Range<usize> {
    let mut lo = usize::MAX;
    let mut hi = 0;
    for i in range {
        for &j in graph.successors(i) {
            lo = lo.min(j);
            hi = hi.max(j + 1);
        }
    }
    if lo < hi {
        lo..hi
    } else {
        0..0
    }
}

/// Split `0..n` into at most `parts` contiguous, non-empty ranges whose
/// lengths differ by at most one.
fn partition(n: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, n.max(1));
    let base = n / parts;
    let extra = n % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for p in 0..parts {
        let len = base + usize::from(p < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}
