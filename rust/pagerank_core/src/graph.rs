//! Immutable directed graph in compressed sparse row form.
//!
//! Out-neighbors keep the order in which their edges were supplied, and
//! self-loops and duplicate edges are stored as given. The transposed
//! adjacency is built alongside so the gather update can pull from
//! predecessors without a second pass over the edge list.

use tracing::{debug, warn};

use crate::error::{PageRankError, Result};

/// What to do with an edge whose endpoint is not in `[0, num_nodes)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Drop the edge and count it in [`Graph::dropped_edges`].
    #[default]
    Lenient,
    /// Reject the whole graph with [`PageRankError::EdgeOutOfRange`].
    Strict,
}

/// Directed graph over dense node ids `0..num_nodes`.
#[derive(Debug, Clone)]
pub struct Graph {
    num_nodes: usize,
    out_offsets: Vec<usize>,
    out_targets: Vec<usize>,
    in_offsets: Vec<usize>,
    in_sources: Vec<usize>,
    dropped_edges: usize,
}

impl Graph {
    /// Build a graph with the lenient edge policy.
    pub fn new(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        Self::with_policy(num_nodes, edges, EdgePolicy::Lenient)
    }

    /// Build a graph from `(source, target)` edges.
    ///
    /// Fails if `num_nodes` is zero, or if an edge is out of range and
    /// `policy` is [`EdgePolicy::Strict`].
    pub fn with_policy(num_nodes: usize, edges: &[(usize, usize)], policy: EdgePolicy) -> Result<Self> {
        if num_nodes == 0 {
            return Err(PageRankError::InvalidGraph(
                "graph must have at least one node".into(),
            ));
        }

        let mut out_counts = vec![0usize; num_nodes];
        let mut in_counts = vec![0usize; num_nodes];
        let mut dropped_edges = 0usize;

        for &(src, tgt) in edges {
            if src < num_nodes && tgt < num_nodes {
                out_counts[src] += 1;
                in_counts[tgt] += 1;
                continue;
            }
            match policy {
                EdgePolicy::Strict => {
                    return Err(PageRankError::EdgeOutOfRange {
                        src,
                        dst: tgt,
                        num_nodes,
                    })
                }
                EdgePolicy::Lenient => dropped_edges += 1,
            }
        }

        let out_offsets = prefix_offsets(&out_counts);
        let in_offsets = prefix_offsets(&in_counts);
        let num_edges = out_offsets[num_nodes];

        // Counting-sort fill; cursors start at each row's offset so rows keep
        // input order.
        let mut out_targets = vec![0usize; num_edges];
        let mut in_sources = vec![0usize; num_edges];
        let mut out_cursor = out_offsets[..num_nodes].to_vec();
        let mut in_cursor = in_offsets[..num_nodes].to_vec();

        for &(src, tgt) in edges {
            if src < num_nodes && tgt < num_nodes {
                out_targets[out_cursor[src]] = tgt;
                out_cursor[src] += 1;
                in_sources[in_cursor[tgt]] = src;
                in_cursor[tgt] += 1;
            }
        }

        if dropped_edges > 0 {
            warn!(
                dropped_edges,
                num_nodes, "dropped edges with endpoints outside the node range"
            );
        }
        debug!(num_nodes, num_edges, "graph built");

        Ok(Self {
            num_nodes,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
            dropped_edges,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of stored edges, after out-of-range edges were dropped.
    pub fn num_edges(&self) -> usize {
        self.out_targets.len()
    }

    /// Edges discarded by the lenient policy.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.out_offsets[node + 1] - self.out_offsets[node]
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.in_offsets[node + 1] - self.in_offsets[node]
    }

    /// Out-neighbors of `node`, in input order.
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[node]..self.out_offsets[node + 1]]
    }

    /// In-neighbors of `node`, in input order.
    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[node]..self.in_offsets[node + 1]]
    }

    pub fn is_dangling(&self, node: usize) -> bool {
        self.out_degree(node) == 0
    }

    /// Nodes with no outgoing edges.
    pub fn dangling_nodes(&self) -> Vec<usize> {
        (0..self.num_nodes).filter(|&i| self.is_dangling(i)).collect()
    }
}

fn prefix_offsets(counts: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut total = 0usize;
    offsets.push(0);
    for &c in counts {
        total += c;
        offsets.push(total);
    }
    offsets
}
