//! Degree statistics and hub detection.
//!
//! Summarises the shape of a [`Graph`] before a run: how many nodes leak
//! their rank through the dangling redistribution, how skewed the degrees
//! are, and which nodes collect the most in-links.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::graph::Graph;

/// Statistics about degree distribution in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub dropped_edges: usize,
    /// Nodes with no out-edges.
    pub dangling_nodes: usize,
    /// Nodes with neither in- nor out-edges.
    pub isolated_nodes: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub avg_degree: f64,
    /// in-degree -> number of nodes with that in-degree
    pub in_degree_histogram: FxHashMap<usize, usize>,
}

impl GraphStats {
    pub fn from_graph(graph: &Graph) -> Self {
        let n = graph.num_nodes();

        let (dangling_nodes, isolated_nodes, max_in_degree, max_out_degree) = (0..n)
            .into_par_iter()
            .map(|i| {
                let in_deg = graph.in_degree(i);
                let out_deg = graph.out_degree(i);
                (
                    usize::from(out_deg == 0),
                    usize::from(out_deg == 0 && in_deg == 0),
                    in_deg,
                    out_deg,
                )
            })
            .reduce(
                || (0, 0, 0, 0),
                |a, b| (a.0 + b.0, a.1 + b.1, a.2.max(b.2), a.3.max(b.3)),
            );

        let mut in_degree_histogram = FxHashMap::default();
        for i in 0..n {
            *in_degree_histogram.entry(graph.in_degree(i)).or_insert(0) += 1;
        }

        let avg_degree = if n > 0 {
            graph.num_edges() as f64 / n as f64
        } else {
            0.0
        };

        Self {
            total_nodes: n,
            total_edges: graph.num_edges(),
            dropped_edges: graph.dropped_edges(),
            dangling_nodes,
            isolated_nodes,
            max_in_degree,
            max_out_degree,
            avg_degree,
            in_degree_histogram,
        }
    }
}

/// Find all hub nodes (nodes with in-degree >= threshold).
///
/// Returns `(node, in_degree)` pairs sorted by in-degree descending, then by
/// node id.
pub fn find_hubs(graph: &Graph, threshold: usize) -> Vec<(usize, usize)> {
    let mut hubs: Vec<(usize, usize)> = (0..graph.num_nodes())
        .into_par_iter()
        .map(|i| (i, graph.in_degree(i)))
        .filter(|&(_, deg)| deg >= threshold)
        .collect();

    hubs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hubs
}
