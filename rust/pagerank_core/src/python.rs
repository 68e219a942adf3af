//! PyO3 bindings, built with the `python` feature.
//!
//! ```python
//! from pagerank._pagerank_core import fast_pagerank, compute_graph_stats, detect_hubs
//!
//! scores = fast_pagerank(4, [(0, 1), (0, 2), (1, 2), (2, 0), (3, 2)])
//! hubs = detect_hubs(4, [(0, 2), (1, 2), (3, 2)], threshold=3)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::error::PageRankError;
use crate::graph::{EdgePolicy, Graph};
use crate::pagerank::{PageRankComputer, PageRankConfig};
use crate::stats::{find_hubs, GraphStats};

impl From<PageRankError> for PyErr {
    fn from(err: PageRankError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Compute PageRank scores for a directed graph.
///
/// Releases the GIL while iterating. Edges outside `0..num_nodes` are
/// dropped unless `strict` is set. `max_iterations=0` iterates until
/// convergence, like `--max-iterations 0` on the command line.
///
/// # Returns
///
/// Dictionary mapping node index to PageRank score.
#[pyfunction]
#[pyo3(signature = (num_nodes, edges, damping=0.85, max_iterations=1000, tolerance=1e-6, threads=None, strict=false))]
#[allow(clippy::too_many_arguments)]
fn fast_pagerank(
    py: Python<'_>,
    num_nodes: usize,
    edges: Vec<(usize, usize)>,
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
    threads: Option<usize>,
    strict: bool,
) -> PyResult<Py<PyDict>> {
    let policy = if strict { EdgePolicy::Strict } else { EdgePolicy::Lenient };
    let config = PageRankConfig::default()
        .with_damping(damping)
        .with_tolerance(tolerance)
        .with_iteration_cap(max_iterations)
        .with_threads(threads);

    let result = py.allow_threads(|| {
        PageRankComputer::from_edges(num_nodes, &edges, policy, config)?.compute()
    })?;

    let dict = PyDict::new_bound(py);
    for (i, score) in result.scores.iter().enumerate() {
        dict.set_item(i, *score)?;
    }

    Ok(dict.into())
}

/// Degree statistics for a directed graph.
#[pyfunction]
fn compute_graph_stats(
    py: Python<'_>,
    num_nodes: usize,
    edges: Vec<(usize, usize)>,
) -> PyResult<Py<PyDict>> {
    let stats = py.allow_threads(|| {
        Graph::new(num_nodes, &edges).map(|graph| GraphStats::from_graph(&graph))
    })?;

    let dict = PyDict::new_bound(py);
    dict.set_item("total_nodes", stats.total_nodes)?;
    dict.set_item("total_edges", stats.total_edges)?;
    dict.set_item("dropped_edges", stats.dropped_edges)?;
    dict.set_item("dangling_nodes", stats.dangling_nodes)?;
    dict.set_item("isolated_nodes", stats.isolated_nodes)?;
    dict.set_item("max_in_degree", stats.max_in_degree)?;
    dict.set_item("max_out_degree", stats.max_out_degree)?;
    dict.set_item("avg_degree", stats.avg_degree)?;

    Ok(dict.into())
}

/// Nodes with in-degree at least `threshold`.
///
/// Returns a list of `(node_index, in_degree)` tuples, highest in-degree first.
#[pyfunction]
#[pyo3(signature = (num_nodes, edges, threshold=3))]
fn detect_hubs(
    py: Python<'_>,
    num_nodes: usize,
    edges: Vec<(usize, usize)>,
    threshold: usize,
) -> PyResult<Py<PyList>> {
    let hubs = py.allow_threads(|| {
        Graph::new(num_nodes, &edges).map(|graph| find_hubs(&graph, threshold))
    })?;

    let list = PyList::new_bound(py, hubs);

    Ok(list.into())
}

/// Python module definition.
#[pymodule]
fn _pagerank_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fast_pagerank, m)?)?;
    m.add_function(wrap_pyfunction!(compute_graph_stats, m)?)?;
    m.add_function(wrap_pyfunction!(detect_hubs, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
