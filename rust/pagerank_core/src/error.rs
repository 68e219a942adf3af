//! Error types shared by graph construction, ingestion and the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`PageRankError`].
pub type Result<T> = std::result::Result<T, PageRankError>;

/// Everything that can stop a PageRank run before it starts.
///
/// Non-convergence is not an error: it is reported through
/// [`RunStatus`](crate::pagerank::RunStatus) on the result.
#[derive(Debug, Error)]
pub enum PageRankError {
    /// The graph has no nodes, or the node count could not be determined.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// An edge endpoint lies outside `[0, num_nodes)` under the strict policy.
    #[error("edge ({src}, {dst}) is out of range for a graph of {num_nodes} nodes")]
    EdgeOutOfRange {
        src: usize,
        dst: usize,
        num_nodes: usize,
    },

    /// A configuration value lies outside its domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to read graph file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
