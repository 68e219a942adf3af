//! # PageRank Core
//!
//! Parallel PageRank by damped power iteration.
//!
//! The engine reads a directed graph over dense node ids, starts from the
//! uniform distribution and repeats the PageRank update until the L1 change
//! between successive rank vectors drops below a threshold.
//!
//! ## Features
//!
//! - **Graph store**: immutable CSR adjacency with an explicit policy for
//!   out-of-range edges
//! - **Parallel update**: contributions are scattered into per-worker
//!   partial buffers and combined in a fixed order, so a run is reproducible
//!   for a given thread count
//! - **Dangling nodes**: their rank is redistributed uniformly every iteration
//! - **Ingestion**: SNAP-style `# Nodes: N Edges: M` edge lists
//! - **Python bindings** behind the `python` feature
//!
//! ## Usage
//!
//! ```
//! use pagerank_core::{EdgePolicy, PageRankComputer, PageRankConfig};
//!
//! let edges = [(0, 1), (0, 2), (1, 2), (2, 0), (3, 2)];
//! let computer =
//!     PageRankComputer::from_edges(4, &edges, EdgePolicy::Lenient, PageRankConfig::default())?;
//! let result = computer.compute()?;
//!
//! assert!(result.converged());
//! assert!((result.total_mass() - 1.0).abs() < 1e-9);
//! # Ok::<(), pagerank_core::PageRankError>(())
//! ```

pub mod convergence;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod pagerank;
pub mod rank;
pub mod stats;
pub mod step;

#[cfg(feature = "python")]
mod python;

pub use convergence::{ConvergencePolicy, Decision};
pub use error::{PageRankError, Result};
pub use graph::{EdgePolicy, Graph};
pub use ingest::{parse_edge_list, read_edge_list, EdgeList};
pub use pagerank::{IterationSnapshot, PageRankComputer, PageRankConfig, PageRankResult, RunStatus};
pub use rank::RankBuffers;
pub use stats::{find_hubs, GraphStats};
pub use step::{IterationStep, StepOutcome, UpdateStrategy};
