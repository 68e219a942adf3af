//! Edge-list ingestion for SNAP-style text graphs.
//!
//! ```text
//! # Directed graph (each unordered pair of nodes is saved once)
//! # Nodes: 4 Edges: 5
//! 0 1
//! 0 2
//! ```
//!
//! `#` lines are comments; the one carrying `Nodes:` sets the node count.
//! Every other line contributes an edge if its first two tokens are
//! unsigned integers, and is skipped otherwise. Edges that appear before the
//! first `Nodes:` header are dropped, since there is no node range yet to
//! place them in.

use std::path::Path;

use memchr::{memchr_iter, memmem};
use tracing::{debug, warn};

use crate::error::{PageRankError, Result};
use crate::graph::{EdgePolicy, Graph};

/// Parsed contents of an edge-list file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    /// Node count from the `Nodes:` header.
    pub num_nodes: usize,
    /// Edge count from the `Edges:` header, if present.
    pub declared_edges: Option<usize>,
    pub edges: Vec<(usize, usize)>,
    /// Non-comment lines that did not hold an edge.
    pub skipped_lines: usize,
    /// Well-formed edges discarded because no `Nodes:` header preceded them.
    pub edges_before_header: usize,
}

impl EdgeList {
    pub fn into_graph(self, policy: EdgePolicy) -> Result<Graph> {
        Graph::with_policy(self.num_nodes, &self.edges, policy)
    }
}

/// Read and parse the file at `path`.
pub fn read_edge_list(path: impl AsRef<Path>) -> Result<EdgeList> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| PageRankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "read graph file");
    parse_edge_list(&bytes)
}

/// Parse an edge list held in memory.
pub fn parse_edge_list(input: &[u8]) -> Result<EdgeList> {
    let nodes_finder = memmem::Finder::new(b"Nodes:");
    let edges_finder = memmem::Finder::new(b"Edges:");

    let mut num_nodes: Option<usize> = None;
    let mut declared_edges = None;
    let mut edges = Vec::new();
    let mut skipped_lines = 0usize;
    let mut edges_before_header = 0usize;

    let mut start = 0;
    let ends = memchr_iter(b'\n', input).chain(std::iter::once(input.len()));
    for end in ends {
        let line = trim_cr(&input[start..end.max(start)]);
        start = end + 1;

        if line.first() == Some(&b'#') {
            if let Some(pos) = nodes_finder.find(line) {
                num_nodes = Some(header_value(&line[pos + 6..]).ok_or_else(|| {
                    PageRankError::InvalidGraph(format!(
                        "unreadable node count in header {:?}",
                        String::from_utf8_lossy(line)
                    ))
                })?);
            }
            if let Some(pos) = edges_finder.find(line) {
                declared_edges = header_value(&line[pos + 6..]);
            }
            continue;
        }

        match parse_edge(line) {
            Some(_) if num_nodes.is_none() => edges_before_header += 1,
            Some(edge) => edges.push(edge),
            None => {
                if !line.iter().all(u8::is_ascii_whitespace) {
                    skipped_lines += 1;
                }
            }
        }
    }

    let num_nodes = match num_nodes {
        Some(n) if n > 0 => n,
        _ => {
            return Err(PageRankError::InvalidGraph(
                "node count missing or zero; expected a header line like '# Nodes: N Edges: M'"
                    .into(),
            ))
        }
    };

    if let Some(declared) = declared_edges {
        if declared != edges.len() {
            debug!(declared, parsed = edges.len(), "edge count differs from header");
        }
    }
    if edges_before_header > 0 {
        warn!(edges_before_header, "dropped edges listed before the node count header");
    }
    debug!(num_nodes, edges = edges.len(), skipped_lines, "parsed edge list");

    Ok(EdgeList {
        num_nodes,
        declared_edges,
        edges,
        skipped_lines,
        edges_before_header,
    })
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(u8::is_ascii_whitespace).filter(|t| !t.is_empty())
}

fn parse_usize(token: &[u8]) -> Option<usize> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn header_value(rest: &[u8]) -> Option<usize> {
    tokens(rest).next().and_then(parse_usize)
}

fn parse_edge(line: &[u8]) -> Option<(usize, usize)> {
    let mut it = tokens(line);
    let src = parse_usize(it.next()?)?;
    let tgt = parse_usize(it.next()?)?;
    Some((src, tgt))
}
