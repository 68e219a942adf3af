//! `pagerank` — rank the nodes of a SNAP-style edge-list file.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use pagerank_core::{
    find_hubs, read_edge_list, EdgePolicy, GraphStats, PageRankComputer, PageRankConfig,
    PageRankResult, UpdateStrategy,
};

#[derive(Parser)]
#[command(name = "pagerank", version, about = "Parallel PageRank over a directed edge list")]
struct Cli {
    /// Graph file with a '# Nodes: N Edges: M' header and one 'u v' edge per line
    #[arg(short = 'f', long)]
    file: PathBuf,

    /// Probability of following an out-edge
    #[arg(short, long, default_value_t = 0.85)]
    damping: f64,

    /// Stop once the L1 change between iterations is below this value
    #[arg(short, long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Worker threads (defaults to available parallelism)
    #[arg(short = 'j', long, env = "PAGERANK_THREADS")]
    threads: Option<usize>,

    /// Iteration cap; 0 iterates until convergence
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,

    /// Reject edges whose endpoints exceed the node count instead of dropping them
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum, default_value = "scatter")]
    strategy: StrategyArg,

    /// Print the k highest-ranked nodes
    #[arg(long, default_value_t = 0)]
    top: usize,

    /// Log nodes whose in-degree is at least this value
    #[arg(long, value_name = "THRESHOLD")]
    hubs: Option<usize>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Scatter,
    Gather,
}

impl From<StrategyArg> for UpdateStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Scatter => UpdateStrategy::Scatter,
            StrategyArg::Gather => UpdateStrategy::Gather,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct RankedNode {
    node: usize,
    score: f64,
}

#[derive(Serialize)]
struct Report {
    nodes: usize,
    edges: usize,
    dropped_edges: usize,
    iterations: usize,
    converged: bool,
    delta: f64,
    elapsed_secs: f64,
    top: Vec<RankedNode>,
}

impl Report {
    fn new(stats: &GraphStats, result: &PageRankResult, top: usize) -> Self {
        Self {
            nodes: stats.total_nodes,
            edges: stats.total_edges,
            dropped_edges: stats.dropped_edges,
            iterations: result.iterations,
            converged: result.converged(),
            delta: result.delta,
            elapsed_secs: result.elapsed_secs(),
            top: result
                .top_n(top)
                .into_iter()
                .map(|(node, score)| RankedNode { node, score })
                .collect(),
        }
    }

    fn write_text(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Number of nodes: {}", self.nodes)?;
        if self.converged {
            writeln!(out, "PageRank converged in {} iterations.", self.iterations)?;
        } else {
            writeln!(
                out,
                "PageRank stopped after {} iterations without converging (delta {:e}).",
                self.iterations, self.delta
            )?;
        }
        writeln!(out, "Time elapsed: {} seconds.", self.elapsed_secs)?;
        for (rank, entry) in self.top.iter().enumerate() {
            writeln!(out, "{:>4}. node {:<10} {:.10}", rank + 1, entry.node, entry.score)?;
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = PageRankConfig::default()
        .with_damping(cli.damping)
        .with_tolerance(cli.tolerance)
        .with_iteration_cap(cli.max_iterations)
        .with_threads(cli.threads)
        .with_strategy(cli.strategy.into());
    let policy = if cli.strict {
        EdgePolicy::Strict
    } else {
        EdgePolicy::Lenient
    };

    let edge_list = read_edge_list(&cli.file)?;
    let skipped_lines = edge_list.skipped_lines;
    let edges_before_header = edge_list.edges_before_header;
    let graph = edge_list
        .into_graph(policy)
        .with_context(|| format!("building graph from {}", cli.file.display()))?;

    let stats = GraphStats::from_graph(&graph);
    tracing::info!(
        nodes = stats.total_nodes,
        edges = stats.total_edges,
        dropped_edges = stats.dropped_edges,
        skipped_lines,
        edges_before_header,
        dangling = stats.dangling_nodes,
        max_in_degree = stats.max_in_degree,
        "loaded graph"
    );

    if let Some(threshold) = cli.hubs {
        let hubs = find_hubs(&graph, threshold);
        tracing::info!(
            threshold,
            count = hubs.len(),
            top = ?&hubs[..hubs.len().min(10)],
            "hub nodes by in-degree"
        );
    }

    let computer = PageRankComputer::new(graph, config)?;
    let result = computer.compute()?;

    let report = Report::new(&stats, &result, cli.top);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.format {
        OutputFormat::Text => report.write_text(&mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
