use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pagerank_core::{EdgePolicy, Graph, PageRankComputer, PageRankConfig, UpdateStrategy};

/// Deterministic pseudo-random graph with roughly `avg_degree` out-edges per
/// node and about one node in twenty left dangling.
fn synthetic_edges(n: usize, avg_degree: usize) -> Vec<(usize, usize)> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut edges = Vec::with_capacity(n * avg_degree);
    for src in 0..n {
        if next() % 20 == 0 {
            continue;
        }
        for _ in 0..avg_degree {
            edges.push((src, (next() % n as u64) as usize));
        }
    }
    edges
}

fn bench_threads(c: &mut Criterion) {
    let n = 100_000;
    let edges = synthetic_edges(n, 8);
    let graph = Graph::with_policy(n, &edges, EdgePolicy::Strict).unwrap();
    let max_threads = std::thread::available_parallelism().map_or(1, |p| p.get());

    let mut group = c.benchmark_group("pagerank_threads");
    group.sample_size(10);
    for threads in [1, 2, 4, 8, 16].into_iter().filter(|&t| t <= max_threads) {
        for strategy in [UpdateStrategy::Scatter, UpdateStrategy::Gather] {
            let config = PageRankConfig::default()
                .with_threads(Some(threads))
                .with_strategy(strategy);
            let computer = PageRankComputer::new(graph.clone(), config).unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), threads),
                &computer,
                |b, computer| b.iter(|| black_box(computer.compute().unwrap())),
            );
        }
    }
    group.finish();
}

fn bench_graph_build(c: &mut Criterion) {
    let n = 100_000;
    let edges = synthetic_edges(n, 8);
    c.bench_function("graph_build_100k", |b| {
        b.iter(|| black_box(Graph::new(n, black_box(&edges)).unwrap()))
    });
}

criterion_group!(benches, bench_threads, bench_graph_build);
criterion_main!(benches);
