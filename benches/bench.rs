//! Criterion benchmarks for usage-miner.
//!
//! Covers the two hot paths:
//! - Sessionization of a synthetic corpus, sequential and on the rayon pool
//! - Jaccard matching of users against a cluster matrix

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use usage_miner::access_log::RequestEvent;
use usage_miner::cluster::{ClusterMatrix, ClusterSimilarityMatcher};
use usage_miner::popularity::PopularityAnalyzer;
use usage_miner::session::Sessionizer;
use usage_miner::synthetic::random_user;

/// Generate a corpus of `users` users over `pages` distinct URLs.
fn generate_test_events(users: usize, pages: usize) -> Vec<RequestEvent> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut events = Vec::with_capacity(users * 20);

    for user in 0..users {
        let mut time = 0i64;
        for _ in 0..20 {
            // Roughly one request in five starts a new session.
            time += if rng.random_bool(0.2) {
                rng.random_range(601..3_600)
            } else {
                rng.random_range(1..300)
            };
            let page = rng.random_range(0..pages);
            events.push(RequestEvent::new(
                format!("host-{user}"),
                time,
                format!("/page/{page}.html"),
            ));
        }
    }
    events
}

/// Generate a random cluster matrix.
fn generate_test_matrix(pages: usize, clusters: usize) -> ClusterMatrix {
    let mut rng = StdRng::seed_from_u64(7);
    let rows: Vec<Vec<bool>> = (0..pages)
        .map(|_| (0..clusters).map(|_| rng.random_bool(0.3)).collect())
        .collect();
    let names = (0..pages).map(|p| format!("/page/{p}.html")).collect();
    ClusterMatrix::from_rows(names, &rows).unwrap()
}

fn bench_sessionization(c: &mut Criterion) {
    let mut group = c.benchmark_group("sessionization");
    group.sample_size(20);

    let events = generate_test_events(2_000, 150);
    let schema = Arc::new(PopularityAnalyzer::default().analyze(&events));
    let sessionizer = Sessionizer::new(schema, 600);

    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("popularity_analysis", |b| {
        b.iter(|| black_box(PopularityAnalyzer::default().analyze(black_box(&events))))
    });

    group.bench_function("sessionize_sequential", |b| {
        b.iter(|| black_box(sessionizer.sessionize(black_box(&events)).unwrap()))
    });

    group.bench_function("sessionize_parallel", |b| {
        b.iter(|| {
            black_box(
                sessionizer
                    .sessionize_parallel(black_box(&events), None)
                    .unwrap(),
            )
        })
    });

    group.finish();
}

fn bench_cluster_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_matching");

    for clusters in [10, 100, 1_000] {
        let matrix = generate_test_matrix(500, clusters);
        let user = random_user(500, &mut StdRng::seed_from_u64(clusters as u64));
        let matcher = ClusterSimilarityMatcher::new();

        group.throughput(Throughput::Elements(clusters as u64));
        group.bench_with_input(BenchmarkId::new("match_user", clusters), &matrix, |b, m| {
            b.iter(|| black_box(matcher.match_user(black_box(&user), m).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sessionization, bench_cluster_matching);
criterion_main!(benches);
