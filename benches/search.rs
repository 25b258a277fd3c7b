//! Beam-search benchmark over a synthetic random corpus.
//!
//! Measures end-to-end k-NN latency at several beam widths, with the
//! context recycled across iterations the way a real caller would.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use omega_search::{
    GraphBuilder, IndexMeta, MemorySource, Metric, QueryMeta, Searcher, SearcherParams,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIM: usize = 64;
const N: usize = 10_000;

fn build_searcher(ef: usize) -> Searcher {
    let meta = IndexMeta::new(DIM, Metric::SquaredEuclidean);
    let mut builder = GraphBuilder::new(meta).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    for i in 0..N {
        let vec: Vec<f32> = (0..DIM).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        builder.insert(i as u64, &vec).unwrap();
    }
    let source = MemorySource::new(builder.finish());

    let mut params = SearcherParams::default();
    params.ef = ef;
    let mut searcher = Searcher::new();
    searcher.init(params).unwrap();
    searcher.load(&source).unwrap();
    searcher
}

fn bench_knn(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(23);
    let queries: Vec<Vec<f32>> = (0..64)
        .map(|_| (0..DIM).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
        .collect();
    let qmeta = QueryMeta::f32(DIM);

    let mut group = c.benchmark_group("knn_search");
    for ef in [50, 100, 200] {
        let searcher = build_searcher(ef);
        let mut ctx = searcher.create_context();
        let mut cursor = 0usize;
        group.bench_with_input(BenchmarkId::from_parameter(ef), &ef, |b, _| {
            b.iter(|| {
                let query = &queries[cursor % queries.len()];
                cursor += 1;
                ctx.set_topk(10);
                searcher.search(black_box(query), &qmeta, &mut ctx).unwrap();
                black_box(ctx.results().len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_knn);
criterion_main!(benches);
