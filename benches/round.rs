use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rankenv::{ClickModelKind, RankingConfig, RankingEnvironment, UniformSampler};
use std::hint::black_box;

fn env_for(
    num_items: usize,
    click_model: ClickModelKind,
    distance_threshold: Option<f64>,
) -> RankingEnvironment<UniformSampler, UniformSampler> {
    let cfg = RankingConfig {
        num_items,
        num_slots: 5,
        click_model,
        distance_threshold,
        batch_size: 16,
        seed: Some(123),
        ..RankingConfig::default()
    };
    // Deterministic, slightly-non-uniform weights.
    let weights =
        Array2::from_shape_fn((8, 12), |(i, j)| (((i * 7 + j * 3) % 11) as f64 - 5.0) / 10.0);
    let global = UniformSampler::new(12, -1.0, 1.0, 1).unwrap();
    let items = UniformSampler::new(8, -1.0, 1.0, 2).unwrap();
    RankingEnvironment::new(global, items, weights, cfg).unwrap()
}

fn bench_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("round");
    for &num_items in &[10usize, 100usize, 1000usize] {
        let action = Array2::from_shape_fn((16, 5), |(b, s)| (b * 5 + s) % num_items);

        let mut ghost = env_for(num_items, ClickModelKind::GhostActions, None);
        let id = BenchmarkId::new("ghost_actions", num_items);
        group.bench_with_input(id, &num_items, |b, &_n| {
            b.iter(|| {
                let round = ghost.begin_round().unwrap();
                let fb = ghost.apply(round, black_box(action.view())).unwrap();
                black_box(fb);
            })
        });

        let mut distance = env_for(num_items, ClickModelKind::DistanceBased, Some(0.25));
        let id = BenchmarkId::new("distance_based", num_items);
        group.bench_with_input(id, &num_items, |b, &_n| {
            b.iter(|| {
                let round = distance.begin_round().unwrap();
                let fb = distance.apply(round, black_box(action.view())).unwrap();
                black_box(fb);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_round);
criterion_main!(benches);
