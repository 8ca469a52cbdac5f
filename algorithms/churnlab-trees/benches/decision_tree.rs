use churnlab::benchmarks::config;
use churnlab::prelude::*;
use churnlab_trees::{DecisionTree, RandomForest};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;

fn generate_dataset(nsamples: usize, rng: &mut SmallRng) -> Dataset<f64, bool> {
    let records = Array2::random_using((nsamples, 8), Uniform::new(-1., 1.), rng);
    let targets = records.map_axis(Axis(1), |row| row[0] + row[1] > 0.);

    Dataset::new(records, targets)
}

fn decision_tree_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let training_set_sizes = &[100, 1000, 10000];

    let hyperparams = DecisionTree::params();

    let mut group = c.benchmark_group("decision_tree");
    config::set_default_benchmark_configs(&mut group);

    for n in training_set_sizes.iter() {
        let dataset = generate_dataset(*n, &mut rng);

        group.bench_with_input(BenchmarkId::from_parameter(n), &dataset, |b, d| {
            b.iter(|| hyperparams.fit(d))
        });
    }

    group.finish();
}

fn random_forest_bench(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let training_set_sizes = &[100, 1000];

    let hyperparams = RandomForest::params().n_trees(20);

    let mut group = c.benchmark_group("random_forest");
    config::set_default_benchmark_configs(&mut group);

    for n in training_set_sizes.iter() {
        let dataset = generate_dataset(*n, &mut rng);

        group.bench_with_input(BenchmarkId::from_parameter(n), &dataset, |b, d| {
            b.iter(|| hyperparams.fit(d))
        });
    }

    group.finish();
}

criterion_group!(benches, decision_tree_bench, random_forest_bench);
criterion_main!(benches);
