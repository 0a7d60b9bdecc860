//! Pipeline benchmarks
//!
//! Measures the full analysis at interactive sizes (hundreds of
//! brand/category pairs).
//!
//! Run with: cargo bench --bench pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rank_insights::experiment::Experiment;
use rank_insights::InsightEngine;
use serde_json::{json, Map, Value};

/// Build an experiment where every brand is ranked in every category
fn synthetic_experiment(brands: usize, categories: usize) -> Experiment {
    let brand_names: Vec<String> = (0..brands).map(|i| format!("Brand{i:03}")).collect();
    let category_names: Vec<String> = (0..categories).map(|i| format!("Category{i:02}")).collect();

    let mut builder = Experiment::builder(1)
        .companies(brand_names.clone())
        .categories(category_names.clone());
    for (c, category) in category_names.iter().enumerate() {
        let rankings: Map<String, Value> = brand_names
            .iter()
            .enumerate()
            .map(|(b, brand)| (brand.clone(), json!((b + c) % brands + 1)))
            .collect();
        let citations: Vec<Value> = (0..5)
            .map(|i| json!({"title": format!("Source {i}"), "url": format!("https://example.com/{}", (c + i) % 7)}))
            .collect();
        builder = builder.result(
            category.clone(),
            json!({"rankings": rankings, "metadata": {"citations": citations}}),
        );
    }
    builder.build()
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let engine = InsightEngine::default();

    for (brands, categories) in [(5, 3), (20, 10), (50, 20)] {
        let experiment = synthetic_experiment(brands, categories);
        group.bench_with_input(
            BenchmarkId::new("full_pipeline", format!("{brands}x{categories}")),
            &experiment,
            |b, experiment| {
                b.iter(|| engine.analyze(black_box(experiment)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
