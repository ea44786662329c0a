use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cfchain::{EngineConfig, Evidence, InferenceEngine, Rule, RuleSet};

/// Layered rule set: `width` symptoms feed layer 0, each layer's conclusions
/// feed the next, so a run needs `depth` passes.
fn layered_rules(width: usize, depth: usize) -> RuleSet {
    let mut rules = Vec::with_capacity(width * depth);
    for layer in 0..depth {
        for i in 0..width {
            let input = |j: usize| {
                if layer == 0 {
                    format!("s{j}")
                } else {
                    format!("l{}_{j}", layer - 1)
                }
            };
            let rule = Rule::builder(format!("r{layer}_{i}"))
                .premise(input(i))
                .premise(input((i + 1) % width))
                .premise(input((i + 7) % width))
                .conclusion(format!("l{layer}_{i}"))
                .weight(0.9)
                .build()
                .unwrap();
            rules.push(rule);
        }
    }
    RuleSet::new(rules).unwrap()
}

fn bench_infer(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer");

    for (width, depth) in [(16usize, 4usize), (64, 8), (256, 8)] {
        let rules = layered_rules(width, depth);
        // Half the symptoms observed so most rules fire on a partial match.
        let evidence = Evidence::from_checked((0..width).step_by(2).map(|j| format!("s{j}")));

        group.throughput(Throughput::Elements(rules.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("layered", format!("{width}x{depth}")),
            &(rules, evidence),
            |b, (rules, evidence)| {
                let engine = InferenceEngine::default();
                b.iter(|| black_box(engine.run_with_evidence(rules, evidence)));
            },
        );
    }

    group.finish();
}

fn bench_traced(c: &mut Criterion) {
    let rules = layered_rules(64, 8);
    let evidence = Evidence::from_checked((0..64).map(|j| format!("s{j}")));
    let engine = InferenceEngine::new(EngineConfig::traced());

    c.bench_function("infer/traced_64x8", |b| {
        b.iter(|| black_box(engine.run_with_evidence(&rules, &evidence)));
    });
}

criterion_group!(benches, bench_infer, bench_traced);
criterion_main!(benches);
