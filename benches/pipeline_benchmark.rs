use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lockstep::pipeline::{stage, StageContext};
use lockstep::{Pipeline, PipelineConfig, Token, WaitStrategy};

const TOKENS: u64 = 500;

fn run_chain(stages: usize, wait: WaitStrategy) -> u64 {
    let mut next = 0u64;
    let mut pipeline: Pipeline<'_, u64> = Pipeline::with_config(PipelineConfig {
        wait,
        ..PipelineConfig::default()
    });
    pipeline.add_stage(stage::from_fn(move |_: Option<u64>, _: &StageContext<'_>| {
        next += 1;
        if next > TOKENS {
            Token::Terminate
        } else {
            Token::Payload(next)
        }
    }));
    for _ in 1..stages {
        pipeline.add_stage(stage::from_fn(|input: Option<u64>, _: &StageContext<'_>| {
            input.map_or(Token::Bootstrap, |v| Token::Payload(black_box(v.wrapping_mul(31))))
        }));
    }
    match pipeline.run() {
        Ok(report) => report.cycles,
        Err(err) => panic!("benchmark pipeline failed: {err}"),
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for stages in [2usize, 5] {
        for wait in [WaitStrategy::Spin, WaitStrategy::Backoff] {
            group.bench_with_input(
                BenchmarkId::new(format!("{wait:?}").to_lowercase(), stages),
                &stages,
                |b, &stages| b.iter(|| black_box(run_chain(stages, wait))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
