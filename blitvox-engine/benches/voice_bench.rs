//! Per-sample cost of the oscillator, the ladder filter, and the full patch.

use blitvox_core::random::Randomizer;
use blitvox_engine::{BlitOscillator, Engine, LadderFilter, Patch, Vco};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SR: f32 = 48_000.0;
const BLOCK: usize = 512;

fn bench_oscillator(c: &mut Criterion) {
    let mut osc = BlitOscillator::with_rng(&SR, Randomizer::new(StdRng::seed_from_u64(1)));
    osc.set_frequency(220.0);
    osc.set_pulse_width(0.4);
    c.bench_function("blit_oscillator_512", |b| {
        b.iter(|| {
            for _ in 0..BLOCK {
                osc.process();
                black_box(osc.waves());
            }
        })
    });
}

fn bench_ladder(c: &mut Criterion) {
    let mut lf = LadderFilter::new();
    c.bench_function("ladder_filter_512", |b| {
        b.iter(|| {
            for i in 0..BLOCK {
                let x = if i % 64 < 32 { 0.5 } else { -0.5 };
                black_box(lf.process(black_box(x), 0.3, 0.6));
            }
        })
    });
}

fn bench_patch(c: &mut Criterion) {
    let vco = Vco::with_rng(&SR, Randomizer::new(StdRng::seed_from_u64(2)));
    let mut engine = Engine::new(Patch::from_vco(vco, SR), SR);
    let mut buf = [0.0_f32; BLOCK];
    c.bench_function("patch_render_512", |b| {
        b.iter(|| {
            engine.render(&mut buf);
            black_box(&buf);
        })
    });
}

criterion_group!(benches, bench_oscillator, bench_ladder, bench_patch);
criterion_main!(benches);
