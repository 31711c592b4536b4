//! Benchmarks for the CPU copy of the update rule.
//!
//! Run with: `cargo bench --bench kernel`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use shapeswarm::kernel::{step_texel, texel_hash};
use shapeswarm::{
    text_mesh, GridSize, OriginTexture, PointerAttraction, ReferenceSwarm, SimParams, Vec3, Vec4,
};

fn bench_hash(c: &mut Criterion) {
    c.bench_function("texel_hash", |b| {
        let mut x = 0u32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(texel_hash(x & 1023, x >> 10, 0.5))
        })
    });
}

fn bench_step_texel(c: &mut Criterion) {
    let params = SimParams::default();
    let pointer = PointerAttraction::new(Vec3::new(0.1, 0.1, 0.0), 0.2);
    c.bench_function("step_texel", |b| {
        b.iter(|| {
            black_box(step_texel(
                black_box(Vec4::new(0.1, 0.12, 0.05, 0.0)),
                Vec4::ZERO,
                (3, 5),
                0.5,
                &pointer,
                &params,
            ))
        })
    });
}

fn bench_grid_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("reference_step");
    group.sample_size(20);

    let mesh = text_mesh("RUST");
    let params = SimParams::default();
    let pointer = PointerAttraction::inactive(0.2);
    for size in [64u32, 256, 512] {
        let mut rng = SmallRng::seed_from_u64(3);
        let origin = OriginTexture::from_mesh_with_rng(&mesh, GridSize::new(size, size), &mut rng);
        let mut swarm = ReferenceSwarm::new(origin, params);
        let mut frame = 0u32;
        group.bench_function(BenchmarkId::from_parameter(size * size), |b| {
            b.iter(|| {
                frame += 1;
                black_box(swarm.step(params.phase(frame as f32 / 60.0), &pointer))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_hash, bench_step_texel, bench_grid_step);
criterion_main!(benches);
