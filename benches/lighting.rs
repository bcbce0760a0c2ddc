use criterion::{criterion_group, criterion_main, Criterion, black_box};

use rand::SeedableRng;
use rand::rngs::StdRng;

use voxgi::lighting::{CpuLighting, DirectionPool, GridConfig, LightingPipeline};
use voxgi::lighting::directions::random_unit_vector;
use voxgi::voxel::{Chunk, SceneKind, SceneParams};

fn cornell_backend(size: u32) -> (LightingPipeline, CpuLighting) {
    let grid = GridConfig::with_chunk_size(size);
    let mut rng = StdRng::seed_from_u64(7);
    let chunk = Chunk::generate(size, SceneKind::CornellBox, &SceneParams::default(), &mut rng);
    let pipeline = LightingPipeline::new(grid, 7).expect("valid grid");
    let backend = CpuLighting::new(chunk, grid).expect("chunk matches grid");
    (pipeline, backend)
}

fn bench_cpu_frame_16(c: &mut Criterion) {
    let (mut pipeline, mut backend) = cornell_backend(16);

    c.bench_function("cpu_lighting_frame_16", |b| {
        b.iter(|| pipeline.run_frame(black_box(&mut backend)).expect("frame"));
    });
}

fn bench_cpu_frame_32(c: &mut Criterion) {
    let (mut pipeline, mut backend) = cornell_backend(32);

    c.bench_function("cpu_lighting_frame_32", |b| {
        b.iter(|| pipeline.run_frame(black_box(&mut backend)).expect("frame"));
    });
}

fn bench_direction_refresh(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pool = DirectionPool::new(256, &mut rng);

    c.bench_function("direction_pool_refresh_256", |b| {
        b.iter(|| pool.refresh(black_box(&mut rng)));
    });

    c.bench_function("random_unit_vector", |b| {
        b.iter(|| random_unit_vector(black_box(&mut rng)));
    });
}

fn bench_scene_generation(c: &mut Criterion) {
    c.bench_function("generate_inverted_sphere_32", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| {
            Chunk::generate(
                black_box(32),
                SceneKind::InvertedSphere,
                &SceneParams::default(),
                &mut rng,
            )
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_frame_16,
    bench_cpu_frame_32,
    bench_direction_refresh,
    bench_scene_generation,
);
criterion_main!(benches);
