use criterion::{Criterion, black_box, criterion_group, criterion_main};
use strata_terrain::{
    ChunkDims, ContinentalnessParams, OctaveSampler, TerrainConfig, TerrainPipeline,
    generate_continentalness,
};
use strata_terrain::seed::stage_rng;
use strata_voxel::ChunkCoord;

fn bench_continentalness(c: &mut Criterion) {
    let params = ContinentalnessParams::default();
    c.bench_function("continentalness_16", |bencher| {
        bencher.iter(|| {
            black_box(generate_continentalness(
                42,
                black_box(ChunkCoord::new(3, 7)),
                16,
                &params,
            ))
        })
    });
}

fn bench_octave_map(c: &mut Criterion) {
    let octaves = strata_terrain::PlainsParams::default().octaves;
    let sampler = OctaveSampler::new(&mut stage_rng(42, "bench"), &octaves, (0, 0), 42);
    c.bench_function("octave_map_16", |bencher| {
        bencher.iter(|| black_box(sampler.accumulate_map(16)))
    });
}

fn bench_full_chunk(c: &mut Criterion) {
    let pipeline =
        TerrainPipeline::new(42, ChunkDims::default(), TerrainConfig::default()).unwrap();
    let mut x = 0;
    c.bench_function("chunk_job_16x128", |bencher| {
        bencher.iter(|| {
            x += 1;
            black_box(pipeline.generate(ChunkCoord::new(x, 0)).unwrap())
        })
    });
}

criterion_group!(benches, bench_continentalness, bench_octave_map, bench_full_chunk);
criterion_main!(benches);
