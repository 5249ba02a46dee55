//! Benchmarks for vp-cal hot paths.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vpcal_engine::{build_eotf_lut, gamut_compression_group, LUT_LEN};
use vpcal_lut::Lut1D;
use vpcal_math::pq;
use vpcal_ocio::builtin::names;
use vpcal_ocio::{Baker, Processor, Transform, TransformDirection};

/// PQ encode/decode over growing inputs.
fn bench_pq(c: &mut Criterion) {
    let mut group = c.benchmark_group("pq");

    for size in [1000, 10000, 100000].iter() {
        let values: Vec<f64> = (0..*size).map(|i| i as f64 / *size as f64).collect();
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("decode", size), &values, |b, v| {
            b.iter(|| v.iter().map(|&x| pq::decode(black_box(x))).collect::<Vec<_>>())
        });

        group.bench_with_input(BenchmarkId::new("encode", size), &values, |b, v| {
            b.iter(|| v.iter().map(|&x| pq::encode(black_box(x * 100.0))).collect::<Vec<_>>())
        });
    }

    group.finish();
}

/// Building the EOTF correction tables from measured curves.
fn bench_eotf_lut(c: &mut Criterion) {
    let curve: Vec<f64> = (0..LUT_LEN)
        .map(|j| (j as f64 / (LUT_LEN - 1) as f64).powf(1.1) * 15.0)
        .collect();
    let curves: [&[f64]; 3] = [&curve, &curve, &curve];

    c.bench_function("eotf_lut_4096", |b| {
        b.iter(|| build_eotf_lut(black_box(curves), 1500.0))
    });
}

/// Forward vs numerically inverted 1D LUT lookups.
fn bench_lut1d(c: &mut Criterion) {
    let mut group = c.benchmark_group("lut1d");

    let data: Vec<f32> = (0..LUT_LEN).map(|i| (i as f32 / 4095.0).powf(2.2)).collect();
    let lut = Lut1D::from_rgb(data.clone(), data.clone(), data, 0.0, 1.0).unwrap();
    let pixels: Vec<[f32; 3]> = (0..10000).map(|i| [i as f32 / 10000.0; 3]).collect();
    group.throughput(Throughput::Elements(10000));

    group.bench_function("forward", |b| {
        b.iter(|| pixels.iter().map(|&p| lut.apply_rgb(black_box(p))).collect::<Vec<_>>())
    });
    group.bench_function("inverse", |b| {
        b.iter(|| pixels.iter().map(|&p| lut.apply_inverse_rgb(black_box(p))).collect::<Vec<_>>())
    });

    group.finish();
}

/// Baking the gamut compression pipeline at common cube sizes.
fn bench_bake(c: &mut Criterion) {
    let mut group = c.benchmark_group("bake");
    group.sample_size(10);

    let pipeline = Transform::group(vec![
        gamut_compression_group([1.2, 1.15, 1.1]).into(),
        Transform::builtin(names::LINEAR_TO_ST2084, TransformDirection::Forward),
    ]);
    let processor = Processor::from_transform(&pipeline, TransformDirection::Forward).unwrap();
    let baker = Baker::new(&processor);

    for size in [17, 33, 65].iter() {
        group.throughput(Throughput::Elements((*size * *size * *size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &s| {
            b.iter(|| baker.bake_3d(s))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pq, bench_eotf_lut, bench_lut1d, bench_bake);
criterion_main!(benches);
