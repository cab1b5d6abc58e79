use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use dmg_rs::integrate::cumulative_trapezoid;
use dmg_rs::{ChannelReader, ReadOptions, Units, parse};

const MODERN_V2: &str = include_str!("../tests/data/CE89146.V2");
const LEGACY_V2: &str = include_str!("../tests/data/LA116TH.RAW");
const UNCORRECTED_V1: &str = include_str!("../tests/data/CE89146.V1");

/// Generate a smooth strong-motion-like acceleration record.
fn acceleration_samples(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.005;
            (t * 12.0).sin() * (-t * 0.5).exp() * 150.0
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(MODERN_V2.len() as u64));
    for (name, units) in [("acc", Units::Acc), ("vel", Units::Vel), ("disp", Units::Disp)] {
        let options = ReadOptions::new().with_units(units);
        group.bench_function(format!("modern_v2/{name}"), |b| {
            b.iter(|| parse(black_box(MODERN_V2), &options).unwrap())
        });
    }

    let options = ReadOptions::new();
    group.throughput(Throughput::Bytes(LEGACY_V2.len() as u64));
    group.bench_function("legacy_v2/acc", |b| {
        b.iter(|| parse(black_box(LEGACY_V2), &options).unwrap())
    });
    group.throughput(Throughput::Bytes(UNCORRECTED_V1.len() as u64));
    group.bench_function("v1/acc", |b| {
        b.iter(|| parse(black_box(UNCORRECTED_V1), &options).unwrap())
    });

    group.finish();
}

fn bench_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader");

    group.throughput(Throughput::Bytes(MODERN_V2.len() as u64));
    group.bench_function("modern_v2/channels", |b| {
        b.iter(|| {
            let reader = ChannelReader::new(black_box(MODERN_V2)).unwrap();
            reader.map(|c| c.unwrap().acceleration.len()).sum::<usize>()
        })
    });

    group.finish();
}

fn bench_integrate(c: &mut Criterion) {
    let samples = acceleration_samples(20_000);

    let mut group = c.benchmark_group("integrate");

    group.throughput(Throughput::Elements(samples.len() as u64));
    group.bench_function("cumulative_trapezoid/20000samp", |b| {
        b.iter(|| cumulative_trapezoid(black_box(&samples), 0.005))
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_reader, bench_integrate);
criterion_main!(benches);
