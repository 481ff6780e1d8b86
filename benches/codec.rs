use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fmg_carry::{decode, encode, CarryEngine, Container};
use std::io::Cursor;

/// Container with `count` entries in runs of 50 consecutive identifiers
fn make_container(count: u32) -> Container {
    let mut fmg = Container::new("bench.fmg");
    for i in 0..count {
        let id = (i / 50) * 1000 + (i % 50);
        fmg.set(id, format!("Localized text number {} with some padding", i));
    }
    fmg
}

fn encode_to_vec(container: &Container) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    encode(container, &mut cursor).unwrap();
    cursor.into_inner()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for count in [100, 1_000, 10_000] {
        let fmg = make_container(count);
        let size = encode_to_vec(&fmg).len();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &fmg, |b, fmg| {
            b.iter(|| encode_to_vec(fmg));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for count in [100, 1_000, 10_000] {
        let bytes = encode_to_vec(&make_container(count));
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &bytes, |b, bytes| {
            b.iter(|| decode(&mut Cursor::new(bytes.as_slice()), "bench.fmg").unwrap());
        });
    }
    group.finish();
}

fn bench_carry_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("carry_plan");

    for count in [1_000, 10_000] {
        let base = make_container(count);
        let translation = make_container(count);
        let mut updated = make_container(count);
        // Reword every tenth entry
        let ids: Vec<u32> = updated.ids().step_by(10).collect();
        for id in ids {
            updated.set(id, "Reworded source text");
        }

        let engine = CarryEngine::default();
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| engine.plan(&base, &updated, &translation, None));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_carry_plan);
criterion_main!(benches);
