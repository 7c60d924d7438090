use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warden_core::{codec, Registry, User};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_user(i: i64) -> User {
    let level = i % 3 + 1;
    let name = format!("user-{i}");
    let user = match level {
        1 => User::student(name, i, level, format!("G-{:02}", i % 40)),
        2 => User::teacher(name, i, level, "Informatics"),
        _ => User::administrator(name, i, level),
    };
    user.unwrap()
}

fn make_registry(count: i64) -> Registry {
    let mut reg = Registry::new();
    for i in 0..count {
        reg.add_user(make_user(i));
    }
    reg
}

// ---------------------------------------------------------------------------
// Benchmark: legacy decode
// ---------------------------------------------------------------------------

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for count in [100, 1_000, 10_000] {
        let text = make_registry(count).serialize();
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| black_box(codec::decode(text).unwrap()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: find by id vs find by name
// ---------------------------------------------------------------------------

fn bench_find(c: &mut Criterion) {
    let reg = make_registry(10_000);

    let mut group = c.benchmark_group("find_users");
    group.bench_function("by_id", |b| {
        b.iter(|| black_box(reg.find_users(black_box("9999")).len()));
    });
    group.bench_function("by_name", |b| {
        b.iter(|| black_box(reg.find_users(black_box("user-9999")).len()));
    });
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: stable sort
// ---------------------------------------------------------------------------

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_by_access_level");
    for count in [1_000, 10_000] {
        let reg = make_registry(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &reg, |b, reg| {
            b.iter(|| {
                let mut reg = reg.clone();
                reg.sort_by_access_level();
                black_box(reg)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode, bench_find, bench_sort);
criterion_main!(benches);
