//! Clock and tick-arithmetic benchmarks.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use gcmt_core::WtTime;

fn bench_now(c: &mut Criterion) {
    c.bench_function("time/now", |b| b.iter(|| black_box(gcmt::now())));
    c.bench_function("time/std_system_time_baseline", |b| {
        b.iter(|| black_box(std::time::SystemTime::now()));
    });
}

fn bench_conversions(c: &mut Criterion) {
    let mut group = c.benchmark_group("time/convert");
    let t = WtTime::from_unix(1_704_067_200, 123_456);
    group.bench_function("to_timespec", |b| b.iter(|| black_box(black_box(t).to_timespec())));
    for &ms in &[0u32, 50, 86_400_000] {
        let deadline = t.advance(ms);
        group.bench_with_input(BenchmarkId::new("millis_until", ms), &deadline, |b, d| {
            b.iter(|| black_box(black_box(*d).millis_until(t)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_now, bench_conversions);
criterion_main!(benches);
