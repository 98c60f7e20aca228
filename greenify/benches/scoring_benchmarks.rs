use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use greenify::{
    DailyInputs,
    entry::EntryManager,
    scoring::{sanitize_miles, score},
};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(offset)
}

/// Benchmark the point formula on a busy day
fn bench_score(c: &mut Criterion) {
    let inputs = DailyInputs {
        trash_count: 4,
        recycle_count: 9,
        miles_driven: 37.5,
        reusable_bottle: true,
        reusable_bag: true,
        ..DailyInputs::empty(day(0))
    };

    c.bench_function("score_busy_day", |b| {
        b.iter(|| score(std::hint::black_box(&inputs)));
    });
}

/// Benchmark parsing free-text mileage
fn bench_sanitize_miles(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize_miles");
    for text in ["12.5", "", "not a number"] {
        group.bench_with_input(BenchmarkId::from_parameter(text), &text, |b, text| {
            b.iter(|| sanitize_miles(std::hint::black_box(text)));
        });
    }
    group.finish();
}

/// Benchmark saving a year of entries for one user
fn bench_upsert_year(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("upsert_365_days", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let entries = EntryManager::new(10);
                for offset in 0..365 {
                    let inputs = DailyInputs {
                        recycle_count: (offset % 7) as u32,
                        ..DailyInputs::empty(day(offset))
                    };
                    entries.upsert(1, inputs).await.unwrap();
                }
            })
        });
    });
}

criterion_group!(benches, bench_score, bench_sanitize_miles, bench_upsert_year);
criterion_main!(benches);
