use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use group_engine::{impl_record, GroupDescriptor, GroupEngine};

struct Order {
    region: String,
    amount: f64,
    placed_at: NaiveDateTime,
}

impl_record!(Order { region, amount, placed_at });

fn build_orders(count: usize) -> Vec<Order> {
    let regions = ["North", "South", "East", "West"];
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");

    (0..count)
        .map(|i| Order {
            region: regions[i % regions.len()].to_string(),
            amount: (i % 997) as f64 * 1.5,
            placed_at: start + Duration::hours(i as i64 * 7),
        })
        .collect()
}

fn bench_grouping(c: &mut Criterion) {
    let orders = build_orders(100_000);
    let engine = GroupEngine::<Order>::new();

    let single = [GroupDescriptor::new("region")];
    c.bench_function("group_100k_by_region", |b| {
        b.iter(|| engine.group(black_box(&orders), &single))
    });

    let nested = [
        GroupDescriptor::new("region"),
        GroupDescriptor::new("placed_at").with_interval("year"),
        GroupDescriptor::new("amount").with_interval("100").with_expanded(false),
    ];
    c.bench_function("group_100k_three_levels_counted", |b| {
        b.iter(|| engine.group(black_box(&orders), &nested))
    });
}

criterion_group!(benches, bench_grouping);
criterion_main!(benches);
