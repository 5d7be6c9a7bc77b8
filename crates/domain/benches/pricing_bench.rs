use chrono::{Duration, Utc};
use common::AggregateId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Discount, Money, PricingCalculator, Product, discounted_price};

fn bench_discounted_price(c: &mut Criterion) {
    let now = Utc::now();
    let base = Money::new(1999, 100).unwrap();
    let percent = Discount::parse_percentage("12.5").unwrap();
    let discount = Discount::new(percent, now - Duration::hours(1), now + Duration::hours(1)).unwrap();

    c.bench_function("pricing/discounted_price", |b| {
        b.iter(|| discounted_price(&base, Some(&discount), now).unwrap());
    });

    c.bench_function("pricing/display_string", |b| {
        let price = discounted_price(&base, Some(&discount), now).unwrap();
        b.iter(|| price.to_display_string());
    });
}

fn bench_effective_price(c: &mut Criterion) {
    let now = Utc::now();
    let mut product = Product::create(
        AggregateId::new(),
        "Benchmark Widget",
        "",
        "bench",
        Money::new(1000, 100).unwrap(),
        now,
    )
    .unwrap();
    product.activate(now).unwrap();
    let percent = Discount::parse_percentage("20").unwrap();
    product
        .apply_discount(
            Discount::new(percent, now, now + Duration::days(1)).unwrap(),
            now,
        )
        .unwrap();
    let calculator = PricingCalculator::new();

    c.bench_function("pricing/effective_price", |b| {
        b.iter(|| calculator.effective_price(&product, now).unwrap());
    });
}

fn bench_parse_percentage(c: &mut Criterion) {
    c.bench_function("pricing/parse_percentage", |b| {
        b.iter(|| Discount::parse_percentage("33.333").unwrap());
    });
}

criterion_group!(
    benches,
    bench_discounted_price,
    bench_effective_price,
    bench_parse_percentage
);
criterion_main!(benches);
