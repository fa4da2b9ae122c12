use answer_king::feature::item::{item_repository::NewItem, item_service::validate_item};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::Number;

fn validate_benchmark(c: &mut Criterion) {
    let item = NewItem {
        name: Some("Burger".to_string()),
        price: Some(Number::from_f64(1.99).expect("finite price")),
    };
    c.bench_function("validate_item", |b| {
        b.iter(|| validate_item(black_box(item.clone())))
    });
}

criterion_group!(benches, validate_benchmark);
criterion_main!(benches);
