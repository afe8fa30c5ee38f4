use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

use storefront_rs::models::{next_id, Cart, PriceInput, Product, ProductDraft};
use storefront_rs::repositories::{JsonFileProductRepository, ProductRepository};
use storefront_rs::services::{CatalogService, ChangeBroadcaster};

fn create_draft(i: usize) -> ProductDraft {
    ProductDraft {
        title: Some(format!("Benchmark Product {}", i)),
        description: Some(format!("Description for benchmark product {}", i)),
        code: Some(format!("BENCH-{}", i)),
        price: Some(PriceInput::Number(10.0 + i as f64 * 0.25)),
        category: Some("Benchmark".to_string()),
        ..Default::default()
    }
}

fn create_catalog(size: usize) -> Vec<Product> {
    let mut products = Vec::with_capacity(size);
    for i in 0..size {
        let product = Product::create(create_draft(i), i as u64 + 1).unwrap();
        products.push(product);
    }
    products
}

fn bench_next_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_id");
    group.sample_size(100);

    for size in [10, 100, 1000].iter() {
        let catalog = create_catalog(*size);
        group.bench_with_input(BenchmarkId::new("catalog", size), &catalog, |b, catalog| {
            b.iter(|| black_box(next_id(catalog)))
        });
    }

    group.finish();
}

fn bench_price_coercion(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_coercion");

    let text = PriceInput::from("1499.99");
    let number = PriceInput::from(1499.99);
    group.bench_function("text", |b| b.iter(|| black_box(text.coerce().unwrap())));
    group.bench_function("number", |b| b.iter(|| black_box(number.coerce().unwrap())));

    group.finish();
}

fn bench_cart_add_product(c: &mut Criterion) {
    let mut group = c.benchmark_group("cart_add_product");

    group.bench_function("increment_existing", |b| {
        let mut cart = Cart::new(1);
        for product in 0..50 {
            cart.add_product(product);
        }
        b.iter(|| black_box(cart.add_product(black_box(49))))
    });

    group.finish();
}

fn bench_collection_load(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("collection_load");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1000].iter() {
        let dir = TempDir::new().unwrap();
        let repository = JsonFileProductRepository::new(dir.path().join("products.json"));
        rt.block_on(repository.save_all(&create_catalog(*size)))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("products", size), size, |b, _| {
            b.iter(|| rt.block_on(async { black_box(repository.find_all().await.unwrap()) }))
        });
    }

    group.finish();
}

fn bench_product_add(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("product_add");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("add_to_catalog_of_100", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let repository = JsonFileProductRepository::new(dir.path().join("products.json"));
                rt.block_on(repository.save_all(&create_catalog(100)))
                    .unwrap();
                let service = CatalogService::new(Arc::new(repository), ChangeBroadcaster::default());
                (dir, service)
            },
            |(_dir, service)| {
                rt.block_on(async { black_box(service.add_product(create_draft(100)).await.unwrap()) })
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_next_id,
    bench_price_coercion,
    bench_cart_add_product,
    bench_collection_load,
    bench_product_add
);
criterion_main!(benches);
