//! Benchmarks for SQL construction and page fetches.
//!
//! Benchmark targets:
//! - Identifier sanitization: <5us
//! - Full query construction: <20us
//! - Page fetch over 10k rows (in-memory `SQLite`): <5ms

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use tablegrid::query::{
    build_count_query, build_order_clause, build_search_clause, build_select_query,
    sanitize_identifier,
};
use tablegrid::{DataProvider, GridRequest, PaginationInfo, SqliteGridBackend, TableSource};

const CLEAN_IDENT: &str = "created_at";
const HOSTILE_IDENT: &str = "name); DROP TABLE users; --";

fn columns(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("column_{i}")).collect()
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize_identifier");

    group.bench_function("clean", |b| {
        b.iter(|| sanitize_identifier(black_box(CLEAN_IDENT)));
    });

    group.bench_function("hostile", |b| {
        b.iter(|| sanitize_identifier(black_box(HOSTILE_IDENT)));
    });

    group.finish();
}

fn bench_query_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_construction");
    group.measurement_time(Duration::from_secs(5));

    for count in [1usize, 5, 20, 50] {
        let cols = columns(count);
        let pagination = PaginationInfo::calculate(10_000, 7, 20);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("columns", count), &cols, |b, cols| {
            b.iter(|| {
                let cols = cols.as_slice();
                let search = build_search_clause(black_box(cols), black_box("100% cotton"));
                let order = build_order_clause(black_box("column_0"), black_box("DESC"), cols);
                let count_query = build_count_query(black_box("products"), &search);
                let select = build_select_query("products", cols, &search, &order, &pagination);
                (count_query, select)
            });
        });
    }

    group.finish();
}

fn bench_fetch_page(c: &mut Criterion) {
    let backend = SqliteGridBackend::in_memory().expect("in-memory database");
    let mut sql = String::from("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, email TEXT);");
    sql.push_str("BEGIN;");
    for i in 0..10_000 {
        sql.push_str(&format!(
            "INSERT INTO users (name, email) VALUES ('user{i}', 'user{i}@example.com');"
        ));
    }
    sql.push_str("COMMIT;");
    backend.execute_batch(&sql).expect("seed users");

    let provider = DataProvider::new(Arc::new(backend));
    let source = TableSource::new(
        "users",
        "users",
        vec!["id".to_string(), "name".to_string(), "email".to_string()],
    )
    .with_sortable(vec!["id".to_string(), "name".to_string()]);

    let mut group = c.benchmark_group("fetch_page");
    group.measurement_time(Duration::from_secs(10));

    let first = GridRequest::new("users", 20);
    group.bench_function("first_page", |b| {
        b.iter(|| provider.fetch_page(&source, black_box(&first)));
    });

    let mut deep = GridRequest::new("users", 50);
    deep.page = 150;
    deep.sort_field = "name".to_string();
    group.bench_function("deep_sorted_page", |b| {
        b.iter(|| provider.fetch_page(&source, black_box(&deep)));
    });

    let mut searched = GridRequest::new("users", 20);
    searched.search = "user99".to_string();
    group.bench_function("search", |b| {
        b.iter(|| provider.fetch_page(&source, black_box(&searched)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_query_construction,
    bench_fetch_page
);
criterion_main!(benches);
