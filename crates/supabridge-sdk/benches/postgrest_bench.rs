// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for turning table queries into PostgREST parameters.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use supabridge_core::query::{FilterValue, TableQuery};
use supabridge_sdk::query_params;

fn bench_simple_select(c: &mut Criterion) {
    let query = TableQuery::select("todos", "*");
    c.bench_function("query_params (select *)", |b| {
        b.iter(|| black_box(query_params(black_box(&query))));
    });
}

/// Filters, ordering, paging and a column list with quoted identifiers.
fn bench_loaded_select(c: &mut Criterion) {
    let mut query = TableQuery::select("orders", r#"id, "customer name", total, created_at"#)
        .order("created_at", false)
        .range(1000, 1049);
    for i in 0..8 {
        query = query.eq(format!("tag_{i}"), FilterValue::Text(format!("value-{i}")));
    }

    c.bench_function("query_params (8 filters, range)", |b| {
        b.iter(|| black_box(query_params(black_box(&query))));
    });
}

fn bench_returning_update(c: &mut Criterion) {
    let query = TableQuery::update("todos", json!({ "done": true, "title": "renamed" }))
        .eq("id", FilterValue::Integer(42))
        .returning("*");
    c.bench_function("query_params (update returning)", |b| {
        b.iter(|| black_box(query_params(black_box(&query))));
    });
}

criterion_group!(
    benches,
    bench_simple_select,
    bench_loaded_select,
    bench_returning_update
);
criterion_main!(benches);
