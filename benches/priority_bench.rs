//! Criterion benchmarks for hot paths in taskd.
//!
//! Run with:
//!   cargo bench
//!
//! Covers:
//!   - Priority derivation (every rule branch)
//!   - Filter/sort resolution from raw query params
//!   - Task row serialization (serde_json)

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use taskd::storage::TaskRow;
use taskd::tasks::{derive_priority, TaskFilter, TaskSort, TaskSnapshot};

// ─── Priority derivation ─────────────────────────────────────────────────────

fn bench_derive_priority(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    let completed = TaskSnapshot {
        is_completed: true,
        is_critical: true,
        due_date: Some(now + Duration::days(1)),
    };
    let critical = TaskSnapshot {
        is_completed: false,
        is_critical: true,
        due_date: None,
    };
    let due_soon = TaskSnapshot {
        is_completed: false,
        is_critical: false,
        due_date: Some(now + Duration::days(2)),
    };
    let due_later = TaskSnapshot {
        is_completed: false,
        is_critical: false,
        due_date: Some(now + Duration::days(30)),
    };
    let undated = TaskSnapshot {
        is_completed: false,
        is_critical: false,
        due_date: None,
    };

    c.bench_function("derive_priority_completed", |b| {
        b.iter(|| black_box(derive_priority(black_box(&completed), now)));
    });
    c.bench_function("derive_priority_critical", |b| {
        b.iter(|| black_box(derive_priority(black_box(&critical), now)));
    });
    c.bench_function("derive_priority_due_soon", |b| {
        b.iter(|| black_box(derive_priority(black_box(&due_soon), now)));
    });
    c.bench_function("derive_priority_due_later", |b| {
        b.iter(|| black_box(derive_priority(black_box(&due_later), now)));
    });
    c.bench_function("derive_priority_undated", |b| {
        b.iter(|| black_box(derive_priority(black_box(&undated), now)));
    });
}

// ─── Query resolution ────────────────────────────────────────────────────────

fn bench_query_resolution(c: &mut Criterion) {
    c.bench_function("filter_from_params", |b| {
        b.iter(|| {
            let f = TaskFilter::from_params(black_box(Some("isCompleted")), black_box(Some("true")));
            black_box(f);
        });
    });

    c.bench_function("filter_from_params_unknown", |b| {
        b.iter(|| {
            let f = TaskFilter::from_params(black_box(Some("assignee")), black_box(Some("bob")));
            black_box(f);
        });
    });

    c.bench_function("sort_from_param", |b| {
        b.iter(|| {
            let s = TaskSort::from_param(black_box(Some("dueDate")));
            black_box(s);
        });
    });

    c.bench_function("list_sql_assembly", |b| {
        let filter = TaskFilter::Priority("high".to_string());
        let sort = TaskSort::PriorityRank;
        b.iter(|| {
            let sql = format!(
                "SELECT * FROM tasks{}{}",
                black_box(&filter).where_sql(),
                black_box(sort).order_sql()
            );
            black_box(sql);
        });
    });
}

// ─── Serialization ───────────────────────────────────────────────────────────

fn bench_task_serialize(c: &mut Criterion) {
    let row = TaskRow {
        id: 42,
        public_id: "7b1de3a0-9c44-4be1-9d3a-0b2f6e4c8a11".to_string(),
        title: "Prepare quarterly report".to_string(),
        description: Some("Collect figures from every team lead first.".to_string()),
        priority: "high".to_string(),
        due_date: Some("2026-03-04T12:00:00+00:00".to_string()),
        is_completed: false,
        is_critical: true,
        created_at: "2026-03-01T09:00:00+00:00".to_string(),
        updated_at: "2026-03-01T09:00:00+00:00".to_string(),
    };

    c.bench_function("task_row_to_json", |b| {
        b.iter(|| {
            let s = serde_json::to_string(black_box(&row)).unwrap();
            black_box(s);
        });
    });

    let listing: Vec<TaskRow> = (0..100)
        .map(|i| TaskRow {
            id: i,
            title: format!("Task {i}"),
            ..row.clone()
        })
        .collect();

    c.bench_function("task_listing_100_to_json", |b| {
        b.iter(|| {
            let s = serde_json::to_string(black_box(&listing)).unwrap();
            black_box(s);
        });
    });
}

// ─── Entry point ─────────────────────────────────────────────────────────────

criterion_group!(
    benches,
    bench_derive_priority,
    bench_query_resolution,
    bench_task_serialize
);
criterion_main!(benches);
