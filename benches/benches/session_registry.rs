//! Benchmarks for the daemon's session registry and event encoding.
//!
//! Performance-critical paths:
//! - `create`: id assignment and insertion under the registry lock
//! - `apply_file_change`: fan-out of a file change to every referencing session
//! - `to_frame_payload`: JSON encoding of every broadcast event

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use meld_kernel::events::ServerEvent;
use meld_kernel::session::{DiffSource, SessionRegistry};
use std::path::PathBuf;

fn source(i: usize) -> DiffSource {
    DiffSource {
        left_path: Some(PathBuf::from(format!("/work/file_{}.txt", i % 16))),
        right_path: None,
        left_content: Some(format!("left {i}\n")),
        right_content: Some(format!("right {i}\n")),
    }
}

fn bench_create(c: &mut Criterion) {
    c.bench_function("registry/create", |b| {
        b.iter_batched(
            || SessionRegistry::new(50),
            |mut registry| {
                for i in 0..100 {
                    black_box(registry.create(source(i)));
                }
                registry
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_apply_file_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/apply_file_change");

    for sessions in [16usize, 256, 4096] {
        let mut registry = SessionRegistry::new(50);
        for i in 0..sessions {
            registry.create(source(i));
        }
        let path = PathBuf::from("/work/file_3.txt");
        group.bench_with_input(BenchmarkId::from_parameter(sessions), &sessions, |b, _| {
            b.iter(|| black_box(registry.apply_file_change(&path, "updated\n")));
        });
    }

    group.finish();
}

fn bench_encode_events(c: &mut Criterion) {
    let mut registry = SessionRegistry::new(50);
    let session = registry.create(DiffSource {
        left_content: Some("x".repeat(64 * 1024)),
        right_content: Some("y".repeat(64 * 1024)),
        ..source(0)
    });
    let event = ServerEvent::Diff(session);

    c.bench_function("events/to_frame_payload", |b| {
        b.iter(|| black_box(event.to_frame_payload()));
    });
}

criterion_group!(
    benches,
    bench_create,
    bench_apply_file_change,
    bench_encode_events
);
criterion_main!(benches);
