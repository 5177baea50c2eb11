//! Benchmarks for the chunk merge engine.
//!
//! Performance-critical paths:
//! - `accept_change`: locating the chunk and rewriting the left buffer
//! - `undo_last_operation`: reverting an accept on both buffers
//! - `normalize_content`: runs on every incoming session

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use meld_viewer::{ChunkMerger, DiffChunk, normalize_content};

/// Builds texts of `lines` lines where every tenth line differs, plus the
/// matching replace chunks.
fn fixture(lines: u32) -> (String, String, Vec<DiffChunk>) {
    let mut left = String::new();
    let mut right = String::new();
    let mut chunks = Vec::new();
    for i in 1..=lines {
        left.push_str(&format!("line {i}\n"));
        if i % 10 == 0 {
            right.push_str(&format!("changed {i}\n"));
            chunks.push(DiffChunk::new(i, i, i, i));
        } else {
            right.push_str(&format!("line {i}\n"));
        }
    }
    (left, right, chunks)
}

fn bench_accept_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge/accept_change");

    for lines in [100u32, 1_000, 10_000] {
        let (left, right, chunks) = fixture(lines);
        let target = chunks[chunks.len() / 2].modified_start_line_number;
        group.throughput(Throughput::Bytes(left.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter_batched(
                || ChunkMerger::new(left.as_str(), right.as_str()),
                |mut merger| black_box(merger.accept_change(black_box(target), &chunks)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_accept_all_then_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge/accept_all_then_undo");

    for lines in [100u32, 1_000] {
        let (left, right, chunks) = fixture(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, _| {
            b.iter_batched(
                || ChunkMerger::new(left.as_str(), right.as_str()),
                |mut merger| {
                    for chunk in &chunks {
                        merger.accept_change(chunk.modified_start_line_number, &chunks);
                    }
                    while merger.undo_last_operation().is_some() {}
                    black_box(merger)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let (left, right, _) = fixture(10_000);
    let right = format!("\n{right}\n");
    c.bench_function("merge/normalize_content", |b| {
        b.iter(|| black_box(normalize_content(black_box(&left), black_box(&right))));
    });
}

criterion_group!(
    benches,
    bench_accept_change,
    bench_accept_all_then_undo,
    bench_normalize
);
criterion_main!(benches);
