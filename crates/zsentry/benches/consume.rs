//! Benchmarks for `Sentry::consume`.
//!
//! - Marker-free terminal output in fragments of typical read sizes
//! - Output dense with `*` padding that never completes a marker
//! - A session start arriving in one piece and byte by byte
//!
//! Run with: `cargo bench -p zsentry -- consume`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use test_support::{ScriptedFactory, zrqinit};
use zsentry::Sentry;

// ============================================================================
// Test Data Generation
// ============================================================================

/// Shell-like output without any marker.
fn terminal_output(len: usize) -> Vec<u8> {
    b"drwxr-xr-x  2 user user 4096 Jan  1 00:00 src\r\n"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Output full of near misses: padding and escapes that never form a marker.
fn lookalike_output(len: usize) -> Vec<u8> {
    b"**\x18A**\x18B1 /* ** */ "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

fn quiet_sentry() -> Sentry<ScriptedFactory> {
    Sentry::builder(ScriptedFactory::new())
        .to_terminal(|bytes| {
            black_box(bytes);
        })
        .on_detect(|detection| {
            black_box(detection);
        })
        .on_retract(|| {})
        .sender(|bytes| {
            black_box(bytes);
        })
        .build()
        .expect("complete builder")
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_passthrough(c: &mut Criterion) {
    let mut group = c.benchmark_group("consume/passthrough");
    let stream = terminal_output(64 * 1024);

    for chunk in [64usize, 1024, 16 * 1024] {
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::new("plain", chunk), &chunk, |b, &chunk| {
            let mut sentry = quiet_sentry();
            b.iter(|| {
                for fragment in stream.chunks(chunk) {
                    sentry.consume(black_box(fragment));
                }
            });
        });
    }

    let lookalike = lookalike_output(64 * 1024);
    group.throughput(Throughput::Bytes(lookalike.len() as u64));
    group.bench_function("lookalike", |b| {
        let mut sentry = quiet_sentry();
        b.iter(|| {
            for fragment in lookalike.chunks(1024) {
                sentry.consume(black_box(fragment));
            }
        });
    });

    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("consume/detection");
    let wire = zrqinit();

    group.bench_function("whole_header", |b| {
        let mut sentry = quiet_sentry();
        b.iter(|| {
            sentry.consume(black_box(&wire));
            sentry.consume(b"\r\n");
        });
    });

    group.bench_function("byte_by_byte", |b| {
        let mut sentry = quiet_sentry();
        b.iter(|| {
            for byte in &wire {
                sentry.consume(std::slice::from_ref(black_box(byte)));
            }
            sentry.consume(b"\r\n");
        });
    });

    group.finish();
}

criterion_group!(benches, bench_passthrough, bench_detection);
criterion_main!(benches);
