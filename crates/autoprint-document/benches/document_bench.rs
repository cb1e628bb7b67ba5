// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the document completeness checks. The full
// inspection runs on every readiness poll that gets past the size check, so
// its cost bounds how tight the poll interval can be.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use autoprint_document::PDF;
use autoprint_document::pdf::blank_pdf;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Full inspection (magic, trailer, parse, fingerprint) of a 50-page blank
/// document.
fn bench_inspect(c: &mut Criterion) {
    let bytes = blank_pdf(50).expect("generate fixture");

    c.bench_function("inspect (50 blank pages)", |b| {
        b.iter(|| {
            let summary = PDF.inspect(black_box(&bytes)).expect("valid fixture");
            black_box(summary);
        });
    });
}

/// Trailer scan alone, the cheap check that rejects half-written files.
fn bench_trailer_scan(c: &mut Criterion) {
    let bytes = blank_pdf(50).expect("generate fixture");

    c.bench_function("trailer scan", |b| {
        b.iter(|| black_box(PDF.has_trailer(black_box(&bytes))));
    });
}

criterion_group!(benches, bench_inspect, bench_trailer_scan);
criterion_main!(benches);
