//! Identity and merge hot-path benchmarks.
//!
//! - `build_key`: normalization plus SHA-1 digest for one submission
//! - `validate`: cleaning a realistic submission with long notes
//! - `merge_repeat`: merging into a record that already carries notes
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench identity_merge_benchmark
//! ```

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use marks_core::{RawSubmission, build_key, create_record, merge, validate};
use serde_json::{Value, json};

fn sample_submission(i: usize) -> RawSubmission {
    let value = json!({
        "name": format!("  Jane   Doe {i} "),
        "email": format!("Jane.Doe{i}@Example.com"),
        "linkedin": format!("https://www.linkedin.com/in/jane-doe-{i}"),
        "org": "Acme, Inc. (Research & Development)",
        "notes": "Met at the conference; interested in follow-up!\n".repeat(12),
        "source_text": "Profile scraped from page.\r\n\tSenior engineer at Acme. ".repeat(10),
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn bench_build_key(c: &mut Criterion) {
    c.bench_function("build_key", |b| {
        b.iter(|| {
            build_key(
                black_box("  Jane   Doe "),
                black_box("Jane.Doe@Example.com"),
                black_box("https://www.linkedin.com/in/jane-doe"),
            )
        });
    });
}

fn bench_validate(c: &mut Criterion) {
    let raw = sample_submission(7);
    c.bench_function("validate", |b| {
        b.iter(|| validate(black_box(&raw)).unwrap());
    });
}

fn bench_merge(c: &mut Criterion) {
    let first = validate(&sample_submission(1)).unwrap();
    let existing = create_record(&first, "gemini-embedding-001");
    let incoming = validate(&sample_submission(2)).unwrap();

    c.bench_function("merge_repeat", |b| {
        b.iter(|| merge(black_box(&existing), black_box(&incoming)));
    });
}

criterion_group!(benches, bench_build_key, bench_validate, bench_merge);
criterion_main!(benches);
