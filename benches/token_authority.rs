//! Performance benchmarks for bearer token issuance and verification.
//!
//! Run with: `cargo bench --bench token_authority`
//!
//! Every protected request pays for one verification, so `verify_bearer`
//! is the number to watch.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use travel_service::TokenAuthority;

const BENCH_SECRET: &[u8] = b"bench_jwt_secret_not_for_production";

fn bench_issue(c: &mut Criterion) {
    let authority = TokenAuthority::new(BENCH_SECRET, 15);

    c.bench_function("token_issue", |b| {
        b.iter(|| black_box(authority.issue().unwrap()))
    });
}

fn bench_verify(c: &mut Criterion) {
    let authority = TokenAuthority::new(BENCH_SECRET, 15);
    let header = format!("Bearer {}", authority.issue().unwrap());

    c.bench_function("token_verify_bearer", |b| {
        b.iter(|| black_box(authority.verify_bearer(black_box(&header)).unwrap()))
    });

    let forged = format!(
        "Bearer {}",
        TokenAuthority::new(b"other_secret", 15).issue().unwrap()
    );
    c.bench_function("token_verify_bearer_rejected", |b| {
        b.iter(|| black_box(authority.verify_bearer(black_box(&forged)).is_err()))
    });
}

criterion_group!(benches, bench_issue, bench_verify);
criterion_main!(benches);
