use carebridge_types::RawSubmission;
use carebridge_validation::validate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for desc_len in [0, 100, 1000] {
        group.bench_with_input(
            criterion::BenchmarkId::new("description_len", desc_len),
            &desc_len,
            |b, &n| {
                let raw = RawSubmission::new("  City Blood Bank  ", "blood_bank", "Mumbai, 400001")
                    .with_quantity("A+, B+, O+ available")
                    .with_description("x".repeat(n));

                b.iter(|| {
                    black_box(validate(black_box(&raw)).ok());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
