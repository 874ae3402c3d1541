//! Benchmarks for infragen core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use infragen::core::catalog::Catalog;
use infragen::core::types::RawParameters;
use infragen::core::{renderer, validator};
use infragen::llm;
use infragen::provenance::hasher;

const LAMBDA_TEMPLATE: &str = include_str!("../templates/lambda.tf.tmpl");

fn lambda_params() -> RawParameters {
    serde_json::from_str(
        r#"{
  "region": "us-east-1",
  "name": "thumbnailer",
  "runtime": "python3.12",
  "handler": "app.handler",
  "filename": "build/thumbnailer.zip",
  "role_arn": "arn:aws:iam::123456789012:role/lambda-exec"
}"#,
    )
    .unwrap()
}

fn bench_validate_and_render(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let kind = catalog.get("lambda").unwrap();
    let raw = lambda_params();

    c.bench_function("coerce_lambda", |b| {
        b.iter(|| {
            let params = validator::coerce(black_box(&raw), kind).unwrap();
            black_box(params);
        });
    });

    let params = validator::coerce(&raw, kind).unwrap();
    c.bench_function("render_lambda", |b| {
        b.iter(|| {
            let out = renderer::resolve_template(black_box(LAMBDA_TEMPLATE), &params).unwrap();
            black_box(out);
        });
    });
}

fn bench_strip_code_fence(c: &mut Criterion) {
    let mut group = c.benchmark_group("strip_code_fence");
    for keys in [2, 16, 128] {
        let body = (0..keys)
            .map(|i| format!("  \"key_{i:03}\": \"value-{i}\""))
            .collect::<Vec<_>>()
            .join(",\n");
        let response = format!("```json\n{{\n{body}\n}}\n```\n");
        group.bench_with_input(BenchmarkId::from_parameter(keys), &response, |b, response| {
            b.iter(|| {
                let params = llm::parse_parameters(black_box(response)).unwrap();
                black_box(params);
            });
        });
    }
    group.finish();
}

fn bench_hash_artifact(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();

    let mut group = c.benchmark_group("hash_artifact");
    for size_kb in [1, 64, 1024] {
        let path = dir.path().join(format!("bench_{size_kb}k.tf"));
        let data = LAMBDA_TEMPLATE.repeat(size_kb * 1024 / LAMBDA_TEMPLATE.len() + 1);
        std::fs::write(&path, &data).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size_kb), &path, |b, path| {
            b.iter(|| {
                let hash = hasher::hash_file(black_box(path)).unwrap();
                black_box(hash);
            });
        });
    }
    group.finish();
}

fn bench_catalog_parse(c: &mut Criterion) {
    let yaml = r#"
kinds:
  s3:
    template: s3.tf.tmpl
    required: [region, name]
  rds:
    template: rds.tf.tmpl
    required:
      - region
      - name
      - { name: allocated_storage, type: integer }
      - { name: multi_az, type: boolean }
"#;

    c.bench_function("catalog_parse", |b| {
        b.iter(|| {
            let catalog = Catalog::parse(black_box(yaml)).unwrap();
            black_box(catalog);
        });
    });
}

criterion_group!(
    benches,
    bench_validate_and_render,
    bench_strip_code_fence,
    bench_hash_artifact,
    bench_catalog_parse
);
criterion_main!(benches);
