use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scrollshot::{CaptureJob, Config, ScrollPlan};
use std::time::Duration;

#[cfg(feature = "integration_benchmarks")]
use scrollshot::Session;
#[cfg(feature = "integration_benchmarks")]
use tokio::runtime::Runtime;

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

// === UNIT BENCHMARKS ===

fn benchmark_config_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("config");
    configure_fast_group(&mut group);

    group.bench_function("creation", |b| {
        b.iter(|| {
            let config = Config::default();
            black_box(config);
        });
    });

    group.finish();
}

fn benchmark_capture_job_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_job");
    configure_fast_group(&mut group);

    group.bench_function("creation", |b| {
        b.iter(|| {
            let job = CaptureJob {
                url: "https://shop.example.com".to_string(),
                query: "iphone13".to_string(),
                ..Default::default()
            };
            black_box(job);
        });
    });

    group.finish();
}

fn benchmark_scroll_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll_plan");
    configure_fast_group(&mut group);

    group.bench_function("offsets", |b| {
        b.iter(|| {
            let plan = ScrollPlan::new(500, 766, 100_000);
            black_box(plan.offsets());
        });
    });

    group.finish();
}

fn benchmark_url_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("url_validation");
    configure_fast_group(&mut group);

    let test_urls = vec![
        "https://shop.example.com",
        "http://shop.example.com/search",
        "invalid-url",
    ];

    group.bench_function("validate", |b| {
        b.iter(|| {
            for url in &test_urls {
                let result = scrollshot::validate_url(url);
                let _ = black_box(result);
            }
        });
    });

    group.finish();
}

fn benchmark_filename_sanitization(c: &mut Criterion) {
    let mut group = c.benchmark_group("filename_sanitization");
    configure_fast_group(&mut group);

    let test_queries = vec!["iphone13", "gaming laptop 17\"", "usb-c: cable / 2m"];

    group.bench_function("sanitize", |b| {
        b.iter(|| {
            for query in &test_queries {
                let result = scrollshot::sanitize_filename(query);
                let _ = black_box(result);
            }
        });
    });

    group.finish();
}

// === INTEGRATION BENCHMARKS (require Chrome) ===

#[cfg(feature = "integration_benchmarks")]
fn benchmark_session_launch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("session");
    group.sample_size(10);

    group.bench_function("launch_and_close", |b| {
        b.iter(|| {
            rt.block_on(async {
                let session = Session::launch(&Config::default()).await.unwrap();
                session.close().await;
            });
        });
    });

    group.finish();
}

#[cfg(not(feature = "integration_benchmarks"))]
criterion_group!(
    benches,
    benchmark_config_creation,
    benchmark_capture_job_creation,
    benchmark_scroll_plan,
    benchmark_url_validation,
    benchmark_filename_sanitization
);

#[cfg(feature = "integration_benchmarks")]
criterion_group!(
    benches,
    benchmark_config_creation,
    benchmark_capture_job_creation,
    benchmark_scroll_plan,
    benchmark_url_validation,
    benchmark_filename_sanitization,
    benchmark_session_launch
);

criterion_main!(benches);
