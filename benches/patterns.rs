//! Pattern detection benchmark: five detectors + risk aggregation.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use watchlens::config::AnalyzerConfig;
use watchlens::{PatternDetector, WatchEvent};

fn make_dummy_history(n: usize) -> Vec<WatchEvent> {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    (0..n)
        .map(|i| WatchEvent {
            title: format!("video number {i} in the queue"),
            url: format!("https://watch.example/v/{i}"),
            timestamp: base + Duration::seconds(i as i64 * 45),
            channel: format!("channel-{}", i % 5),
            category: if i % 3 == 0 { "music" } else { "gaming" }.to_string(),
            duration_seconds: Some(300.0),
            language: None,
        })
        .collect()
}

fn bench_patterns(c: &mut Criterion) {
    let config = AnalyzerConfig::default();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let events = make_dummy_history(500);

    c.bench_function("detect_patterns_500_events", |b| {
        b.iter(|| black_box(detector.detect(black_box(&events)).unwrap()))
    });
}

criterion_group!(benches, bench_patterns);
criterion_main!(benches);
