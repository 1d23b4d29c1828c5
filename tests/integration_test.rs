//! Integration tests: config validation, ingestion tolerance, clustering,
//! pattern detection, risk aggregation, suppression metrics.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use watchlens::{
    config::{AnalyzerConfig, SplitPolicy},
    error::AnalysisError,
    history::{self, RawWatchEvent, WatchEvent},
    suppression::{split_at_midpoint, SuppressionCalculator},
    Analyzer, ClusterEngine, EntropyAnalysis, PatternDetector, RiskLevel, SignalKind,
};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn event(title: &str, offset_secs: i64) -> WatchEvent {
    event_in(title, offset_secs, "channel-a", "unknown")
}

fn event_in(title: &str, offset_secs: i64, channel: &str, category: &str) -> WatchEvent {
    WatchEvent {
        title: title.to_string(),
        url: format!("https://watch.example/v/{offset_secs}"),
        timestamp: base() + chrono::Duration::seconds(offset_secs),
        channel: channel.to_string(),
        category: category.to_string(),
        duration_seconds: None,
        language: None,
    }
}

fn raw(title: &str, timestamp: &str) -> RawWatchEvent {
    RawWatchEvent {
        title: title.to_string(),
        url: "https://watch.example/v/1".to_string(),
        timestamp: timestamp.to_string(),
        channel: String::new(),
        category: "unknown".to_string(),
        duration_seconds: None,
        language: None,
    }
}

#[test]
fn config_defaults_validate() {
    let config = AnalyzerConfig::load(std::path::Path::new("nonexistent.json"));
    assert!(config.validate().is_ok());
    assert_eq!(config.clustering.min_samples, 5);
    assert_eq!(config.suppression.baseline_period_days, 30);
}

#[test]
fn config_rejects_bad_parameters() {
    let mut config = AnalyzerConfig::default();
    config.clustering.eps = 0.0;
    assert!(matches!(
        config.validate(),
        Err(AnalysisError::InvalidParameter { name: "eps", .. })
    ));

    let mut config = AnalyzerConfig::default();
    config.clustering.min_samples = 0;
    assert!(matches!(
        config.validate(),
        Err(AnalysisError::InvalidParameter {
            name: "min_samples",
            ..
        })
    ));

    let mut config = AnalyzerConfig::default();
    config.patterns.weights.topic_shift = 0.5;
    assert!(matches!(
        config.validate(),
        Err(AnalysisError::InvalidParameter { name: "weights", .. })
    ));

    let mut config = AnalyzerConfig::default();
    config.suppression.baseline_period_days = 0;
    assert!(matches!(
        config.validate(),
        Err(AnalysisError::InvalidParameter {
            name: "baseline_period_days",
            ..
        })
    ));
}

#[test]
fn prepare_drops_invalid_entries_with_warnings() {
    let entries = vec![
        raw("Good entry", "2024-03-01T12:00:00Z"),
        raw("", "2024-03-01T12:01:00Z"),
        raw("Bad timestamp", "not-a-time"),
    ];
    let (events, warnings) = history::prepare(&entries).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].index, 1);
    assert_eq!(warnings[1].index, 2);
}

#[test]
fn prepare_fails_when_all_entries_invalid() {
    let entries = vec![raw("", "2024-03-01T12:00:00Z"), raw("x", "garbage")];
    assert!(matches!(
        history::prepare(&entries),
        Err(AnalysisError::InvalidEntry { .. })
    ));
}

#[test]
fn prepare_accepts_empty_history() {
    let (events, warnings) = history::prepare(&[]).unwrap();
    assert!(events.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn empty_input_yields_zero_results_everywhere() {
    let config = AnalyzerConfig::default();
    let clusters = ClusterEngine::new(config.clustering.clone()).unwrap();
    let report = clusters.cluster(&[]).unwrap();
    assert!(report.clusters.is_empty());
    assert_eq!(report.noise_count, 0);

    let detector =
        PatternDetector::new(config.patterns.clone(), config.clustering.clone()).unwrap();
    let report = detector.detect(&[]).unwrap();
    assert_eq!(report.risk_score, 0.0);
    assert_eq!(report.signals.total(), 0);

    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    let report = calculator.calculate(&[]).unwrap();
    assert_eq!(report.overall_suppression, 0.0);
    assert!(report.category_suppression.is_empty());
    assert!(report.temporal_patterns.is_empty());
    assert_eq!(report.baseline_metrics.total_views, 0);
}

#[test]
fn singleton_history_has_zero_risk() {
    let config = AnalyzerConfig::default();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&[event("Only video", 0)]).unwrap();
    assert_eq!(report.risk_score, 0.0);
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert_eq!(report.signals.total(), 0);
}

#[test]
fn rapid_viewing_flags_every_adjacent_pair_below_threshold() {
    let config = {
        let mut c = AnalyzerConfig::default();
        c.patterns.rapid_threshold_secs = 2;
        c
    };
    let events: Vec<WatchEvent> = (0..10).map(|i| event("lofi hip hop radio", i)).collect();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.rapid_viewing.len(), 9);
    assert!(report.risk_score > 0.0 && report.risk_score <= 1.0);
}

#[test]
fn rapid_viewing_empty_when_every_gap_exceeds_threshold() {
    let config = AnalyzerConfig::default();
    let events: Vec<WatchEvent> = (0..10)
        .map(|i| event("lofi hip hop radio", i * 3600))
        .collect();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert!(report.signals.rapid_viewing.is_empty());
}

fn near_duplicate_corpus() -> Vec<WatchEvent> {
    let titles = [
        "How to cook pasta carbonara",
        "how to cook Pasta Carbonara!",
        "How To Cook: pasta carbonara",
        "Cook pasta carbonara",
        "cook pasta carbonara...",
        "Cook that pasta carbonara",
        "Quantum entanglement explained",
        "Premier league highlights goals",
        "Minecraft speedrun world record",
        "Stock market crash analysis",
    ];
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| event(title, i as i64 * 600))
        .collect()
}

#[test]
fn clustering_groups_near_duplicates_and_leaves_noise() {
    let mut config = AnalyzerConfig::default();
    config.clustering.eps = 0.3;
    config.clustering.min_samples = 2;
    let engine = ClusterEngine::new(config.clustering).unwrap();
    let report = engine.cluster(&near_duplicate_corpus()).unwrap();

    assert_eq!(report.clusters.len(), 1);
    assert_eq!(report.noise_count, 4);
    let members: HashSet<usize> = report.clusters[0].member_indices.iter().copied().collect();
    assert_eq!(members, (0..6).collect::<HashSet<usize>>());
    assert!(report.clusters[0]
        .dominant_theme
        .iter()
        .any(|t| t == "pasta" || t == "carbonara" || t == "cook"));
}

#[test]
fn clustering_is_deterministic() {
    let mut config = AnalyzerConfig::default();
    config.clustering.eps = 0.3;
    config.clustering.min_samples = 2;
    let engine = ClusterEngine::new(config.clustering).unwrap();
    let events = near_duplicate_corpus();
    let first = engine.cluster(&events).unwrap();
    let second = engine.cluster(&events).unwrap();
    assert_eq!(first.assignments, second.assignments);
}

#[test]
fn clustering_partitions_every_event_exactly_once() {
    let mut config = AnalyzerConfig::default();
    config.clustering.eps = 0.3;
    config.clustering.min_samples = 2;
    let engine = ClusterEngine::new(config.clustering).unwrap();
    let events = near_duplicate_corpus();
    let report = engine.cluster(&events).unwrap();

    assert_eq!(report.assignments.len(), events.len());
    let clustered: usize = report.clusters.iter().map(|c| c.size).sum();
    assert_eq!(clustered + report.noise_count, events.len());
    let mut seen = HashSet::new();
    for cluster in &report.clusters {
        for &index in &cluster.member_indices {
            assert!(seen.insert(index), "index {index} in two clusters");
        }
    }
}

#[test]
fn zero_vector_title_becomes_noise() {
    let mut config = AnalyzerConfig::default();
    config.clustering.eps = 0.3;
    config.clustering.min_samples = 2;
    let engine = ClusterEngine::new(config.clustering).unwrap();
    let mut events: Vec<WatchEvent> = (0..5)
        .map(|i| event("cook pasta carbonara", i * 60))
        .collect();
    events.push(event("??", 5 * 60));
    let report = engine.cluster(&events).unwrap();
    assert_eq!(report.clusters.len(), 1);
    assert_eq!(report.clusters[0].size, 5);
    assert_eq!(report.assignments[5], watchlens::cluster::NOISE);
}

#[test]
fn clustering_rejects_token_free_corpus() {
    let engine = ClusterEngine::new(AnalyzerConfig::default().clustering).unwrap();
    let events = vec![event("!!!", 0), event("??", 60)];
    assert!(matches!(
        engine.cluster(&events),
        Err(AnalysisError::InvalidEntry { .. })
    ));
}

#[test]
fn binge_session_reports_member_count_and_span() {
    let config = AnalyzerConfig::default();
    let events: Vec<WatchEvent> = (0..12).map(|i| event("lofi hip hop radio", i * 10)).collect();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.binge_patterns.len(), 1);
    let binge = &report.signals.binge_patterns[0];
    assert_eq!(binge.occurrences.len(), 12);
    assert!(binge.evidence.contains("span=110s"));
    assert!(binge.confidence > 0.9);
}

#[test]
fn short_sessions_are_not_binges() {
    let config = AnalyzerConfig::default();
    // Three sessions of three videos each, separated by two-hour gaps.
    let mut events = Vec::new();
    for session in 0..3i64 {
        for i in 0..3i64 {
            events.push(event("lofi hip hop radio", session * 7200 + i * 10));
        }
    }
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert!(report.signals.binge_patterns.is_empty());
}

#[test]
fn anomalous_session_flags_outlier_against_own_baseline() {
    let config = AnalyzerConfig::default();
    let mut events = Vec::new();
    // Five ordinary sessions of three videos, one 30-video outlier session,
    // each on its own day at 10:00 so only session length varies.
    for day in 0..5u32 {
        let start = Utc.with_ymd_and_hms(2024, 3, 1 + day, 10, 0, 0).unwrap();
        for i in 0..3i64 {
            let mut e = event("lofi hip hop radio", 0);
            e.timestamp = start + chrono::Duration::seconds(i * 60);
            events.push(e);
        }
    }
    let start = Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
    for i in 0..30i64 {
        let mut e = event("lofi hip hop radio", 0);
        e.timestamp = start + chrono::Duration::seconds(i * 60);
        events.push(e);
    }
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.anomalous_sessions.len(), 1);
    assert_eq!(report.signals.anomalous_sessions[0].occurrences.len(), 30);
}

#[test]
fn language_switches_from_upstream_signal() {
    let config = AnalyzerConfig::default();
    let mut events: Vec<WatchEvent> = (0..4).map(|i| event("video title here", i * 60)).collect();
    events[0].language = Some("en".to_string());
    events[1].language = Some("en".to_string());
    events[2].language = Some("ru".to_string());
    events[3].language = Some("en".to_string());
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.language_switches.len(), 2);
    assert!(report.signals.language_switches[0].evidence.contains("en->ru"));
}

#[test]
fn language_switches_inferred_from_script() {
    let config = AnalyzerConfig::default();
    let events = vec![
        event("morning news roundup", 0),
        event("Вечерние новости сегодня", 60),
        event("evening recap show", 120),
    ];
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.language_switches.len(), 2);
}

#[test]
fn topic_shift_at_cluster_boundary_only() {
    let mut config = AnalyzerConfig::default();
    config.patterns.rapid_threshold_secs = 1;
    let mut events = Vec::new();
    for i in 0..5i64 {
        events.push(event_in("cook pasta carbonara", i * 3600, "kitchen", "food"));
    }
    for i in 5..10i64 {
        events.push(event_in(
            "quantum physics lecture",
            i * 3600,
            "university",
            "science",
        ));
    }
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert_eq!(report.signals.topic_shifts.len(), 1);
    let shift = &report.signals.topic_shifts[0];
    assert_eq!(shift.occurrences, vec![4, 5]);
    assert!(shift.confidence > 0.9);
}

#[test]
fn each_detector_runs_independently() {
    let config = AnalyzerConfig::default();
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let events: Vec<WatchEvent> = (0..12).map(|i| event("lofi hip hop radio", i * 10)).collect();
    for kind in SignalKind::ALL {
        let findings = detector.detect_kind(kind, &events);
        assert!(findings.iter().all(|f| f.kind == kind));
    }
    assert!(detector
        .detect_kind(SignalKind::RapidViewing, &events[..1])
        .is_empty());
}

#[test]
fn risk_score_stays_within_bounds_under_heavy_findings() {
    let config = AnalyzerConfig::default();
    let mut events: Vec<WatchEvent> = (0..20).map(|i| event("repeat video loop", i)).collect();
    for (i, e) in events.iter_mut().enumerate() {
        e.language = Some(if i % 2 == 0 { "en" } else { "ru" }.to_string());
    }
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert!((0.0..=1.0).contains(&report.risk_score));
    assert!(report.risk_score > 0.0);
}

#[test]
fn min_confidence_filters_weak_findings() {
    let mut config = AnalyzerConfig::default();
    config.patterns.rapid_threshold_secs = 100;
    config.patterns.min_confidence = 0.5;
    // Gap of 90s against a 100s threshold: confidence 0.1, filtered out.
    let events = vec![event("lofi hip hop radio", 0), event("lofi hip hop radio", 90)];
    let detector = PatternDetector::new(config.patterns, config.clustering).unwrap();
    let report = detector.detect(&events).unwrap();
    assert!(report.signals.rapid_viewing.is_empty());
}

#[test]
fn midpoint_split_is_floor_halves() {
    let events: Vec<WatchEvent> = (0..5).map(|i| event("video", i * 60)).collect();
    let sorted = history::chronological(&events);
    let (baseline, analysis) = split_at_midpoint(&sorted);
    assert_eq!(baseline.len(), 2);
    assert_eq!(analysis.len(), 3);
}

#[test]
fn suppression_velocity_drop_is_measured() {
    let mut config = AnalyzerConfig::default();
    config.suppression.split_policy = SplitPolicy::BaselineWindow;
    config.suppression.baseline_period_days = 30;
    let mut events = Vec::new();
    // 100 news views inside the 30-day baseline window.
    for i in 0..100i64 {
        events.push(event_in("daily news briefing", i * 6 * 3600, "newsroom", "news"));
    }
    // 10 views in the 30 days after it.
    for i in 0..10i64 {
        events.push(event_in(
            "daily news briefing",
            31 * 86_400 + i * 12 * 3600,
            "newsroom",
            "news",
        ));
    }
    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    let report = calculator.calculate(&events).unwrap();
    assert!((report.baseline_metrics.view_velocity - 100.0 / 30.0).abs() < 1e-9);
    assert!((report.analysis_metrics.view_velocity - 10.0 / 30.0).abs() < 1e-9);
    assert!((report.overall_suppression - 0.90).abs() < 0.01);
}

#[test]
fn suppression_zero_baseline_velocity_reports_zero() {
    let config = AnalyzerConfig::default();
    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    // Midpoint split of a single event leaves an empty baseline.
    let report = calculator.calculate(&[event("only video", 0)]).unwrap();
    assert_eq!(report.baseline_metrics.view_velocity, 0.0);
    assert_eq!(report.overall_suppression, 0.0);
}

#[test]
fn category_suppression_keys_match_baseline_categories() {
    let config = AnalyzerConfig::default();
    let mut events = Vec::new();
    for i in 0..4i64 {
        events.push(event_in("daily news briefing", i * 60, "newsroom", "news"));
    }
    // Analysis half introduces a category absent from the baseline.
    events.push(event_in("daily news briefing", 4 * 60, "newsroom", "news"));
    events.push(event_in("daily news briefing", 5 * 60, "newsroom", "news"));
    events.push(event_in("speedrun finals", 6 * 60, "arcade", "gaming"));
    events.push(event_in("speedrun finals", 7 * 60, "arcade", "gaming"));
    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    let report = calculator.calculate(&events).unwrap();

    let baseline_keys: HashSet<&String> =
        report.baseline_metrics.category_distribution.keys().collect();
    let suppression_keys: HashSet<&String> = report.category_suppression.keys().collect();
    assert_eq!(baseline_keys, suppression_keys);
    assert!(!report.category_suppression.contains_key("gaming"));
    // news went from all views to half of them.
    assert!((report.category_suppression["news"] - 0.5).abs() < 1e-9);
}

#[test]
fn temporal_patterns_bucket_by_week() {
    let config = AnalyzerConfig::default();
    let events = vec![
        event("video", 0),
        event("video", 8 * 86_400),
        event("video", 15 * 86_400),
    ];
    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    let report = calculator.calculate(&events).unwrap();
    assert_eq!(report.temporal_patterns.len(), 3);
    let total: usize = report.temporal_patterns.iter().map(|b| b.views).sum();
    assert_eq!(total, 3);
}

#[test]
fn category_distribution_sums_to_one() {
    let config = AnalyzerConfig::default();
    let events = vec![
        event_in("a b c", 0, "x", "news"),
        event_in("d e f", 60, "y", "gaming"),
        event_in("g h i", 120, "z", "news"),
        event_in("j k l", 180, "x", "music"),
    ];
    let calculator = SuppressionCalculator::new(config.suppression).unwrap();
    let report = calculator.calculate(&events).unwrap();
    let sum: f64 = report.baseline_metrics.category_distribution.values().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(report.baseline_metrics.unique_channels, 2);
}

#[test]
fn uniform_channels_raise_entropy() {
    let varied: Vec<WatchEvent> = (0..4)
        .map(|i| event_in("video", i * 60, &format!("ch-{i}"), "unknown"))
        .collect();
    let single: Vec<WatchEvent> = (0..4)
        .map(|i| event_in("video", i * 60, "ch-0", "unknown"))
        .collect();
    let high = EntropyAnalysis::from_events(&varied);
    let low = EntropyAnalysis::from_events(&single);
    assert!((high.channel_entropy - 2.0).abs() < 1e-9);
    assert_eq!(low.channel_entropy, 0.0);
}

#[tokio::test]
async fn analyze_all_produces_full_report() {
    let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
    let mut entries: Vec<RawWatchEvent> = (0..12)
        .map(|i| raw("lofi hip hop radio", &format!("2024-03-01T12:{:02}:00Z", i)))
        .collect();
    entries.push(raw("", "2024-03-01T13:00:00Z"));
    let report = analyzer.analyze_all(&entries).await.unwrap();
    assert!(!report.id.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!((0.0..=1.0).contains(&report.patterns.risk_score));
    assert_eq!(report.suppression.baseline_metrics.total_views, 6);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("risk_score"));
}

#[test]
fn structured_log_line_is_one_json_object() {
    let line = watchlens::logging::LogEvent {
        ts: "2024-03-01T12:00:00Z".to_string(),
        level: "info",
        target: "watchlens",
        message: "analysis complete",
        report_id: Some("report-1"),
        risk_score: Some(0.42),
        risk_level: Some("medium"),
        clusters: Some(3),
        noise_count: Some(2),
        overall_suppression: None,
        error: None,
    };
    let mut out = Vec::new();
    watchlens::StructuredLogger::emit_json(&line, &mut out);
    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed["risk_score"], 0.42);
    assert!(parsed.get("overall_suppression").is_none());
}

#[test]
fn analyzer_new_rejects_invalid_config() {
    let mut config = AnalyzerConfig::default();
    config.patterns.weights.rapid_viewing = -0.1;
    assert!(Analyzer::new(config).is_err());
}
