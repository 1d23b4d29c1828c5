//! Session splitting plus the two session-level detectors: binge runs and
//! sessions anomalous against the user's own session-feature distribution.

use super::{Finding, SignalKind};
use crate::config::PatternConfig;
use crate::history::WatchEvent;
use chrono::Timelike;
use std::collections::HashSet;
use std::ops::Range;

/// Maximal runs of consecutive events whose adjacent gaps stay below the
/// session gap threshold.
pub(crate) fn split_sessions(sorted: &[WatchEvent], gap_secs: i64) -> Vec<Range<usize>> {
    if sorted.is_empty() {
        return Vec::new();
    }
    let mut sessions = Vec::new();
    let mut start = 0;
    for i in 1..sorted.len() {
        let gap = (sorted[i].timestamp - sorted[i - 1].timestamp).num_seconds();
        if gap >= gap_secs {
            sessions.push(start..i);
            start = i;
        }
    }
    sessions.push(start..sorted.len());
    sessions
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}

fn intra_session_gaps(sorted: &[WatchEvent], session: &Range<usize>) -> Vec<f64> {
    (session.start + 1..session.end)
        .map(|i| (sorted[i].timestamp - sorted[i - 1].timestamp).num_seconds() as f64)
        .collect()
}

pub(crate) fn detect_binges(sorted: &[WatchEvent], config: &PatternConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    for session in split_sessions(sorted, config.session_gap_secs) {
        if session.len() < config.min_session_length {
            continue;
        }
        let gaps = intra_session_gaps(sorted, &session);
        let (mean, std) = mean_std(&gaps);
        let regularity = if mean > 0.0 {
            1.0 - (std / mean).min(1.0)
        } else {
            1.0
        };
        let intensity = 1.0 - (mean / 3600.0).min(1.0);
        let span = (sorted[session.end - 1].timestamp - sorted[session.start].timestamp)
            .num_seconds();
        findings.push(Finding {
            kind: SignalKind::BingeSession,
            occurrences: session.clone().collect(),
            confidence: (regularity + intensity) / 2.0,
            evidence: format!("videos={} span={span}s", session.len()),
        });
    }
    findings
}

/// Per-session features: length, category diversity, mean hour-of-day.
fn session_features(sorted: &[WatchEvent], session: &Range<usize>) -> [f64; 3] {
    let categories: HashSet<&str> = session
        .clone()
        .map(|i| sorted[i].category.as_str())
        .collect();
    let hour_sum: f64 = session
        .clone()
        .map(|i| sorted[i].timestamp.hour() as f64)
        .sum();
    [
        session.len() as f64,
        categories.len() as f64,
        hour_sum / session.len() as f64,
    ]
}

/// Flags sessions whose feature vector deviates more than `k` standard
/// deviations from the user's own session distribution. Features with zero
/// variance carry no signal and are skipped.
pub(crate) fn detect_anomalous(sorted: &[WatchEvent], config: &PatternConfig) -> Vec<Finding> {
    let sessions = split_sessions(sorted, config.session_gap_secs);
    if sessions.len() < 2 {
        return Vec::new();
    }

    let features: Vec<[f64; 3]> = sessions
        .iter()
        .map(|session| session_features(sorted, session))
        .collect();
    let stats: Vec<(f64, f64)> = (0..3)
        .map(|f| {
            let column: Vec<f64> = features.iter().map(|row| row[f]).collect();
            mean_std(&column)
        })
        .collect();

    let k = config.anomaly_std_devs;
    let mut findings = Vec::new();
    for (session, row) in sessions.iter().zip(&features) {
        let max_z = row
            .iter()
            .zip(&stats)
            .filter(|(_, stat)| stat.1 > 0.0)
            .map(|(value, stat)| (value - stat.0).abs() / stat.1)
            .fold(0.0f64, f64::max);
        if max_z > k {
            findings.push(Finding {
                kind: SignalKind::AnomalousSession,
                occurrences: session.clone().collect(),
                confidence: (max_z / (2.0 * k)).min(1.0),
                evidence: format!("videos={} max_z={max_z:.2}", session.len()),
            });
        }
    }
    findings
}
