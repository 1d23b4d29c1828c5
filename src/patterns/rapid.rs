//! Rapid-viewing detector: adjacent views closer than the threshold.

use super::{Finding, SignalKind};
use crate::config::PatternConfig;
use crate::history::WatchEvent;

pub(crate) fn detect(sorted: &[WatchEvent], config: &PatternConfig) -> Vec<Finding> {
    let threshold = config.rapid_threshold_secs;
    let mut findings = Vec::new();
    for i in 1..sorted.len() {
        let gap = (sorted[i].timestamp - sorted[i - 1].timestamp).num_seconds();
        if gap < threshold {
            let confidence = 1.0 - (gap as f64 / threshold as f64).min(1.0);
            findings.push(Finding {
                kind: SignalKind::RapidViewing,
                occurrences: vec![i - 1, i],
                confidence,
                evidence: format!("gap={gap}s threshold={threshold}s"),
            });
        }
    }
    findings
}
