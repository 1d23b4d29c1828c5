//! Weighted risk aggregation with banded interpretation levels.
//!
//! `risk_score = clamp(Σ weight_k × count_k / total_events, 0, 1)` — one
//! documented, deterministic aggregation; counts are taken after the
//! min-confidence cut.

use super::SignalFindings;
use crate::config::{RiskBands, SignalWeights};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: f64, bands: &RiskBands) -> Self {
        if score >= bands.high_threshold {
            RiskLevel::High
        } else if score >= bands.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub(crate) fn aggregate(
    signals: &SignalFindings,
    total_events: usize,
    weights: &SignalWeights,
) -> f64 {
    if total_events == 0 {
        return 0.0;
    }
    let total = total_events as f64;
    let score = weights.rapid_viewing * (signals.rapid_viewing.len() as f64 / total)
        + weights.binge_session * (signals.binge_patterns.len() as f64 / total)
        + weights.anomalous_session * (signals.anomalous_sessions.len() as f64 / total)
        + weights.language_switch * (signals.language_switches.len() as f64 / total)
        + weights.topic_shift * (signals.topic_shifts.len() as f64 / total);
    score.clamp(0.0, 1.0)
}
