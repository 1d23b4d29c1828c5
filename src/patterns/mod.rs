//! Manipulation-signal detectors and risk aggregation.
//!
//! Five independent detectors share one contract: the time-sorted sequence in,
//! a list of findings out. The aggregator folds finding counts into a single
//! weighted risk score; entropy context is reported alongside, unweighted.

mod language;
mod rapid;
mod risk;
mod session;
mod topic;

use crate::cluster::engine;
use crate::config::{ClusteringConfig, PatternConfig};
use crate::entropy::EntropyAnalysis;
use crate::error::AnalysisError;
use crate::features::TitleMatrix;
use crate::history::{self, WatchEvent};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use risk::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    RapidViewing,
    BingeSession,
    AnomalousSession,
    LanguageSwitch,
    TopicShift,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::RapidViewing,
        SignalKind::BingeSession,
        SignalKind::AnomalousSession,
        SignalKind::LanguageSwitch,
        SignalKind::TopicShift,
    ];
}

/// One detected occurrence of a signal: an adjacent pair or a session run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: SignalKind,
    /// Indices into the time-sorted sequence
    pub occurrences: Vec<usize>,
    pub confidence: f64,
    pub evidence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalFindings {
    pub rapid_viewing: Vec<Finding>,
    pub binge_patterns: Vec<Finding>,
    pub anomalous_sessions: Vec<Finding>,
    pub language_switches: Vec<Finding>,
    pub topic_shifts: Vec<Finding>,
}

impl SignalFindings {
    pub fn total(&self) -> usize {
        self.rapid_viewing.len()
            + self.binge_patterns.len()
            + self.anomalous_sessions.len()
            + self.language_switches.len()
            + self.topic_shifts.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternReport {
    /// Weighted aggregate in [0, 1]
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub signals: SignalFindings,
    pub entropy: EntropyAnalysis,
    pub total_events: usize,
}

#[derive(Debug, Clone)]
pub struct PatternDetector {
    config: PatternConfig,
    clustering: ClusteringConfig,
}

impl PatternDetector {
    /// Clustering parameters are carried so the topic-shift detector can
    /// derive the same assignments the clustering path would produce.
    pub fn new(
        config: PatternConfig,
        clustering: ClusteringConfig,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        clustering.validate()?;
        Ok(Self { config, clustering })
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Run every detector over the time-sorted sequence and aggregate the
    /// risk score. Fewer than two events yields empty findings and risk 0.0.
    pub fn detect(&self, events: &[WatchEvent]) -> Result<PatternReport, AnalysisError> {
        let sorted = history::chronological(events);
        let entropy = EntropyAnalysis::from_events(&sorted);
        if sorted.len() < 2 {
            return Ok(PatternReport {
                risk_score: 0.0,
                risk_level: RiskLevel::from_score(0.0, &self.config.risk),
                signals: SignalFindings::default(),
                entropy,
                total_events: sorted.len(),
            });
        }

        let mut signals = SignalFindings {
            rapid_viewing: rapid::detect(&sorted, &self.config),
            binge_patterns: session::detect_binges(&sorted, &self.config),
            anomalous_sessions: session::detect_anomalous(&sorted, &self.config),
            language_switches: language::detect(&sorted, &self.config),
            topic_shifts: self.detect_topic_shifts(&sorted),
        };
        self.apply_min_confidence(&mut signals);

        let risk_score = risk::aggregate(&signals, sorted.len(), &self.config.weights);
        let risk_level = RiskLevel::from_score(risk_score, &self.config.risk);
        info!(
            risk_score,
            level = ?risk_level,
            findings = signals.total(),
            events = sorted.len(),
            "pattern detection complete"
        );
        Ok(PatternReport {
            risk_score,
            risk_level,
            signals,
            entropy,
            total_events: sorted.len(),
        })
    }

    /// Run a single detector independently of the others.
    pub fn detect_kind(&self, kind: SignalKind, events: &[WatchEvent]) -> Vec<Finding> {
        let sorted = history::chronological(events);
        if sorted.len() < 2 {
            return Vec::new();
        }
        match kind {
            SignalKind::RapidViewing => rapid::detect(&sorted, &self.config),
            SignalKind::BingeSession => session::detect_binges(&sorted, &self.config),
            SignalKind::AnomalousSession => session::detect_anomalous(&sorted, &self.config),
            SignalKind::LanguageSwitch => language::detect(&sorted, &self.config),
            SignalKind::TopicShift => self.detect_topic_shifts(&sorted),
        }
    }

    /// Topic shifts need title vectors and cluster assignments; a corpus with
    /// no informative tokens simply produces no topic findings.
    fn detect_topic_shifts(&self, sorted: &[WatchEvent]) -> Vec<Finding> {
        let titles: Vec<&str> = sorted.iter().map(|e| e.title.as_str()).collect();
        let matrix = match TitleMatrix::from_titles(&titles) {
            Ok(matrix) => matrix,
            Err(error) => {
                warn!(%error, "topic-shift detector skipped");
                return Vec::new();
            }
        };
        let assignments = engine::dbscan(&matrix, self.clustering.eps, self.clustering.min_samples);
        topic::detect(sorted, &matrix, &assignments, &self.config)
    }

    fn apply_min_confidence(&self, signals: &mut SignalFindings) {
        let cut = self.config.min_confidence;
        if cut <= 0.0 {
            return;
        }
        for list in [
            &mut signals.rapid_viewing,
            &mut signals.binge_patterns,
            &mut signals.anomalous_sessions,
            &mut signals.language_switches,
            &mut signals.topic_shifts,
        ] {
            list.retain(|finding| finding.confidence >= cut);
        }
    }
}
