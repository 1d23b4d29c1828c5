//! Analysis orchestrator: validates once, prepares the history once, then
//! runs the three independent paths concurrently. Each path is a pure
//! function of the same immutable sorted sequence, so there is nothing to
//! coordinate beyond waiting for all results.

use crate::cluster::{ClusterEngine, ClusteringReport};
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::history::{self, EntryWarning, RawWatchEvent, WatchEvent};
use crate::patterns::{PatternDetector, PatternReport};
use crate::suppression::{SuppressionCalculator, SuppressionReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub clustering: ClusteringReport,
    pub patterns: PatternReport,
    pub suppression: SuppressionReport,
    /// Entries dropped during validation
    pub warnings: Vec<EntryWarning>,
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    clusters: ClusterEngine,
    patterns: PatternDetector,
    suppression: SuppressionCalculator,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            clusters: ClusterEngine::new(config.clustering.clone())?,
            patterns: PatternDetector::new(config.patterns.clone(), config.clustering)?,
            suppression: SuppressionCalculator::new(config.suppression)?,
        })
    }

    pub fn cluster_history(
        &self,
        events: &[WatchEvent],
    ) -> Result<ClusteringReport, AnalysisError> {
        self.clusters.cluster(events)
    }

    pub fn detect_patterns(&self, events: &[WatchEvent]) -> Result<PatternReport, AnalysisError> {
        self.patterns.detect(events)
    }

    pub fn suppression_index(
        &self,
        events: &[WatchEvent],
    ) -> Result<SuppressionReport, AnalysisError> {
        self.suppression.calculate(events)
    }

    /// Validate the raw history once, then run clustering, pattern detection,
    /// and suppression analysis as concurrent blocking tasks.
    pub async fn analyze_all(
        &self,
        raw: &[RawWatchEvent],
    ) -> Result<AnalysisReport, AnalysisError> {
        let (events, warnings) = history::prepare(raw)?;
        info!(
            events = events.len(),
            dropped = warnings.len(),
            "history prepared"
        );
        let events = Arc::new(events);

        let clusters = self.clusters.clone();
        let cluster_events = Arc::clone(&events);
        let cluster_task =
            tokio::task::spawn_blocking(move || clusters.cluster(&cluster_events));

        let patterns = self.patterns.clone();
        let pattern_events = Arc::clone(&events);
        let pattern_task =
            tokio::task::spawn_blocking(move || patterns.detect(&pattern_events));

        let suppression = self.suppression.clone();
        let suppression_events = Arc::clone(&events);
        let suppression_task =
            tokio::task::spawn_blocking(move || suppression.calculate(&suppression_events));

        let clustering = cluster_task.await.expect("clustering task")?;
        let patterns = pattern_task.await.expect("pattern task")?;
        let suppression = suppression_task.await.expect("suppression task")?;

        let report = AnalysisReport {
            id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            clustering,
            patterns,
            suppression,
            warnings,
        };
        info!(
            report_id = %report.id,
            risk_score = report.patterns.risk_score,
            clusters = report.clustering.clusters.len(),
            overall_suppression = report.suppression.overall_suppression,
            "analysis complete"
        );
        Ok(report)
    }
}
