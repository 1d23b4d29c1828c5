//! Suppression index: baseline period against analysis period.
//!
//! The split policy is explicit and named ([`split_at_midpoint`],
//! [`split_by_baseline_window`]) because it changes every downstream ratio.
//! Degenerate cases are policy, not detection: a zero-velocity baseline
//! reports overall suppression 0.0, and categories absent from the baseline
//! are omitted from `category_suppression` — there is no prior presence to
//! suppress against.

use crate::config::{SplitPolicy, SuppressionConfig};
use crate::error::AnalysisError;
use crate::history::{self, WatchEvent};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

const BUCKET_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub total_views: usize,
    /// Distinct `channel` values in the period
    pub unique_channels: usize,
    /// Category → fraction of period views; sums to 1 over non-empty input
    pub category_distribution: BTreeMap<String, f64>,
    /// Views per day over the configured period length
    pub view_velocity: f64,
}

impl PeriodMetrics {
    fn empty() -> Self {
        Self {
            total_views: 0,
            unique_channels: 0,
            category_distribution: BTreeMap::new(),
            view_velocity: 0.0,
        }
    }
}

/// One 7-day bucket of the suppression trend, anchored at the first event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalBucket {
    pub start: DateTime<Utc>,
    pub views: usize,
    /// 1 − views / mean weekly baseline views; 0.0 on a zero baseline mean
    pub suppression: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionReport {
    pub overall_suppression: f64,
    /// Keyed by exactly the baseline distribution's categories
    pub category_suppression: BTreeMap<String, f64>,
    pub temporal_patterns: Vec<TemporalBucket>,
    pub baseline_metrics: PeriodMetrics,
    pub analysis_metrics: PeriodMetrics,
}

impl SuppressionReport {
    fn empty() -> Self {
        Self {
            overall_suppression: 0.0,
            category_suppression: BTreeMap::new(),
            temporal_patterns: Vec::new(),
            baseline_metrics: PeriodMetrics::empty(),
            analysis_metrics: PeriodMetrics::empty(),
        }
    }
}

/// Baseline is the first `floor(n/2)` events of the sorted sequence.
pub fn split_at_midpoint(sorted: &[WatchEvent]) -> (&[WatchEvent], &[WatchEvent]) {
    sorted.split_at(sorted.len() / 2)
}

/// Baseline is every event within `baseline_period_days` of the first event.
pub fn split_by_baseline_window(
    sorted: &[WatchEvent],
    baseline_period_days: u32,
) -> (&[WatchEvent], &[WatchEvent]) {
    let Some(first) = sorted.first() else {
        return (sorted, sorted);
    };
    let cutoff = first.timestamp + Duration::days(baseline_period_days as i64);
    let split = sorted.partition_point(|event| event.timestamp < cutoff);
    sorted.split_at(split)
}

fn period_metrics(events: &[WatchEvent], period_days: u32) -> PeriodMetrics {
    if events.is_empty() {
        return PeriodMetrics::empty();
    }
    let channels: HashSet<&str> = events.iter().map(|e| e.channel.as_str()).collect();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.category.clone()).or_default() += 1;
    }
    let total = events.len() as f64;
    let category_distribution = counts
        .into_iter()
        .map(|(category, count)| (category, count as f64 / total))
        .collect();
    PeriodMetrics {
        total_views: events.len(),
        unique_channels: channels.len(),
        category_distribution,
        view_velocity: events.len() as f64 / period_days as f64,
    }
}

/// Weekly view counts scored against the mean of buckets that fall entirely
/// inside the baseline period.
fn weekly_trend(sorted: &[WatchEvent], baseline_len: usize) -> Vec<TemporalBucket> {
    let Some(first) = sorted.first() else {
        return Vec::new();
    };
    let anchor = first.timestamp;
    let bucket_of = |ts: DateTime<Utc>| ((ts - anchor).num_seconds() / (BUCKET_DAYS * 86_400)) as usize;

    let bucket_count = bucket_of(sorted[sorted.len() - 1].timestamp) + 1;
    let mut views = vec![0usize; bucket_count];
    for event in sorted {
        views[bucket_of(event.timestamp)] += 1;
    }

    // A bucket belongs to the baseline when it closes before the analysis
    // period begins; with an empty analysis period every bucket qualifies.
    let boundary = sorted
        .get(baseline_len)
        .map(|event| event.timestamp)
        .unwrap_or_else(|| sorted[sorted.len() - 1].timestamp + Duration::seconds(1));
    let baseline_views: Vec<usize> = (0..bucket_count)
        .filter(|&i| anchor + Duration::days(BUCKET_DAYS * (i as i64 + 1)) <= boundary)
        .map(|i| views[i])
        .collect();
    let baseline_mean = if baseline_views.is_empty() {
        0.0
    } else {
        baseline_views.iter().sum::<usize>() as f64 / baseline_views.len() as f64
    };

    views
        .into_iter()
        .enumerate()
        .map(|(i, count)| TemporalBucket {
            start: anchor + Duration::days(BUCKET_DAYS * i as i64),
            views: count,
            suppression: if baseline_mean > 0.0 {
                1.0 - count as f64 / baseline_mean
            } else {
                0.0
            },
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SuppressionCalculator {
    config: SuppressionConfig,
}

impl SuppressionCalculator {
    pub fn new(config: SuppressionConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SuppressionConfig {
        &self.config
    }

    /// Compare the baseline period against the analysis period. An empty
    /// history yields a well-formed zero report.
    pub fn calculate(&self, events: &[WatchEvent]) -> Result<SuppressionReport, AnalysisError> {
        let sorted = history::chronological(events);
        if sorted.is_empty() {
            return Ok(SuppressionReport::empty());
        }

        let (baseline, analysis) = match self.config.split_policy {
            SplitPolicy::Midpoint => split_at_midpoint(&sorted),
            SplitPolicy::BaselineWindow => {
                split_by_baseline_window(&sorted, self.config.baseline_period_days)
            }
        };
        let baseline_metrics = period_metrics(baseline, self.config.baseline_period_days);
        let analysis_metrics = period_metrics(analysis, self.config.baseline_period_days);

        let overall_suppression = if baseline_metrics.view_velocity > 0.0 {
            1.0 - analysis_metrics.view_velocity / baseline_metrics.view_velocity
        } else {
            0.0
        };

        let category_suppression: BTreeMap<String, f64> = baseline_metrics
            .category_distribution
            .iter()
            .map(|(category, &baseline_fraction)| {
                let analysis_fraction = analysis_metrics
                    .category_distribution
                    .get(category)
                    .copied()
                    .unwrap_or(0.0);
                (
                    category.clone(),
                    1.0 - analysis_fraction / baseline_fraction,
                )
            })
            .collect();

        let temporal_patterns = weekly_trend(&sorted, baseline.len());

        info!(
            overall = overall_suppression,
            baseline_views = baseline_metrics.total_views,
            analysis_views = analysis_metrics.total_views,
            "suppression index computed"
        );
        Ok(SuppressionReport {
            overall_suppression,
            category_suppression,
            temporal_patterns,
            baseline_metrics,
            analysis_metrics,
        })
    }
}
