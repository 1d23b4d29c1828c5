//! Analyzer configuration. Each analysis path owns its own parameter block.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Density clustering parameters
    pub clustering: ClusteringConfig,
    /// Manipulation-signal detector parameters
    pub patterns: PatternConfig,
    /// Suppression index parameters
    pub suppression: SuppressionConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Cosine-distance neighborhood radius (> 0)
    pub eps: f64,
    /// Minimum neighbors (including self) for a core point (>= 1)
    pub min_samples: usize,
    /// Number of terms reported as a cluster's dominant theme
    pub theme_terms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Adjacent views closer than this are rapid views (seconds)
    pub rapid_threshold_secs: i64,
    /// Gap at or above this closes a viewing session (seconds)
    pub session_gap_secs: i64,
    /// Sessions at or above this length are binge candidates
    pub min_session_length: usize,
    /// Session-feature z-score beyond this flags an anomalous session
    pub anomaly_std_devs: f64,
    /// Inter-cluster cosine distance beyond this flags a topic shift (0-1)
    pub topic_shift_threshold: f64,
    /// Title similarity cut used when comparing content (0-1)
    pub similarity_threshold: f64,
    /// Findings below this confidence are discarded before aggregation (0-1)
    pub min_confidence: f64,
    /// Per-signal aggregation weights (must sum to 1)
    pub weights: SignalWeights,
    /// Risk band thresholds
    pub risk: RiskBands,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalWeights {
    pub rapid_viewing: f64,
    pub binge_session: f64,
    pub anomalous_session: f64,
    pub language_switch: f64,
    pub topic_shift: f64,
}

impl SignalWeights {
    pub fn sum(&self) -> f64 {
        self.rapid_viewing
            + self.binge_session
            + self.anomalous_session
            + self.language_switch
            + self.topic_shift
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskBands {
    /// Score at or above this is high risk (0.0-1.0)
    pub high_threshold: f64,
    /// Score at or above this is medium risk
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Baseline is the first `floor(n/2)` events of the sorted sequence.
    Midpoint,
    /// Baseline is every event within `baseline_period_days` of the first.
    BaselineWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressionConfig {
    /// Period length used as the velocity denominator (days, > 0)
    pub baseline_period_days: u32,
    /// Suppression above this is significant to the caller (0-1);
    /// the calculator itself does not apply it
    pub threshold: f64,
    /// How the sorted sequence is split into baseline/analysis periods
    pub split_policy: SplitPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            clustering: ClusteringConfig::default(),
            patterns: PatternConfig::default(),
            suppression: SuppressionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps: 0.3,
            min_samples: 5,
            theme_terms: 3,
        }
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            rapid_threshold_secs: 300,
            session_gap_secs: 1800,
            min_session_length: 10,
            anomaly_std_devs: 2.0,
            topic_shift_threshold: 0.5,
            similarity_threshold: 0.7,
            min_confidence: 0.0,
            weights: SignalWeights::default(),
            risk: RiskBands::default(),
        }
    }
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            rapid_viewing: 0.25,
            binge_session: 0.20,
            anomalous_session: 0.20,
            language_switch: 0.15,
            topic_shift: 0.20,
        }
    }
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            high_threshold: 0.5,
            medium_threshold: 0.2,
        }
    }
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            baseline_period_days: 30,
            threshold: 0.3,
            split_policy: SplitPolicy::Midpoint,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), AnalysisError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::parameter(
            name,
            format!("must be within [0, 1] (got {value})"),
        ));
    }
    Ok(())
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(AnalysisError::parameter(
                "eps",
                format!("must be a finite value > 0 (got {})", self.eps),
            ));
        }
        if self.min_samples < 1 {
            return Err(AnalysisError::parameter("min_samples", "must be >= 1"));
        }
        if self.theme_terms < 1 {
            return Err(AnalysisError::parameter("theme_terms", "must be >= 1"));
        }
        Ok(())
    }
}

impl PatternConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.rapid_threshold_secs <= 0 {
            return Err(AnalysisError::parameter(
                "rapid_threshold_secs",
                "must be > 0",
            ));
        }
        if self.session_gap_secs <= 0 {
            return Err(AnalysisError::parameter("session_gap_secs", "must be > 0"));
        }
        if self.min_session_length < 1 {
            return Err(AnalysisError::parameter("min_session_length", "must be >= 1"));
        }
        if !self.anomaly_std_devs.is_finite() || self.anomaly_std_devs <= 0.0 {
            return Err(AnalysisError::parameter(
                "anomaly_std_devs",
                format!("must be a finite value > 0 (got {})", self.anomaly_std_devs),
            ));
        }
        check_fraction("topic_shift_threshold", self.topic_shift_threshold)?;
        check_fraction("similarity_threshold", self.similarity_threshold)?;
        check_fraction("min_confidence", self.min_confidence)?;
        check_fraction("high_threshold", self.risk.high_threshold)?;
        check_fraction("medium_threshold", self.risk.medium_threshold)?;
        if self.risk.medium_threshold > self.risk.high_threshold {
            return Err(AnalysisError::parameter(
                "medium_threshold",
                "must not exceed high_threshold",
            ));
        }
        let w = &self.weights;
        for (name, value) in [
            ("weights.rapid_viewing", w.rapid_viewing),
            ("weights.binge_session", w.binge_session),
            ("weights.anomalous_session", w.anomalous_session),
            ("weights.language_switch", w.language_switch),
            ("weights.topic_shift", w.topic_shift),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::parameter(
                    name,
                    format!("must be a finite value >= 0 (got {value})"),
                ));
            }
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            return Err(AnalysisError::parameter(
                "weights",
                format!("must sum to 1.0 (got {})", w.sum()),
            ));
        }
        Ok(())
    }
}

impl SuppressionConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.baseline_period_days == 0 {
            return Err(AnalysisError::parameter(
                "baseline_period_days",
                "must be > 0",
            ));
        }
        check_fraction("threshold", self.threshold)
    }
}

impl AnalyzerConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<AnalyzerConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }

    /// Validate every parameter block before any processing
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.clustering.validate()?;
        self.patterns.validate()?;
        self.suppression.validate()
    }
}
