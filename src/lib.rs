//! Watchlens — watch-history analysis core.
//!
//! Modular structure:
//! - [`history`] — Watch-event validation and chronological ordering
//! - [`features`] — TF-IDF title vectorization
//! - [`cluster`] — Density-based content clustering
//! - [`patterns`] — Manipulation-signal detectors and risk scoring
//! - [`suppression`] — Baseline/analysis suppression metrics
//! - [`entropy`] — Content and channel diversity entropy
//! - [`logging`] — Structured JSON logging

pub mod analyzer;
pub mod cluster;
pub mod config;
pub mod entropy;
pub mod error;
pub mod features;
pub mod history;
pub mod logging;
pub mod patterns;
pub mod suppression;

pub use analyzer::{AnalysisReport, Analyzer};
pub use cluster::{Cluster, ClusterEngine, ClusteringReport};
pub use config::AnalyzerConfig;
pub use entropy::EntropyAnalysis;
pub use error::AnalysisError;
pub use features::TitleMatrix;
pub use history::{EntryWarning, RawWatchEvent, WatchEvent};
pub use logging::StructuredLogger;
pub use patterns::{Finding, PatternDetector, PatternReport, RiskLevel, SignalKind};
pub use suppression::{PeriodMetrics, SuppressionCalculator, SuppressionReport};
