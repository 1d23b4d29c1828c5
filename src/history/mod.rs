//! Watch-history event types and ingestion-boundary validation.
//! Upstream ingestion supplies raw records; this module parses timestamps,
//! drops malformed entries with warnings, and orders the rest.

use crate::error::AnalysisError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

fn default_category() -> String {
    "unknown".to_string()
}

/// Record as delivered by the ingestion collaborator, timestamp unparsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWatchEvent {
    pub title: String,
    pub url: String,
    pub timestamp: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Upstream language signal; inferred from the title when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Validated view record with a comparable absolute time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEvent {
    pub title: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub channel: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One dropped entry, reported alongside the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryWarning {
    pub index: usize,
    pub reason: String,
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn validate_entry(index: usize, raw: &RawWatchEvent) -> Result<WatchEvent, EntryWarning> {
    let reject = |reason: &str| EntryWarning {
        index,
        reason: reason.to_string(),
    };
    if raw.title.trim().is_empty() {
        return Err(reject("missing title"));
    }
    if raw.url.trim().is_empty() {
        return Err(reject("missing url"));
    }
    let timestamp = parse_timestamp(raw.timestamp.trim())
        .ok_or_else(|| reject(&format!("unparsable timestamp `{}`", raw.timestamp)))?;
    let category = if raw.category.trim().is_empty() {
        default_category()
    } else {
        raw.category.clone()
    };
    Ok(WatchEvent {
        title: raw.title.clone(),
        url: raw.url.clone(),
        timestamp,
        channel: raw.channel.clone(),
        category,
        duration_seconds: raw.duration_seconds,
        language: raw.language.clone(),
    })
}

/// Validate raw records, dropping malformed entries with a warning each.
/// Fails only when a non-empty input loses every entry; an empty input is a
/// legitimate empty history.
pub fn prepare(
    raw: &[RawWatchEvent],
) -> Result<(Vec<WatchEvent>, Vec<EntryWarning>), AnalysisError> {
    let mut events = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();
    for (index, entry) in raw.iter().enumerate() {
        match validate_entry(index, entry) {
            Ok(event) => events.push(event),
            Err(warning) => {
                warn!(index = warning.index, reason = %warning.reason, "dropped invalid entry");
                warnings.push(warning);
            }
        }
    }
    if events.is_empty() && !raw.is_empty() {
        return Err(AnalysisError::entries(format!(
            "all {} entries were invalid",
            raw.len()
        )));
    }
    Ok((events, warnings))
}

/// Stable chronological copy: events with equal timestamps keep input order,
/// so every analyzer sees the same deterministic sequence.
pub fn chronological(events: &[WatchEvent]) -> Vec<WatchEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    sorted
}
