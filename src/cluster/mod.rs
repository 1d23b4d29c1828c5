//! Density-based content clustering over TF-IDF title vectors.

pub(crate) mod engine;
mod profile;

use crate::config::ClusteringConfig;
use crate::error::AnalysisError;
use crate::features::TitleMatrix;
use crate::history::{self, WatchEvent};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Cluster id assigned to density-unreachable points.
pub const NOISE: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Non-negative cluster id in processing order
    pub id: i32,
    pub size: usize,
    /// Indices into the time-sorted event sequence
    pub member_indices: Vec<usize>,
    /// Top frequent informative tokens among member titles
    pub dominant_theme: Vec<String>,
    pub characteristics: ClusterCharacteristics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCharacteristics {
    /// Mean of the member durations that are present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_duration_seconds: Option<f64>,
    /// Views per hour-of-day across member timestamps
    pub hour_histogram: [u32; 24],
    pub top_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringReport {
    pub clusters: Vec<Cluster>,
    /// Per-event cluster id (or [`NOISE`]), indexed like the sorted sequence
    pub assignments: Vec<i32>,
    pub noise_count: usize,
}

impl ClusteringReport {
    fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            assignments: Vec::new(),
            noise_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusteringConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusteringConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Group the history into content clusters and noise. Empty input yields
    /// an empty report; an all-noise result is valid.
    pub fn cluster(&self, events: &[WatchEvent]) -> Result<ClusteringReport, AnalysisError> {
        let sorted = history::chronological(events);
        if sorted.is_empty() {
            return Ok(ClusteringReport::empty());
        }

        let titles: Vec<&str> = sorted.iter().map(|e| e.title.as_str()).collect();
        let matrix = TitleMatrix::from_titles(&titles)?;
        let assignments = engine::dbscan(&matrix, self.config.eps, self.config.min_samples);

        let cluster_count = assignments.iter().copied().max().map_or(0, |m| m.max(-1) + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count as usize];
        let mut noise_count = 0;
        for (index, &id) in assignments.iter().enumerate() {
            if id == NOISE {
                noise_count += 1;
            } else {
                members[id as usize].push(index);
            }
        }

        let clusters: Vec<Cluster> = members
            .into_iter()
            .enumerate()
            .map(|(id, indices)| {
                profile::profile_cluster(id as i32, indices, &sorted, self.config.theme_terms)
            })
            .collect();

        info!(
            clusters = clusters.len(),
            noise = noise_count,
            events = sorted.len(),
            "clustered watch history"
        );
        Ok(ClusteringReport {
            clusters,
            assignments,
            noise_count,
        })
    }
}
