//! Per-cluster profiling: dominant theme and viewing characteristics.

use super::{Cluster, ClusterCharacteristics};
use crate::features::tokenize;
use crate::history::WatchEvent;
use chrono::Timelike;
use std::collections::HashMap;

const TOP_KEYWORDS: usize = 5;

/// Top-k most frequent informative tokens, ties broken lexically ascending.
fn frequent_terms(titles: &[&str], k: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        for token in tokenize(title) {
            *counts.entry(token).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(k).map(|(token, _)| token).collect()
}

pub(crate) fn profile_cluster(
    id: i32,
    member_indices: Vec<usize>,
    events: &[WatchEvent],
    theme_terms: usize,
) -> Cluster {
    let titles: Vec<&str> = member_indices
        .iter()
        .map(|&i| events[i].title.as_str())
        .collect();

    let mut hour_histogram = [0u32; 24];
    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;
    for &i in &member_indices {
        hour_histogram[events[i].timestamp.hour() as usize] += 1;
        if let Some(duration) = events[i].duration_seconds {
            duration_sum += duration;
            duration_count += 1;
        }
    }
    let avg_duration_seconds = (duration_count > 0).then(|| duration_sum / duration_count as f64);

    Cluster {
        id,
        size: member_indices.len(),
        dominant_theme: frequent_terms(&titles, theme_terms),
        characteristics: ClusterCharacteristics {
            avg_duration_seconds,
            hour_histogram,
            top_keywords: frequent_terms(&titles, TOP_KEYWORDS),
        },
        member_indices,
    }
}
