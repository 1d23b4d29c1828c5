//! Topic-shift detector: adjacent pairs that land in different clusters (or
//! categories) and sit further apart than the shift threshold.

use super::{Finding, SignalKind};
use crate::cluster::NOISE;
use crate::config::PatternConfig;
use crate::features::{cosine, TitleMatrix};
use crate::history::WatchEvent;
use ndarray::Array1;
use std::collections::HashMap;

/// Cosine distance between the pair's clusters: centroid against centroid,
/// falling back to an event's own vector when it is noise.
fn pair_distance(
    matrix: &TitleMatrix,
    centroids: &HashMap<i32, Array1<f64>>,
    assignments: &[i32],
    a: usize,
    b: usize,
) -> f64 {
    let vector_for = |i: usize| {
        let id = assignments[i];
        if id != NOISE {
            centroids.get(&id).map(|c| c.view())
        } else {
            None
        }
        .unwrap_or_else(|| matrix.row(i))
    };
    1.0 - cosine(vector_for(a), vector_for(b))
}

pub(crate) fn detect(
    sorted: &[WatchEvent],
    matrix: &TitleMatrix,
    assignments: &[i32],
    config: &PatternConfig,
) -> Vec<Finding> {
    let mut members: HashMap<i32, Vec<usize>> = HashMap::new();
    for (index, &id) in assignments.iter().enumerate() {
        if id != NOISE {
            members.entry(id).or_default().push(index);
        }
    }
    let centroids: HashMap<i32, Array1<f64>> = members
        .into_iter()
        .map(|(id, indices)| (id, matrix.centroid(&indices)))
        .collect();

    let threshold = config.topic_shift_threshold;
    let mut findings = Vec::new();
    for i in 1..sorted.len() {
        let cluster_differs = assignments[i - 1] != assignments[i];
        let category_differs = sorted[i - 1].category != sorted[i].category;
        if !cluster_differs && !category_differs {
            continue;
        }
        let distance = pair_distance(matrix, &centroids, assignments, i - 1, i);
        if distance <= threshold {
            continue;
        }
        let confidence = if threshold >= 1.0 {
            1.0
        } else {
            ((distance - threshold) / (1.0 - threshold)).min(1.0)
        };
        findings.push(Finding {
            kind: SignalKind::TopicShift,
            occurrences: vec![i - 1, i],
            confidence,
            evidence: format!("distance={distance:.3} threshold={threshold}"),
        });
    }
    findings
}
