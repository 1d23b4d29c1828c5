//! DBSCAN over cosine distance. Cluster expansion uses an explicit worklist
//! with a visited set; a single dense cluster may span the whole input, so
//! recursion is not an option. Border points are claimed by the first cluster
//! that reaches them in processing order, which keeps the frontier
//! deterministic.

use super::NOISE;
use crate::features::TitleMatrix;
use std::collections::VecDeque;

/// Returns one cluster id per row: 0.. in order of discovery, or [`NOISE`].
pub(crate) fn dbscan(matrix: &TitleMatrix, eps: f64, min_samples: usize) -> Vec<i32> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    // Naive O(n^2) neighborhood build; neighbor lists are index-ascending.
    let neighborhoods: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| matrix.cosine_distance(i, j) <= eps)
                .collect()
        })
        .collect();

    let mut labels: Vec<Option<i32>> = vec![None; n];
    let mut next_id: i32 = 0;

    for point in 0..n {
        if labels[point].is_some() {
            continue;
        }
        if neighborhoods[point].len() < min_samples {
            labels[point] = Some(NOISE);
            continue;
        }

        let id = next_id;
        next_id += 1;
        labels[point] = Some(id);

        let mut worklist: VecDeque<usize> = neighborhoods[point].iter().copied().collect();
        while let Some(candidate) = worklist.pop_front() {
            match labels[candidate] {
                // Density-unreachable so far; adopt as a border point.
                Some(NOISE) => labels[candidate] = Some(id),
                Some(_) => continue,
                None => {
                    labels[candidate] = Some(id);
                    if neighborhoods[candidate].len() >= min_samples {
                        worklist.extend(neighborhoods[candidate].iter().copied());
                    }
                }
            }
        }
    }

    labels
        .into_iter()
        .map(|label| label.unwrap_or(NOISE))
        .collect()
}
