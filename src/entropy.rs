//! Shannon entropy of content and channel distributions. Low diversity is
//! context for the risk report, not a weighted signal.

use crate::features::tokenize;
use crate::history::WatchEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyAnalysis {
    /// Entropy (bits) of the title-token distribution
    pub content_entropy: f64,
    /// Entropy (bits) of the channel distribution
    pub channel_entropy: f64,
}

fn shannon_bits<I: IntoIterator<Item = usize>>(counts: I) -> f64 {
    let counts: Vec<usize> = counts.into_iter().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

impl EntropyAnalysis {
    pub fn from_events(events: &[WatchEvent]) -> Self {
        let mut tokens: HashMap<String, usize> = HashMap::new();
        for event in events {
            for token in tokenize(&event.title) {
                *tokens.entry(token).or_default() += 1;
            }
        }
        let mut channels: HashMap<&str, usize> = HashMap::new();
        for event in events {
            *channels.entry(event.channel.as_str()).or_default() += 1;
        }
        Self {
            content_entropy: shannon_bits(tokens.into_values()),
            channel_entropy: shannon_bits(channels.into_values()),
        }
    }
}
