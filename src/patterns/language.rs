//! Language-switch detector. The upstream per-event language signal wins when
//! present; otherwise the dominant Unicode script class of the title stands in
//! for it. Titles with no letters carry no language and never count as
//! switches.

use super::{Finding, SignalKind};
use crate::config::PatternConfig;
use crate::history::WatchEvent;

const SCRIPT_CLASSES: [&str; 6] = ["latin", "cyrillic", "cjk", "hangul", "arabic", "devanagari"];

fn script_class(c: char) -> Option<usize> {
    match c {
        'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' => Some(0),
        '\u{0400}'..='\u{04FF}' => Some(1),
        '\u{3040}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}' => Some(2),
        '\u{1100}'..='\u{11FF}' | '\u{AC00}'..='\u{D7AF}' => Some(3),
        '\u{0600}'..='\u{06FF}' => Some(4),
        '\u{0900}'..='\u{097F}' => Some(5),
        _ => None,
    }
}

/// Dominant script class of a title; ties resolve to the first class listed.
fn infer_script(title: &str) -> Option<&'static str> {
    let mut counts = [0usize; SCRIPT_CLASSES.len()];
    for c in title.chars() {
        if let Some(class) = script_class(c) {
            counts[class] += 1;
        }
    }
    let (best, &count) = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(&a.0)))?;
    (count > 0).then(|| SCRIPT_CLASSES[best])
}

pub(crate) fn language_of(event: &WatchEvent) -> Option<String> {
    match &event.language {
        Some(language) if !language.trim().is_empty() => Some(language.clone()),
        _ => infer_script(&event.title).map(str::to_string),
    }
}

pub(crate) fn detect(sorted: &[WatchEvent], _config: &PatternConfig) -> Vec<Finding> {
    let languages: Vec<Option<String>> = sorted.iter().map(language_of).collect();
    let mut findings = Vec::new();
    let mut run_length = 0usize;
    for i in 1..sorted.len() {
        match (&languages[i - 1], &languages[i]) {
            (Some(previous), Some(current)) if previous != current => {
                run_length += 1;
                findings.push(Finding {
                    kind: SignalKind::LanguageSwitch,
                    occurrences: vec![i - 1, i],
                    confidence: (run_length as f64 / 5.0).min(1.0),
                    evidence: format!("{previous}->{current}"),
                });
            }
            _ => run_length = 0,
        }
    }
    findings
}
