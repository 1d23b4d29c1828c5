//! Error taxonomy: parameter errors fail fast, entry errors tolerate partial loss.
//!
//! A structurally valid but empty history is never an error; every analyzer
//! returns a well-formed zero result for it instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Configuration or parameter rejected before any processing started.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Entry-level data failure that left nothing to analyze.
    /// Individual malformed entries are dropped with a warning instead.
    #[error("invalid entries: {reason}")]
    InvalidEntry { reason: String },
}

impl AnalysisError {
    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn entries(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidEntry {
            reason: reason.into(),
        }
    }
}
