//! Per-attempt and per-engine error types.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single send/receive. Classified by the error policy before
/// anything is surfaced to the orchestrator.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Curl reported an error (connect, DNS, TLS, timeout, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The first response line is not valid text in the response charset.
    #[error("first response line is not valid {charset}")]
    Decode { charset: &'static str },
    /// The attempt exceeded its time budget.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// The blocking transfer task panicked or was cancelled.
    #[error("transfer worker failed: {0}")]
    Worker(String),
    /// A response was classified as fatal.
    #[error("response rejected (HTTP {status})")]
    Rejected { status: u32 },
}

impl AttemptError {
    /// Short category used in log lines and by error policies.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Curl(_) => "transport",
            AttemptError::Decode { .. } => "decode",
            AttemptError::Timeout(_) => "timeout",
            AttemptError::Worker(_) => "worker",
            AttemptError::Rejected { .. } => "rejected",
        }
    }
}

/// Terminal failure of one replay engine.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("{label}: giving up after {attempts} attempt(s): {source}")]
    Fatal {
        label: String,
        attempts: u32,
        source: AttemptError,
    },
}

impl ReplayError {
    pub fn label(&self) -> &str {
        match self {
            ReplayError::Fatal { label, .. } => label,
        }
    }
}
