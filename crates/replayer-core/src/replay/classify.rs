//! Classification policies: when a response line means success, and which
//! attempt failures are retried.

use std::fmt;
use std::sync::Arc;

use super::error::AttemptError;
use super::outcome::Outcome;
use crate::config::ErrorPolicyKind;

/// Decides from the first response line whether the engine stops.
pub trait SuccessPolicy: fmt::Debug + Send + Sync {
    fn classify(&self, first_line: &str) -> Outcome;
}

/// `Stop` iff the line contains the marker; `Continue` otherwise.
#[derive(Debug, Clone)]
pub struct MarkerPolicy {
    marker: String,
}

impl MarkerPolicy {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl SuccessPolicy for MarkerPolicy {
    fn classify(&self, first_line: &str) -> Outcome {
        if first_line.contains(self.marker.as_str()) {
            Outcome::Stop
        } else {
            Outcome::Continue
        }
    }
}

/// Decides whether a failed attempt is retried (`Continue`) or ends the
/// engine (`Fatal`).
pub trait ErrorPolicy: fmt::Debug + Send + Sync {
    fn classify(&self, err: &AttemptError) -> Outcome;
}

/// Retry every failure forever. Permanent conditions such as a malformed URL
/// or an unknown host are retried as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl ErrorPolicy for AlwaysRetry {
    fn classify(&self, _err: &AttemptError) -> Outcome {
        Outcome::Continue
    }
}

/// Give up on curl errors that cannot change between attempts; retry the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailOnPermanent;

impl ErrorPolicy for FailOnPermanent {
    fn classify(&self, err: &AttemptError) -> Outcome {
        match err {
            AttemptError::Curl(e)
                if e.is_url_malformed()
                    || e.is_unsupported_protocol()
                    || e.is_couldnt_resolve_host() =>
            {
                Outcome::Fatal
            }
            _ => Outcome::Continue,
        }
    }
}

pub fn policy_for(kind: ErrorPolicyKind) -> Arc<dyn ErrorPolicy> {
    match kind {
        ErrorPolicyKind::AlwaysRetry => Arc::new(AlwaysRetry),
        ErrorPolicyKind::FailOnPermanent => Arc::new(FailOnPermanent),
    }
}
