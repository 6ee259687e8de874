//! Replay loop: send → classify → delay, until success or a fatal error.

use std::sync::Arc;
use std::time::Duration;

use super::error::{AttemptError, ReplayError};
use super::outcome::Outcome;
use super::sleeper::Sleeper;
use super::transport::{HttpResponse, PreparedRequest, Transport};
use crate::request::RequestDescriptor;

/// Result of an engine that reached SUCCEEDED.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub label: String,
    /// Requests sent, including the successful one.
    pub attempts: u32,
}

/// Drives one descriptor through an unbounded retry loop with a fixed delay.
pub struct ReplayEngine<T, S> {
    descriptor: RequestDescriptor,
    transport: Arc<T>,
    sleeper: Arc<S>,
    delay: Duration,
    attempt_timeout: Duration,
}

impl<T, S> ReplayEngine<T, S>
where
    T: Transport + 'static,
    S: Sleeper,
{
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(600);

    pub fn new(descriptor: RequestDescriptor, transport: Arc<T>, sleeper: Arc<S>) -> Self {
        Self {
            descriptor,
            transport,
            sleeper,
            delay: Self::DEFAULT_DELAY,
            attempt_timeout: Self::DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn label(&self) -> &str {
        self.descriptor.label()
    }

    /// Runs until the descriptor classifies a response as success (`Ok`) or
    /// an attempt error as fatal (`Err`). Attempts are strictly sequential.
    pub async fn run(self) -> Result<EngineReport, ReplayError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            tracing::debug!(label = %self.label(), attempt = attempts, "sending");

            let failure = match self.send(self.descriptor.build_request()).await {
                Ok(response) => match self.descriptor.classify_response(&response) {
                    Ok(Outcome::Stop) => {
                        return Ok(EngineReport {
                            label: self.label().to_string(),
                            attempts,
                        })
                    }
                    Ok(Outcome::Continue) => None,
                    Ok(Outcome::Fatal) => {
                        return Err(self.fatal(
                            attempts,
                            AttemptError::Rejected {
                                status: response.status,
                            },
                        ))
                    }
                    Err(e) => Some(e),
                },
                Err(e) => Some(e),
            };

            if let Some(err) = failure {
                // An error never counts as success, so Stop ends the engine as fatal too.
                if self.descriptor.classify_exception(&err).is_terminal() {
                    return Err(self.fatal(attempts, err));
                }
            }

            self.sleeper.sleep(self.delay).await;
        }
    }

    /// One transfer on the blocking pool, bounded by the attempt budget.
    /// On timeout the transfer thread is left to hit its own curl timeout.
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, AttemptError> {
        let transport = Arc::clone(&self.transport);
        let worker = tokio::task::spawn_blocking(move || transport.send(&request));
        match tokio::time::timeout(self.attempt_timeout, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(AttemptError::Worker(join.to_string())),
            Err(_) => Err(AttemptError::Timeout(self.attempt_timeout)),
        }
    }

    fn fatal(&self, attempts: u32, source: AttemptError) -> ReplayError {
        tracing::error!(label = %self.label(), attempts, "giving up: {}", source);
        ReplayError::Fatal {
            label: self.label().to_string(),
            attempts,
            source,
        }
    }
}
