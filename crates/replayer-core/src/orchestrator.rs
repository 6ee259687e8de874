//! Fan out one replay engine per target and run them all to a terminal state.
//!
//! Engines are spawned into a single `JoinSet` and joined in completion order.
//! A fatal engine does not cancel its siblings; failures are collected and
//! reported once every engine has finished.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::ReplayerConfig;
use crate::replay::{
    policy_for, CurlTransport, EngineReport, ReplayEngine, Sleeper, TokioSleeper, Transport,
};
use crate::request::RequestDescriptor;
use crate::targets::TargetRecord;

/// An engine that ended FATAL (or whose task panicked).
#[derive(Debug)]
pub struct EngineFailure {
    pub label: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<EngineReport>,
    pub failed: Vec<EngineFailure>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// `Ok` with the success reports if no engine failed, otherwise one error
    /// naming every failed target.
    pub fn into_result(self) -> Result<Vec<EngineReport>> {
        if self.failed.is_empty() {
            return Ok(self.succeeded);
        }
        let details: Vec<String> = self
            .failed
            .iter()
            .map(|f| format!("{}: {:#}", f.label, f.error))
            .collect();
        anyhow::bail!(
            "{} of {} target(s) failed: {}",
            self.failed.len(),
            self.total(),
            details.join("; ")
        )
    }
}

/// Runs every engine concurrently and waits for all of them.
pub async fn run_engines<T, S>(engines: Vec<ReplayEngine<T, S>>) -> RunSummary
where
    T: Transport + 'static,
    S: Sleeper + 'static,
{
    let mut join_set = tokio::task::JoinSet::new();
    for engine in engines {
        tracing::debug!("starting engine for {}", engine.label());
        join_set.spawn(engine.run());
    }

    let mut summary = RunSummary::default();
    while let Some(res) = join_set.join_next().await {
        match res {
            Ok(Ok(report)) => {
                tracing::info!(
                    "{} succeeded after {} attempt(s)",
                    report.label,
                    report.attempts
                );
                summary.succeeded.push(report);
            }
            Ok(Err(e)) => summary.failed.push(EngineFailure {
                label: e.label().to_string(),
                error: e.into(),
            }),
            Err(join) => {
                tracing::error!("engine task failed: {}", join);
                summary.failed.push(EngineFailure {
                    label: "<engine task>".to_string(),
                    error: anyhow::anyhow!("engine task join: {}", join),
                });
            }
        }
    }
    summary
}

/// Builds the production engine for one target: curl transport, tokio delay,
/// and the marker, label width, timeouts and error policy from `cfg`.
pub fn build_engine(
    target: &TargetRecord,
    cfg: &ReplayerConfig,
) -> Result<ReplayEngine<CurlTransport, TokioSleeper>> {
    let descriptor = RequestDescriptor::from_target(target)
        .with_context(|| format!("target {}: invalid url {:?}", target.name, target.url))?
        .with_success_marker(cfg.success_marker.clone())
        .with_label_width(cfg.label_width)
        .with_error_policy(policy_for(cfg.error_policy));
    let transport = CurlTransport::new(cfg.attempt_timeout(), cfg.connect_timeout());
    Ok(
        ReplayEngine::new(descriptor, Arc::new(transport), Arc::new(TokioSleeper))
            .with_delay(cfg.delay())
            .with_attempt_timeout(cfg.attempt_timeout()),
    )
}

/// Builds one engine per target (all before any starts) and runs them.
pub async fn run_targets(targets: &[TargetRecord], cfg: &ReplayerConfig) -> Result<RunSummary> {
    let engines = targets
        .iter()
        .map(|t| build_engine(t, cfg))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!("replaying {} target(s)", engines.len());
    Ok(run_engines(engines).await)
}
