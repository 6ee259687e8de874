//! `replayer run` – replay every target until it succeeds.

use anyhow::{Context, Result};
use replayer_core::config::ReplayerConfig;
use replayer_core::orchestrator;
use replayer_core::targets;
use std::io::Write;

pub async fn run_replay(cfg: &ReplayerConfig) -> Result<()> {
    replay_to(cfg, &mut std::io::stdout()).await
}

/// `Finished` is printed once every engine is terminal, including when there
/// were none to start. A FATAL engine turns into the returned error afterwards.
async fn replay_to(cfg: &ReplayerConfig, out: &mut impl Write) -> Result<()> {
    let targets = targets::load_targets(&cfg.targets_file)
        .with_context(|| format!("loading targets from {}", cfg.targets_file.display()))?;
    if targets.is_empty() {
        writeln!(out, "No targets in {}.", cfg.targets_file.display())?;
    }

    let summary = orchestrator::run_targets(&targets, cfg).await?;
    tracing::info!(
        "run completed: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    writeln!(out, "Finished")?;
    summary.into_result()?;
    Ok(())
}
