//! CLI for the replayer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use replayer_core::config::{self, ReplayerConfig};
use std::path::PathBuf;

use commands::{run_check, run_replay};

/// Top-level CLI for the replayer.
#[derive(Debug, Parser)]
#[command(name = "replayer")]
#[command(about = "Resend a form POST per target until the response says it succeeded", long_about = None)]
pub struct Cli {
    /// Write logs to ~/.local/state/replayer/replayer.log instead of stderr.
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Use this config file instead of ~/.config/replayer/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Replay every target until each one succeeds (or fails fatally).
    Run {
        /// JSON file with `[{name, url, content}]` records (default from config: courses.json).
        #[arg(long, value_name = "PATH")]
        targets: Option<PathBuf>,

        /// Delay between attempts of one target, in milliseconds.
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Upper bound for a single attempt, in seconds.
        #[arg(long, value_name = "SECS")]
        attempt_timeout_secs: Option<u64>,
    },

    /// Validate the targets file and list the targets without sending anything.
    Check {
        /// JSON file with `[{name, url, content}]` records (default from config: courses.json).
        #[arg(long, value_name = "PATH")]
        targets: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Run {
                targets,
                delay_ms,
                attempt_timeout_secs,
            } => {
                let cfg = apply_overrides(cfg, targets, delay_ms, attempt_timeout_secs);
                run_replay(&cfg).await?;
            }
            CliCommand::Check { targets } => {
                let cfg = apply_overrides(cfg, targets, None, None);
                run_check(&cfg)?;
            }
        }

        Ok(())
    }
}

/// Command-line flags win over the config file.
fn apply_overrides(
    mut cfg: ReplayerConfig,
    targets: Option<PathBuf>,
    delay_ms: Option<u64>,
    attempt_timeout_secs: Option<u64>,
) -> ReplayerConfig {
    if let Some(path) = targets {
        cfg.targets_file = path;
    }
    if let Some(ms) = delay_ms {
        cfg.delay_ms = ms;
    }
    if let Some(secs) = attempt_timeout_secs {
        cfg.attempt_timeout_secs = secs;
    }
    cfg
}

#[cfg(test)]
mod tests;
