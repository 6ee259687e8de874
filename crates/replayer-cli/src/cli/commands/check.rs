//! `replayer check` – validate the targets file without sending anything.

use anyhow::{Context, Result};
use replayer_core::config::ReplayerConfig;
use replayer_core::request::fit_label;
use replayer_core::targets;

pub fn run_check(cfg: &ReplayerConfig) -> Result<()> {
    let targets = targets::load_targets(&cfg.targets_file)
        .with_context(|| format!("loading targets from {}", cfg.targets_file.display()))?;
    for t in &targets {
        println!(
            "{} {} ({} byte body)",
            fit_label(&t.name, cfg.label_width),
            t.url,
            t.content.len()
        );
    }
    println!("{} target(s) OK", targets.len());
    Ok(())
}
