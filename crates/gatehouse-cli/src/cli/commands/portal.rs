//! Portal command handler (the default, interactive mode).

use anyhow::Result;
use gatehouse_core::config::Config;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, start_path: Option<&str>) -> Result<()> {
    use anyhow::Context;

    gatehouse_tui::run_portal(config, start_path)
        .await
        .context("portal failed")
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config, _start_path: Option<&str>) -> Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
