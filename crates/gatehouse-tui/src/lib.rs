//! Full-screen TUI for the gatehouse account portal.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod notify;
pub mod overlays;
pub mod render;
pub mod router;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use gatehouse_core::config::Config;
pub use router::Route;
pub use runtime::TuiRuntime;

/// Runs the interactive portal.
///
/// `start_path` is the initial location; unknown paths land on the
/// not-found page, guarded paths go through the session guard.
pub async fn run_portal(config: &Config, start_path: Option<&str>) -> Result<()> {
    // The portal requires a terminal to render the TUI.
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The portal requires a terminal.\n\
             Use `gatehouse login`, `whoami` or `profile` for non-interactive use."
        );
    }

    let backend = config.backend()?;
    let start = start_path.map_or_else(Route::default_landing, Route::parse);

    let mut runtime = TuiRuntime::new(backend, start)?;
    runtime.run()?;

    // Terminal is restored at this point.
    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
