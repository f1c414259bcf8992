//! Warfront demo client binary.
//!
//! Composition root for the console demo: sets up logging, builds the demo
//! driver (roster + bus + tracker wiring) and runs the scripted scenario.
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=warfront_core=debug` to
//! watch command routing); demo narration goes to stdout, logs to stderr.

mod demo;
mod handlers;
mod roster;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::demo::Demo;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("starting warfront demo client");

    Demo::new().run()?;

    tracing::info!("demo complete");
    Ok(())
}
