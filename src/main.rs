mod cli;
mod error;
mod logging;
mod model;
#[cfg(feature = "tui")]
mod orchestrator;
#[cfg(feature = "tui")]
mod session;
mod storage;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
