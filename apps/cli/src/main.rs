//! SRS Guard CLI: near-duplicate detection for SRS PDF submissions.
//!
//! Runs the HTTP service, checks single documents locally, and inspects the
//! corpus of previously admitted documents.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
