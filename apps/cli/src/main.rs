//! docbundle CLI: combine a documentation tree into one LLM-ready file.
//!
//! Downloads the docs folder of a GitHub tree URL when the local root is
//! missing or empty, then concatenates every matching file behind a table
//! of contents.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
