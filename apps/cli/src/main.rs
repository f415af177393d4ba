//! quizbank CLI: exam document to question bank, plus knowledge lookups.
//!
//! Parses a numbered exam document into `questions.json`, checks the bank
//! for anomalies, and answers questions against the knowledge graph.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
