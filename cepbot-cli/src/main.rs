//! Binary crate for the `cepbot` chatbot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and managing the config file
//! - Logging sinks and the process lifecycle
//! - Interactive prompts and human-friendly output formatting

use clap::Parser;

mod chat;
mod cli;
mod commands;
mod lifecycle;
mod logging;
mod prompt;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    let code = cmd.run().await?;

    // A prompt may still be blocking a worker thread, so don't wait for the runtime.
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
