//! QAGen CLI entry point
//!
//! Parses the command line, runs the command and turns failures into colored,
//! actionable messages with exit status 1.

use anyhow::Result;
use clap::Parser;
use qagen_cli::cli;
use qagen_cli::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
