//! Command-line interface for QAGen.
//!
//! # Available Commands
//!
//! - `generate` - Stream a project from its template pack into a `.zip` archive or
//!   a directory
//! - `preview` - List the files a configuration would produce, without writing them
//! - `deps` - Show the tool versions a configuration pulls in
//! - `packs` - List installed template packs, or check one configuration
//!
//! # Examples
//!
//! ```bash
//! qagen generate project.json --output shop-tests.zip
//! qagen generate project.yaml --output ./shop-tests --force
//! qagen preview project.json --format json
//! qagen deps project.json
//! qagen packs --check project.json
//! qagen --packs-dir ./packs -v generate project.json
//! ```
//!
//! Global flags apply to every command. The pack root comes from `--packs-dir`,
//! then `QAGEN_PACKS_DIR`, then `packs_dir` in the global config.

mod common;
pub mod deps;
pub mod generate;
pub mod packs;
pub mod preview;

pub use common::{CommandContext, OutputFormat};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings shared by every command, derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` when `RUST_LOG` should be used as-is
    pub log_level: Option<String>,
    /// Disable spinners
    pub no_progress: bool,
    /// Custom global config file
    pub config_path: Option<PathBuf>,
    /// Pack root overriding the global config
    pub packs_dir: Option<String>,
}

impl CliConfig {
    /// Default configuration: info logging, progress enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` wins when set; otherwise the level from the flags applies. Logs go
    /// to stderr so command output on stdout stays machine-readable.
    pub fn init_logging(&self) {
        let filter = match (&self.log_level, std::env::var("RUST_LOG")) {
            (_, Ok(directive)) if !directive.is_empty() => EnvFilter::new(directive),
            (Some(level), _) => EnvFilter::new(format!("qagen_cli={level},qagen={level}")),
            (None, _) => EnvFilter::new("qagen_cli=info"),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

/// QAGen command line.
#[derive(Parser)]
#[command(
    name = "qagen",
    about = "QAGen - Generate QA test-automation projects from template packs",
    version,
    long_about = "QAGen turns a project configuration (testing type, language, framework, \
                  test runner, build tool) into a ready-to-run test-automation project \
                  rendered from a matching template pack."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global configuration file (default `~/.qagen/config.toml`)
    #[arg(short, long, global = true, env = "QAGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Template pack root
    #[arg(long, global = true, env = "QAGEN_PACKS_DIR")]
    packs_dir: Option<String>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a project into a `.zip` archive or a directory.
    ///
    /// See [`generate::GenerateCommand`].
    Generate(generate::GenerateCommand),

    /// List the files a configuration would produce.
    ///
    /// See [`preview::PreviewCommand`].
    Preview(preview::PreviewCommand),

    /// Show the dependencies a configuration pulls in.
    ///
    /// See [`deps::DepsCommand`].
    Deps(deps::DepsCommand),

    /// List template packs or check one configuration.
    ///
    /// See [`packs::PacksCommand`].
    Packs(packs::PacksCommand),
}

impl Cli {
    /// Execute with the configuration implied by the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: Some(log_level.to_string()),
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
            packs_dir: self.packs_dir.clone(),
        }
    }

    /// Execute with an injected configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Generate(cmd) => cmd.execute(&config).await,
            Commands::Preview(cmd) => cmd.execute(&config).await,
            Commands::Deps(cmd) => cmd.execute(&config).await,
            Commands::Packs(cmd) => cmd.execute(&config).await,
        }
    }
}
