//! Show the tool versions a configuration uses.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{CliConfig, CommandContext, OutputFormat};
use crate::dependencies::dependencies;
use crate::project::ProjectConfig;

/// Arguments of `qagen deps`.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Project configuration file (JSON, YAML or TOML)
    project: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl DepsCommand {
    /// Run the command.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let project = ProjectConfig::load(&self.project)?;
        let context = CommandContext::load(config).await?;

        let manifest = context.resolver().resolve(&project).await?;
        let deps = dependencies(&project, &manifest.tool_versions);

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deps)?),
            OutputFormat::Text => {
                if deps.is_empty() {
                    println!("No pinned dependencies for {}", project.pack_key());
                }
                let width = deps.keys().map(String::len).max().unwrap_or(0);
                for (name, version) in &deps {
                    println!("{:<width$}  {}", name.bold(), version, width = width);
                }
            }
        }
        Ok(())
    }
}
