//! List template packs, or check whether one configuration has a pack.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{CliConfig, CommandContext, OutputFormat};
use crate::core::QagenError;
use crate::project::ProjectConfig;

/// Arguments of `qagen packs`.
#[derive(Args, Debug)]
pub struct PacksCommand {
    /// Report whether a pack exists for this project configuration instead of listing
    #[arg(long, value_name = "PROJECT")]
    check: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl PacksCommand {
    /// Run the command.
    ///
    /// With `--check`, a missing pack is reported as [`QagenError::PackNotFound`] so
    /// the exit status reflects the answer.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let context = CommandContext::load(config).await?;
        let resolver = context.resolver();

        if let Some(path) = &self.check {
            let project = ProjectConfig::load(path)?;
            let key = project.pack_key();
            let exists = resolver.exists(&project).await;

            match self.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "pack": key.as_str(), "exists": exists })
                ),
                OutputFormat::Text if exists => println!("{} {}", "✓".green(), key),
                OutputFormat::Text => {}
            }
            if !exists {
                return Err(QagenError::PackNotFound {
                    pack: key.to_string(),
                }
                .into());
            }
            return Ok(());
        }

        let packs = resolver.list_packs().await?;
        match self.format {
            OutputFormat::Json => {
                let keys: Vec<&str> = packs.iter().map(|k| k.as_str()).collect();
                println!("{}", serde_json::to_string_pretty(&keys)?);
            }
            OutputFormat::Text => {
                if packs.is_empty() {
                    println!("No template packs in {}", context.packs_dir().display());
                }
                for key in &packs {
                    println!("{key}");
                }
            }
        }
        Ok(())
    }
}
