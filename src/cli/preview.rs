//! Preview the files a configuration produces.
//!
//! Runs a full in-memory generation and reports each file's path, size and
//! SHA-256 digest without writing anything.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::{CliConfig, CommandContext, OutputFormat};
use crate::generator::GeneratedFile;
use crate::project::ProjectConfig;

/// Arguments of `qagen preview`.
#[derive(Args, Debug)]
pub struct PreviewCommand {
    /// Project configuration file (JSON, YAML or TOML)
    project: PathBuf,

    /// Include file contents
    #[arg(long)]
    content: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Skip files the pack declares but does not contain
    #[arg(long)]
    lenient: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewEntry<'a> {
    path: &'a str,
    size: usize,
    checksum: String,
    is_template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewReport<'a> {
    pack: String,
    files: Vec<PreviewEntry<'a>>,
}

impl PreviewCommand {
    /// Run the command.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let project = ProjectConfig::load(&self.project)?;
        let context = CommandContext::load(config).await?;

        let mut options = context.global.generate_options();
        if self.lenient {
            options.strict = false;
        }
        let files = context.generator(options).generate_all(&project).await?;
        tracing::debug!("Preview of {} produced {} files", project.pack_key(), files.len());

        match self.format {
            OutputFormat::Json => {
                let report = PreviewReport {
                    pack: project.pack_key().to_string(),
                    files: files.iter().map(|file| self.entry(file)).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => self.print_text(&project, &files),
        }
        Ok(())
    }

    fn entry<'a>(&self, file: &'a GeneratedFile) -> PreviewEntry<'a> {
        PreviewEntry {
            path: &file.path,
            size: file.size(),
            checksum: file.checksum(),
            is_template: file.is_template,
            mode: file.mode,
            content: self.content.then_some(file.content.as_str()),
        }
    }

    fn print_text(&self, project: &ProjectConfig, files: &[GeneratedFile]) {
        println!("{} {}", "Pack".bold(), project.pack_key().to_string().cyan());
        if files.is_empty() {
            println!("No files would be generated");
            return;
        }

        let width = files.iter().map(|f| f.path.len()).max().unwrap_or(0);
        for file in files {
            println!(
                "  {:<width$}  {:>8}  {}",
                file.path,
                file.size(),
                file.checksum().dimmed(),
                width = width
            );
            if self.content {
                for line in file.content.lines() {
                    println!("    {line}");
                }
            }
        }
        println!("{} files", files.len());
    }
}
