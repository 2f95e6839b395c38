//! Generate a project from its template pack.
//!
//! Files are streamed from the engine straight into the output, one at a time: a
//! `.zip` archive when the output path ends in `.zip`, a directory otherwise. A
//! failure anywhere stops generation; a zip archive is then not created at all,
//! while a directory keeps the files written so far.
//!
//! # Examples
//!
//! ```bash
//! qagen generate project.json                      # ./<artifactId>.zip
//! qagen generate project.json -o shop-tests.zip
//! qagen generate project.yaml -o ./shop-tests --force
//! qagen generate project.json --lenient            # skip missing pack files
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::{CliConfig, CommandContext};
use crate::archive::{DirectorySink, FileSink, ZipSink, is_zip_path, write_stream};
use crate::generator::{GeneratedFile, Generator};
use crate::pack::DirectoryPackStore;
use crate::project::ProjectConfig;
use crate::templating::sanitize_path;

/// Arguments of `qagen generate`.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Project configuration file (JSON, YAML or TOML)
    project: PathBuf,

    /// Output `.zip` archive or directory (default `<artifactId>.zip`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip files the pack declares but does not contain
    #[arg(long)]
    lenient: bool,

    /// Overwrite existing output
    #[arg(short, long)]
    force: bool,
}

impl GenerateCommand {
    /// Run the command.
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let project = ProjectConfig::load(&self.project)?;
        let context = CommandContext::load(config).await?;

        let mut options = context.global.generate_options();
        if self.lenient {
            options.strict = false;
        }
        let generator = context.generator(options);

        let output = self.output.clone().unwrap_or_else(|| default_output(&project));
        tracing::debug!("Generating pack {} into {}", project.pack_key(), output.display());

        let spinner = context.spinner("Generating");
        let result = if is_zip_path(&output) {
            let sink = ZipSink::create(&output, self.force)?;
            run(&generator, &project, sink, |file| spinner.set_message(file.path.clone())).await
        } else {
            let sink = DirectorySink::new(&output, self.force);
            run(&generator, &project, sink, |file| spinner.set_message(file.path.clone())).await
        };
        spinner.finish_and_clear();

        let (written, location) = result?;
        tracing::info!("Generated {} files for pack {}", written, project.pack_key());
        println!(
            "{} {} ({} files) -> {}",
            "✓".green(),
            project.project_name.bold(),
            written,
            location.display()
        );
        Ok(())
    }
}

async fn run<K, F>(
    generator: &Generator<DirectoryPackStore>,
    project: &ProjectConfig,
    mut sink: K,
    on_file: F,
) -> Result<(usize, PathBuf)>
where
    K: FileSink,
    F: FnMut(&GeneratedFile),
{
    let written = write_stream(generator.generate_stream(project), &mut sink, on_file).await?;
    let location = sink.finish().await?;
    Ok((written, location))
}

fn default_output(project: &ProjectConfig) -> PathBuf {
    let name = sanitize_path(project.artifact_id.as_deref().unwrap_or(&project.project_name))
        .to_lowercase()
        .replace('/', "-");
    let name = if name.trim_matches(['_', '-', '.']).is_empty() {
        "project".to_string()
    } else {
        name
    };
    PathBuf::from(format!("{name}.zip"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_config;

    #[test]
    fn test_default_output() {
        assert_eq!(default_output(&sample_config()), PathBuf::from("saucedemo-tests.zip"));

        let mut config = sample_config();
        config.project_name = "Shop Tests".to_string();
        assert_eq!(default_output(&config), PathBuf::from("shop_tests.zip"));

        config.artifact_id = Some("shop".to_string());
        assert_eq!(default_output(&config), PathBuf::from("shop.zip"));

        config.artifact_id = Some("...".to_string());
        assert_eq!(default_output(&config), PathBuf::from("project.zip"));
    }
}
