//! Consumers of generated files.
//!
//! A [`FileSink`] receives [`GeneratedFile`]s one at a time, as the generation stream
//! yields them. [`write_stream`] drives a stream into a sink and stops at the first
//! error from either side; returning early drops the stream, which cancels the rest
//! of the run.
//!
//! - [`ZipSink`] builds a `.zip` archive next to its destination and moves it into
//!   place on [`FileSink::finish`]
//! - [`DirectorySink`] writes every file atomically (temp file + rename) below a
//!   project directory
//!
//! Requested modes are honored as zip unix permissions and, on Unix, as file mode
//! bits. Files without a mode get `0o644`.

use anyhow::{Context, Result};
use futures::{Stream, TryStreamExt};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::core::{FileOperation, FileResultExt, QagenError};
use crate::generator::GeneratedFile;
use crate::pack::store::contained_join;

const DEFAULT_FILE_MODE: u32 = 0o644;

/// Destination for generated files.
pub trait FileSink: Send {
    /// Persist one file; called in emission order.
    fn write_file(&mut self, file: &GeneratedFile) -> impl Future<Output = Result<()>> + Send;

    /// Complete the output and return where it landed.
    fn finish(self) -> impl Future<Output = Result<PathBuf>> + Send
    where
        Self: Sized;
}

/// Drain a generation stream into `sink`, calling `on_file` after each write.
///
/// Returns the number of files written. The sink is not finished; on error the
/// caller drops it.
pub async fn write_stream<S, K, F>(stream: S, sink: &mut K, mut on_file: F) -> Result<usize>
where
    S: Stream<Item = Result<GeneratedFile>>,
    K: FileSink,
    F: FnMut(&GeneratedFile),
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0;
    while let Some(file) = stream.try_next().await? {
        sink.write_file(&file).await?;
        written += 1;
        on_file(&file);
    }
    Ok(written)
}

/// Whether `path` names a zip archive.
#[must_use]
pub fn is_zip_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Writes a zip archive.
///
/// Entries go to a temporary file in the destination's directory; nothing appears at
/// the destination unless [`FileSink::finish`] succeeds.
pub struct ZipSink {
    destination: PathBuf,
    force: bool,
    writer: ZipWriter<NamedTempFile>,
}

impl ZipSink {
    /// Start an archive that will be written to `destination`.
    ///
    /// # Errors
    ///
    /// Fails when the destination exists and `force` is false, or when the
    /// temporary file cannot be created.
    pub fn create(destination: impl Into<PathBuf>, force: bool) -> Result<Self> {
        let destination = destination.into();
        if !force && destination.exists() {
            return Err(already_exists(&destination).into());
        }

        let parent = parent_dir(&destination);
        std::fs::create_dir_all(&parent).with_file_context(
            FileOperation::CreateDir,
            &parent,
            "creating archive directory",
        )?;

        let temp = NamedTempFile::new_in(&parent).with_file_context(
            FileOperation::Write,
            &parent,
            "creating temporary archive",
        )?;

        Ok(Self {
            destination,
            force,
            writer: ZipWriter::new(temp),
        })
    }
}

impl FileSink for ZipSink {
    async fn write_file(&mut self, file: &GeneratedFile) -> Result<()> {
        let options =
            SimpleFileOptions::default().unix_permissions(file.mode.unwrap_or(DEFAULT_FILE_MODE));
        self.writer
            .start_file(file.path.as_str(), options)
            .with_context(|| format!("Failed to add {} to the archive", file.path))?;
        self.writer
            .write_all(file.content.as_bytes())
            .with_context(|| format!("Failed to write {} to the archive", file.path))?;
        Ok(())
    }

    async fn finish(self) -> Result<PathBuf> {
        let temp = self.writer.finish().context("Failed to finalize zip archive")?;
        temp.as_file().sync_all().with_file_context(
            FileOperation::Write,
            temp.path(),
            "syncing archive",
        )?;

        let persisted = if self.force {
            temp.persist(&self.destination)
        } else {
            temp.persist_noclobber(&self.destination)
        };
        persisted.map_err(|e| e.error).with_file_context(
            FileOperation::Write,
            &self.destination,
            "moving archive into place",
        )?;

        tracing::debug!("Archive written to {}", self.destination.display());
        Ok(self.destination)
    }
}

/// Writes files below a project directory.
pub struct DirectorySink {
    root: PathBuf,
    force: bool,
}

impl DirectorySink {
    /// Write below `root`, overwriting existing files only when `force` is set.
    pub fn new(root: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            root: root.into(),
            force,
        }
    }

    /// The project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSink for DirectorySink {
    async fn write_file(&mut self, file: &GeneratedFile) -> Result<()> {
        let target =
            contained_join(&self.root, &file.path).ok_or_else(|| QagenError::FileSystemError {
                operation: "writing generated file (path escapes the output directory)".to_string(),
                path: file.path.clone(),
            })?;

        if !self.force && tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(already_exists(&target).into());
        }

        let content = file.content.clone().into_bytes();
        let mode = file.mode.unwrap_or(DEFAULT_FILE_MODE);
        tokio::task::spawn_blocking(move || write_atomic(&target, &content, mode))
            .await
            .context("File writer task failed")?
    }

    async fn finish(self) -> Result<PathBuf> {
        Ok(self.root)
    }
}

/// Write via a temp file in the same directory, then rename over `path`.
fn write_atomic(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    let parent = parent_dir(path);
    std::fs::create_dir_all(&parent).with_file_context(
        FileOperation::CreateDir,
        &parent,
        "creating output directory",
    )?;

    let mut temp = NamedTempFile::new_in(&parent).with_file_context(
        FileOperation::Write,
        &parent,
        "creating temporary file",
    )?;
    temp.write_all(content).with_file_context(FileOperation::Write, temp.path(), "writing")?;
    temp.as_file().sync_all().with_file_context(FileOperation::Write, temp.path(), "syncing")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file().set_permissions(std::fs::Permissions::from_mode(mode)).with_file_context(
            FileOperation::SetPermissions,
            temp.path(),
            "applying file mode",
        )?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    temp.persist(path).map_err(|e| e.error).with_file_context(
        FileOperation::Write,
        path,
        "moving generated file into place",
    )?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn already_exists(path: &Path) -> QagenError {
    QagenError::FileSystemError {
        operation: "writing output (file already exists; use --force to overwrite)".to_string(),
        path: path.display().to_string(),
    }
}
