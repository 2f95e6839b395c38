//! Structured file system error handling for QAGen
//!
//! Pack stores and sinks capture the operation, path and purpose at the call site
//! instead of parsing error messages afterwards.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Types of file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a file completely
    Read,
    /// Writing a file
    Write,
    /// Listing a directory
    List,
    /// Creating a directory
    CreateDir,
    /// Changing file permissions
    SetPermissions,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::List => write!(f, "listing"),
            FileOperation::CreateDir => write!(f, "creating directory"),
            FileOperation::SetPermissions => write!(f, "setting permissions on"),
        }
    }
}

/// File operation error with the context it happened in
#[derive(Error, Debug)]
#[error("Failed {operation} '{}' ({purpose})", .file_path.display())]
pub struct FileOperationError {
    /// The type of operation that failed
    pub operation: FileOperation,
    /// The file path that was being accessed
    pub file_path: PathBuf,
    /// Why the file was being accessed
    pub purpose: String,
    /// The underlying IO error
    #[source]
    pub source: std::io::Error,
}

impl FileOperationError {
    /// Whether the underlying error means the path does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::NotFound
    }
}

/// Extension trait for Result types to add file operation context
pub trait FileResultExt<T> {
    /// Add file operation context to a Result
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|source| FileOperationError {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            source,
        })
    }
}

/// Read a UTF-8 file, returning `Ok(None)` when it does not exist.
pub async fn read_optional(path: &Path, purpose: &str) -> Result<Option<String>, FileOperationError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_file_context(FileOperation::Read, path, purpose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_file_result_ext() {
        let result: Result<String, Error> = Err(Error::new(ErrorKind::PermissionDenied, "denied"));
        let err = result
            .with_file_context(FileOperation::Read, "packs/a/manifest.json", "loading manifest")
            .unwrap_err();

        assert_eq!(err.operation, FileOperation::Read);
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Failed reading 'packs/a/manifest.json' (loading manifest)"
        );
    }

    #[tokio::test]
    async fn test_read_optional_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(read_optional(&missing, "test").await.unwrap().is_none());

        std::fs::write(dir.path().join("yes.txt"), "hi").unwrap();
        let found = read_optional(&dir.path().join("yes.txt"), "test").await.unwrap();
        assert_eq!(found.as_deref(), Some("hi"));
    }
}
