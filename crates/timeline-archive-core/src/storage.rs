//! Byte fetching for timeline instant files.
//!
//! This module is the IO boundary of the crate. The conversion logic never
//! touches storage directly; it receives bytes through an
//! [`crate::timeline::InstantReader`], and the readers shipped here delegate
//! to the helpers below.
//!
//! Only the local filesystem is supported, but callers interact through
//! [`TableLocation`] so other backends can be added without touching the
//! conversion code.

use snafu::{Backtrace, IntoError, prelude::*};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Result of reading instant bytes.
pub type StorageResult<T> = Result<T, StorageError>;

/// Where a table's timeline lives.
#[derive(Clone, Debug)]
pub enum TableLocation {
    /// A table rooted at a local directory.
    Local(PathBuf),
}

impl TableLocation {
    /// A table rooted at the local directory `root`.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        TableLocation::Local(root.into())
    }

    /// Absolute path of `rel` under the table root.
    pub fn resolve(&self, rel: &Path) -> PathBuf {
        match self {
            TableLocation::Local(root) => root.join(rel),
        }
    }
}

/// Failures to fetch the bytes of an instant.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    /// No instant file exists at the path.
    #[snafu(display("Instant file not found: {path}"))]
    NotFound {
        /// Path of the missing file.
        path: String,
        /// The filesystem error.
        source: io::Error,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// The instant file exists but could not be read.
    #[snafu(display("Failed to read instant file {path}: {source}"))]
    OtherIo {
        /// Path of the unreadable file.
        path: String,
        /// The filesystem error.
        source: io::Error,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },

    /// An in-memory timeline holds no bytes for the instant.
    #[snafu(display("No bytes recorded for instant {instant}"))]
    MissingInstant {
        /// Display form of the instant that was requested.
        instant: String,
        /// Backtrace for debugging.
        backtrace: Backtrace,
    },
}

/// Read the whole instant file at `rel_path` under `location`.
///
/// A zero-length file is returned as empty bytes; deciding what an empty
/// body means is left to the caller.
pub async fn read_all_bytes(location: &TableLocation, rel_path: &Path) -> StorageResult<Vec<u8>> {
    let abs = location.resolve(rel_path);
    let path = abs.display().to_string();

    fs::read(&abs).await.map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            NotFoundSnafu { path }.into_error(source)
        } else {
            OtherIoSnafu { path }.into_error(source)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn read_all_bytes_returns_file_contents() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());
        let rel_path = Path::new("001.commit");

        tokio::fs::write(tmp.path().join(rel_path), b"{}").await?;

        let bytes = read_all_bytes(&location, rel_path).await?;
        assert_eq!(bytes, b"{}");
        Ok(())
    }

    #[test]
    fn location_resolves_relative_instant_paths() {
        let location = TableLocation::local("/tables/trips");

        let path = location.resolve(Path::new(".timeline/001.commit"));

        assert_eq!(path, PathBuf::from("/tables/trips/.timeline/001.commit"));
    }

    #[tokio::test]
    async fn read_all_bytes_returns_empty_for_empty_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());
        let rel_path = Path::new("002.commit");

        tokio::fs::write(tmp.path().join(rel_path), b"").await?;

        let bytes = read_all_bytes(&location, rel_path).await?;
        assert!(bytes.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn read_all_bytes_returns_not_found_for_missing_file() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());

        let result = read_all_bytes(&location, Path::new("missing.commit")).await;

        let err = result.expect_err("expected NotFound error");
        assert!(matches!(err, StorageError::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn read_all_bytes_reports_directories_as_other_io() -> TestResult {
        let tmp = TempDir::new()?;
        let location = TableLocation::local(tmp.path());
        tokio::fs::create_dir_all(tmp.path().join("nested")).await?;

        let result = read_all_bytes(&location, Path::new("nested")).await;

        let err = result.expect_err("reading a directory fails");
        assert!(matches!(err, StorageError::OtherIo { .. }));
        Ok(())
    }
}
