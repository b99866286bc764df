use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures surfaced by the loader, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The source file is missing, unreadable, or not a spreadsheet.
    #[error("failed to read source `{}`: {reason}", .path.display())]
    SourceRead { path: PathBuf, reason: String },

    /// A required source column is absent from the spreadsheet.
    #[error("source is missing required column `{column}`")]
    SchemaMismatch { column: String },

    /// The destination store rejected an operation.
    #[error("store error: {0}")]
    Store(#[from] duckdb::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoaderError {
    pub(crate) fn source_read(path: &Path, reason: impl Into<String>) -> Self {
        LoaderError::SourceRead {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
