//! The Loader: read → project → replace → index, in one pass.
//!
//! The source spreadsheet is staged into an in-memory DuckDB table, the
//! fixed peak column set is resolved against its headers, and the projected
//! rows replace the `peaks` table in the persistent store.

mod columns;
mod error;
mod source;
mod store;

pub use columns::{resolve_bindings, ColumnBinding};
pub use error::LoaderError;
pub use source::{detect_source_kind, find_worksheet_part, SourceKind};
pub use store::{ensure_index, COORD_INDEX, PEAK_TABLE};

use std::io;
use std::path::{Path, PathBuf};

use duckdb::Connection;
use log::info;

/// Single-run loader over one source file and one destination store.
pub struct PeakLoader {
    source_path: PathBuf,
    store_path: PathBuf,
    source_kind: SourceKind,
    conn: Connection,
}

impl PeakLoader {
    /// Detect the source format and open the staging connection.
    pub fn open(source_path: &Path, store_path: &Path) -> Result<Self, LoaderError> {
        let source_kind = source::detect_source_kind(source_path)?;
        let conn = Connection::open_in_memory()?;

        Ok(Self {
            source_path: source_path.to_path_buf(),
            store_path: store_path.to_path_buf(),
            source_kind,
            conn,
        })
    }

    /// Run the four steps in order.
    ///
    /// Fails fast: a missing source column is reported before the
    /// destination store is opened or created, so a failing run leaves no
    /// partial table behind.
    pub fn run(&self) -> Result<(), LoaderError> {
        info!(
            "loading {} source {}",
            self.source_kind,
            self.source_path.display()
        );
        let staged = source::stage_source(&self.conn, &self.source_path, self.source_kind)?;
        info!("staged {staged} rows");

        let headers = columns::staged_headers(&self.conn, source::STAGING_TABLE)?;
        let bindings = columns::resolve_bindings(&headers)?;

        store::replace_table(&self.conn, &self.store_path, &bindings)?;
        store::ensure_index(&self.store_path, PEAK_TABLE, &["latitude", "longitude"])?;
        Ok(())
    }
}

/// Load a peaks spreadsheet into the store in one call.
pub fn load_peaks(source_path: &Path, store_path: &Path) -> Result<(), LoaderError> {
    PeakLoader::open(source_path, store_path)?.run()
}

// Paths are spliced into DuckDB statements as quoted string literals.
pub(crate) fn path_literal(path: &Path) -> Result<String, io::Error> {
    let text = path.to_str().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path is not valid UTF-8: {}", path.display()),
        )
    })?;
    Ok(text.replace('\'', "''"))
}
