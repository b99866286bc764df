use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use duckdb::Connection;
use zip::ZipArchive;

use crate::loader::error::LoaderError;
use crate::loader::path_literal;

/// Name of the in-memory table the source rows are staged into.
pub(crate) const STAGING_TABLE: &str = "raw_peaks";

// Source formats are detected from file content, not extension
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SourceKind {
    Xlsx,
    Xls,
    Csv,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Xlsx => write!(f, "xlsx"),
            SourceKind::Xls => write!(f, "xls"),
            SourceKind::Csv => write!(f, "csv"),
        }
    }
}

/// Determine the source format from the file's leading bytes.
pub fn detect_source_kind(path: &Path) -> Result<SourceKind, LoaderError> {
    let mut file =
        File::open(path).map_err(|e| LoaderError::source_read(path, e.to_string()))?;
    let mut header_buffer = [0u8; 512];
    let bytes_read = file
        .read(&mut header_buffer)
        .map_err(|e| LoaderError::source_read(path, e.to_string()))?;
    let header = &header_buffer[..bytes_read];

    if let Some(kind) = match_magic_numbers(header) {
        return Ok(kind);
    }

    // No binary signature matched; the only remaining candidate is CSV text.
    let mut buffer = header.to_vec();
    file.read_to_end(&mut buffer)
        .map_err(|e| LoaderError::source_read(path, e.to_string()))?;
    match std::str::from_utf8(&buffer) {
        Ok(text) if is_valid_csv(text) => Ok(SourceKind::Csv),
        _ => Err(LoaderError::source_read(
            path,
            "unknown or unsupported source format",
        )),
    }
}

fn match_magic_numbers(buffer: &[u8]) -> Option<SourceKind> {
    match buffer {
        // PKZip signature: an xlsx workbook if Office member names show up
        [0x50, 0x4B, 0x03, 0x04, rest @ ..] => {
            let xlsx_patterns: [&[u8]; 6] = [
                b"xl/worksheets",
                b"xl/workbook",
                b"xl/_rels",
                b"xl/styles",
                b"xl/sharedStrings",
                b"[Content_Types]",
            ];

            let is_xlsx = xlsx_patterns
                .iter()
                .any(|&pattern| rest.windows(pattern.len()).any(|window| window == pattern));

            is_xlsx.then_some(SourceKind::Xlsx)
        }
        // Legacy Excel (XLS) - Compound File Binary Format
        [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, ..] => Some(SourceKind::Xls),
        _ => None,
    }
}

// The first lines must form a consistent comma-separated grid
fn is_valid_csv(content: &str) -> bool {
    let lines: Vec<&str> = content.lines().take(5).collect();

    if lines.len() < 2 {
        return false;
    }

    let first_line_fields = lines[0].split(',').count();
    first_line_fields >= 2
        && lines[1..]
            .iter()
            .all(|line| line.split(',').count() == first_line_fields)
}

/// Locate the first worksheet part inside an xlsx archive.
///
/// An xlsx that carries no worksheet is rejected here, before any database
/// work starts.
pub fn find_worksheet_part(path: &Path) -> Result<String, LoaderError> {
    let file = File::open(path).map_err(|e| LoaderError::source_read(path, e.to_string()))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| LoaderError::source_read(path, format!("not a readable xlsx archive: {e}")))?;

    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| LoaderError::source_read(path, e.to_string()))?;
        let name = entry.name();
        if name.starts_with("xl/worksheets/") && name.ends_with(".xml") {
            return Ok(name.to_string());
        }
    }

    Err(LoaderError::source_read(
        path,
        "no worksheet found in xlsx archive",
    ))
}

/// Stage every row of the source file into the staging table and return the
/// staged row count.
pub(crate) fn stage_source(
    conn: &Connection,
    path: &Path,
    kind: SourceKind,
) -> Result<usize, LoaderError> {
    let path_sql = path_literal(path)?;
    let read_expr = match kind {
        SourceKind::Xlsx => {
            find_worksheet_part(path)?;
            load_spatial(conn)?;
            format!("st_read('{path_sql}')")
        }
        SourceKind::Xls => {
            load_spatial(conn)?;
            format!("st_read('{path_sql}')")
        }
        SourceKind::Csv => format!("read_csv('{path_sql}')"),
    };

    conn.execute_batch(&format!(
        "CREATE TABLE {STAGING_TABLE} AS SELECT * FROM {read_expr};"
    ))
    .map_err(|e| LoaderError::source_read(path, e.to_string()))?;

    let rows = conn.query_row(
        &format!("SELECT count(*) FROM {STAGING_TABLE};"),
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(rows as usize)
}

// Spreadsheet reads go through the spatial extension's st_read, as for any
// other GDAL-backed format.
fn load_spatial(conn: &Connection) -> Result<(), LoaderError> {
    conn.execute_batch("INSTALL spatial; LOAD spatial;")?;
    Ok(())
}
