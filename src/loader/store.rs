use std::path::Path;

use duckdb::Connection;
use log::info;

use crate::loader::columns::{projection_sql, ColumnBinding};
use crate::loader::error::LoaderError;
use crate::loader::path_literal;
use crate::loader::source::STAGING_TABLE;

/// Destination table name.
pub const PEAK_TABLE: &str = "peaks";

/// Secondary index over the coordinate columns.
pub const COORD_INDEX: &str = "idx_lat_lon";

/// Replace the store's peaks table with the projected staging rows.
///
/// The store is attached for the duration of the call. Dropping and
/// recreating the table makes repeated runs land on identical contents.
pub(crate) fn replace_table(
    conn: &Connection,
    store_path: &Path,
    bindings: &[ColumnBinding],
) -> Result<(), LoaderError> {
    let store = path_literal(store_path)?;
    conn.execute_batch(&format!("ATTACH '{store}' AS dest; USE dest;"))?;

    let result = conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {PEAK_TABLE};
         CREATE TABLE {PEAK_TABLE} AS SELECT {} FROM memory.{STAGING_TABLE};",
        projection_sql(bindings),
    ));

    // Detach even when table creation failed so the connection stays usable
    conn.execute_batch("USE memory; DETACH dest;")?;
    result?;

    info!(
        "replaced table {PEAK_TABLE} in {}",
        store_path.display()
    );
    Ok(())
}

/// Create an index on the given columns if the store does not already have
/// it; no-op otherwise.
pub fn ensure_index(
    store_path: &Path,
    table: &str,
    columns: &[&str],
) -> Result<(), LoaderError> {
    let conn = Connection::open(store_path)?;
    conn.execute_batch(&format!(
        "CREATE INDEX IF NOT EXISTS {COORD_INDEX} ON {table} ({});",
        columns.join(", ")
    ))?;

    info!("index {COORD_INDEX} present on {table} ({})", columns.join(", "));
    Ok(())
}
