use duckdb::Connection;

use crate::loader::error::LoaderError;

/// How a destination column finds its source header.
#[derive(Debug, Clone, Copy)]
enum HeaderRule {
    /// Header must match exactly.
    Exact(&'static str),
    /// First header whose trimmed, lowercased form starts with the prefix.
    /// The peak workbook carries an ad-hoc descriptive header for the name
    /// column, so that one is matched loosely.
    Prefix(&'static str),
}

struct ColumnDef {
    dest: &'static str,
    /// Header named in a schema-mismatch error.
    source_label: &'static str,
    rule: HeaderRule,
    sql_type: &'static str,
}

// Destination columns in table order, with the source header each one binds
// to and the type the projection pins it to.
const PEAK_COLUMNS: [ColumnDef; 6] = [
    ColumnDef {
        dest: "id",
        source_label: "ID",
        rule: HeaderRule::Exact("ID"),
        sql_type: "BIGINT",
    },
    ColumnDef {
        dest: "name",
        source_label: "Name",
        rule: HeaderRule::Prefix("name"),
        sql_type: "VARCHAR",
    },
    ColumnDef {
        dest: "latitude",
        source_label: "Latitude",
        rule: HeaderRule::Exact("Latitude"),
        sql_type: "DOUBLE",
    },
    ColumnDef {
        dest: "longitude",
        source_label: "Longitude",
        rule: HeaderRule::Exact("Longitude"),
        sql_type: "DOUBLE",
    },
    ColumnDef {
        dest: "elevation",
        source_label: "Elevation (ft)",
        rule: HeaderRule::Exact("Elevation (ft)"),
        sql_type: "DOUBLE",
    },
    ColumnDef {
        dest: "state",
        source_label: "State",
        rule: HeaderRule::Exact("State"),
        sql_type: "VARCHAR",
    },
];

/// A source header resolved to its destination column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub source: String,
    pub dest: &'static str,
    sql_type: &'static str,
}

/// Resolve the fixed column map against a source header set.
///
/// Fails with the first missing required column; unmatched source headers
/// are simply dropped.
pub fn resolve_bindings(headers: &[String]) -> Result<Vec<ColumnBinding>, LoaderError> {
    PEAK_COLUMNS
        .iter()
        .map(|def| {
            let source = match def.rule {
                HeaderRule::Exact(header) => {
                    headers.iter().find(|col| col.as_str() == header).cloned()
                }
                HeaderRule::Prefix(prefix) => headers
                    .iter()
                    .find(|col| col.trim().to_lowercase().starts_with(prefix))
                    .cloned(),
            };
            source
                .map(|source| ColumnBinding {
                    source,
                    dest: def.dest,
                    sql_type: def.sql_type,
                })
                .ok_or_else(|| LoaderError::SchemaMismatch {
                    column: def.source_label.to_string(),
                })
        })
        .collect()
}

/// Headers of a staged table, in column order.
pub(crate) fn staged_headers(conn: &Connection, table: &str) -> Result<Vec<String>, LoaderError> {
    let mut stmt = conn.prepare(
        "SELECT column_name FROM information_schema.columns
         WHERE table_name = ? ORDER BY ordinal_position;",
    )?;
    let mut rows = stmt.query(duckdb::params![table])?;

    let mut headers = Vec::new();
    while let Some(row) = rows.next()? {
        headers.push(row.get::<_, String>(0)?);
    }
    Ok(headers)
}

/// SELECT list that renames, reorders, and types the staged columns.
pub(crate) fn projection_sql(bindings: &[ColumnBinding]) -> String {
    bindings
        .iter()
        .map(|b| format!("CAST({} AS {}) AS {}", quote_ident(&b.source), b.sql_type, b.dest))
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
