//! SQLite schema for listable resources
//!
//! One table per resource type:
//! - races: race listings grouped by meeting
//! - sports: sporting events grouped by meeting

use rusqlite::{Connection, Result};

use super::resource::TableShape;

/// Create the resource table if it doesn't exist
pub fn create_table(conn: &Connection, shape: &TableShape) -> Result<()> {
    conn.execute(
        &format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY,
                {grouping} INTEGER NOT NULL,
                name TEXT NOT NULL,
                number INTEGER NOT NULL,
                visible INTEGER NOT NULL DEFAULT 0,
                advertised_start_time TEXT NOT NULL
            )
            "#,
            table = shape.table,
            grouping = shape.grouping_column,
        ),
        [],
    )?;

    conn.execute(
        &format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_{grouping} ON {table}({grouping})",
            table = shape.table,
            grouping = shape.grouping_column,
        ),
        [],
    )?;

    Ok(())
}
