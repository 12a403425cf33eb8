// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Schema creation and additive column migrations.

use tracing::{debug, info};

use crate::connection::SnapshotStore;
use crate::error::{Error, Result};
use crate::schema::{ADDITIVE_COLUMNS, SCHEMA_SQL};

impl SnapshotStore {
    /// Create missing tables, then add every column from
    /// [`ADDITIVE_COLUMNS`] that the image does not have yet.
    ///
    /// Safe to run any number of times. Returns the columns added by this
    /// run as `table.column`.
    pub fn migrate(&self) -> Result<Vec<String>> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        self.persist()?;
        debug!("Schema applied");

        let mut added = Vec::new();
        for column in ADDITIVE_COLUMNS {
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                column.table, column.column, column.definition
            );
            match self.conn.execute(&sql, []) {
                Ok(_) => {
                    info!("Added column {}.{}", column.table, column.column);
                    self.persist()?;
                    added.push(format!("{}.{}", column.table, column.column));
                }
                Err(e) if is_duplicate_column(&e) => {
                    debug!("Column {}.{} already present", column.table, column.column);
                }
                Err(source) => {
                    return Err(Error::Migration {
                        table: column.table,
                        column: column.column,
                        source,
                    });
                }
            }
        }
        Ok(added)
    }
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(_, Some(message))
            if message.starts_with("duplicate column name")
    )
}
