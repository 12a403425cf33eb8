// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Train repository.

use rusqlite::{Row, params};

use crate::connection::SnapshotStore;
use crate::error::Result;
use crate::routes::route_from_row;
use crate::types::{Route, Train};

pub(crate) fn train_from_row(row: &Row<'_>) -> rusqlite::Result<Train> {
    Ok(Train {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

impl SnapshotStore {
    /// All trains, by name.
    pub fn list_trains(&self) -> Result<Vec<Train>> {
        self.query_all(
            "SELECT id, name FROM trains ORDER BY name",
            [],
            train_from_row,
        )
    }

    pub fn get_train(&self, id: i64) -> Result<Option<Train>> {
        self.query_row_opt(
            "SELECT id, name FROM trains WHERE id = ?1",
            params![id],
            train_from_row,
        )
    }

    pub fn find_train(&self, name: &str) -> Result<Option<Train>> {
        self.query_row_opt(
            "SELECT id, name FROM trains WHERE name = ?1",
            params![name],
            train_from_row,
        )
    }

    /// Create a train and return its id.
    ///
    /// Fails with [`UniqueConstraintViolation`](crate::Error::UniqueConstraintViolation)
    /// if the name is taken.
    pub fn create_train(&self, name: &str) -> Result<i64> {
        self.insert("INSERT INTO trains (name) VALUES (?1)", params![name])
    }

    pub fn update_train(&self, id: i64, name: &str) -> Result<bool> {
        let changed = self.execute(
            "UPDATE trains SET name = ?2 WHERE id = ?1",
            params![id, name],
        )?;
        Ok(changed > 0)
    }

    /// Delete a train. Its route links go with it; timetables that named it
    /// keep existing with no train.
    pub fn delete_train(&self, id: i64) -> Result<bool> {
        Ok(self.execute("DELETE FROM trains WHERE id = ?1", params![id])? > 0)
    }

    /// Routes a train is linked to, by name.
    pub fn train_routes(&self, train_id: i64) -> Result<Vec<Route>> {
        self.query_all(
            r#"
            SELECT r.id, r.name, r.country, r.version
            FROM routes r
            JOIN route_trains rt ON rt.route_id = r.id
            WHERE rt.train_id = ?1
            ORDER BY r.name
            "#,
            params![train_id],
            route_from_row,
        )
    }
}
