// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Route repository and route/train links.

use rusqlite::{Row, params};

use crate::connection::SnapshotStore;
use crate::error::Result;
use crate::timetables::timetable_from_row;
use crate::trains::train_from_row;
use crate::types::{DEFAULT_ROUTE_VERSION, Route, RouteFields, RouteTrain, Timetable, Train};

pub(crate) fn route_from_row(row: &Row<'_>) -> rusqlite::Result<Route> {
    Ok(Route {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        version: row.get(3)?,
    })
}

impl SnapshotStore {
    /// All routes, newest first.
    pub fn list_routes(&self) -> Result<Vec<Route>> {
        self.query_all(
            "SELECT id, name, country, version FROM routes ORDER BY id DESC",
            [],
            route_from_row,
        )
    }

    pub fn get_route(&self, id: i64) -> Result<Option<Route>> {
        self.query_row_opt(
            "SELECT id, name, country, version FROM routes WHERE id = ?1",
            params![id],
            route_from_row,
        )
    }

    /// Create a route and return its id.
    pub fn create_route(&self, fields: &RouteFields) -> Result<i64> {
        self.insert(
            "INSERT INTO routes (name, country, version) VALUES (?1, ?2, ?3)",
            params![
                fields.name,
                fields.country,
                fields.version.unwrap_or(DEFAULT_ROUTE_VERSION)
            ],
        )
    }

    /// Replace a route's fields. Returns `false` if no such route exists.
    pub fn update_route(&self, id: i64, fields: &RouteFields) -> Result<bool> {
        let changed = self.execute(
            "UPDATE routes SET name = ?2, country = ?3, version = ?4 WHERE id = ?1",
            params![
                id,
                fields.name,
                fields.country,
                fields.version.unwrap_or(DEFAULT_ROUTE_VERSION)
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a route. Its train links go with it; timetables that named it
    /// keep existing with no route.
    pub fn delete_route(&self, id: i64) -> Result<bool> {
        Ok(self.execute("DELETE FROM routes WHERE id = ?1", params![id])? > 0)
    }

    /// Trains linked to a route, by name.
    pub fn route_trains(&self, route_id: i64) -> Result<Vec<Train>> {
        self.query_all(
            r#"
            SELECT t.id, t.name
            FROM trains t
            JOIN route_trains rt ON rt.train_id = t.id
            WHERE rt.route_id = ?1
            ORDER BY t.name
            "#,
            params![route_id],
            train_from_row,
        )
    }

    /// Timetables that name a route, newest first.
    pub fn route_timetables(&self, route_id: i64) -> Result<Vec<Timetable>> {
        self.query_all(
            r#"
            SELECT id, service_name, route_id, train_id, created_at
            FROM timetables
            WHERE route_id = ?1
            ORDER BY id DESC
            "#,
            params![route_id],
            timetable_from_row,
        )
    }

    /// Link a train to a route.
    ///
    /// Linking an already linked pair is a no-op and returns `false`. A
    /// missing route or train fails with
    /// [`MissingReference`](crate::Error::MissingReference).
    pub fn add_route_train(&self, route_id: i64, train_id: i64) -> Result<bool> {
        let changed = self.execute(
            "INSERT OR IGNORE INTO route_trains (route_id, train_id) VALUES (?1, ?2)",
            params![route_id, train_id],
        )?;
        Ok(changed > 0)
    }

    /// Remove a route/train link. Returns `false` if the pair was not linked.
    pub fn remove_route_train(&self, route_id: i64, train_id: i64) -> Result<bool> {
        let changed = self.execute(
            "DELETE FROM route_trains WHERE route_id = ?1 AND train_id = ?2",
            params![route_id, train_id],
        )?;
        Ok(changed > 0)
    }

    /// Every route/train link, in insertion order.
    pub fn route_train_links(&self) -> Result<Vec<RouteTrain>> {
        self.query_all(
            "SELECT id, route_id, train_id FROM route_trains ORDER BY id",
            [],
            |row| {
                Ok(RouteTrain {
                    id: row.get(0)?,
                    route_id: row.get(1)?,
                    train_id: row.get(2)?,
                })
            },
        )
    }
}
