// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Row types for routes, trains and timetables.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Version tag given to routes created without one.
pub const DEFAULT_ROUTE_VERSION: i64 = 3;

/// A railway route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub version: i64,
}

/// Writable fields of a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteFields {
    pub name: String,
    pub country: String,
    /// Defaults to [`DEFAULT_ROUTE_VERSION`] when absent.
    #[serde(default)]
    pub version: Option<i64>,
}

/// A train class. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub id: i64,
    pub name: String,
}

/// Link between a route and a train that runs on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTrain {
    pub id: i64,
    pub route_id: i64,
    pub train_id: i64,
}

/// A timetable header.
///
/// `route_id` and `train_id` become `None` when the referenced row is
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub id: i64,
    pub service_name: String,
    pub route_id: Option<i64>,
    pub train_id: Option<i64>,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, assigned by the database.
    pub created_at: String,
}

/// Writable fields of a timetable header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableFields {
    pub service_name: String,
    #[serde(default)]
    pub route_id: Option<i64>,
    #[serde(default)]
    pub train_id: Option<i64>,
}

/// Writable fields of one timetable row.
///
/// Absent optional fields are stored as empty text and read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub time1: Option<String>,
    #[serde(default)]
    pub time2: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
}

/// A stored timetable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: i64,
    pub timetable_id: i64,
    pub sort_order: i64,
    #[serde(flatten)]
    pub fields: EntryFields,
}

/// A timetable header together with its rows in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableDetail {
    #[serde(flatten)]
    pub timetable: Timetable,
    pub entries: Vec<TimetableEntry>,
}

/// Input for creating a timetable and its rows in one call.
#[derive(Debug, Clone, Default)]
pub struct NewTimetable {
    pub header: TimetableFields,
    pub entries: Vec<EntryFields>,
}

/// Result of [`SnapshotStore::create_timetable`](crate::SnapshotStore::create_timetable).
///
/// The rows are written one by one. When a row fails, the header and the
/// rows before it stay stored and `interrupted` carries the error.
#[derive(Debug)]
pub struct CreatedTimetable {
    pub timetable: Timetable,
    pub entries: Vec<TimetableEntry>,
    /// Number of rows in the request.
    pub submitted: usize,
    pub interrupted: Option<Error>,
}

impl CreatedTimetable {
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none() && self.entries.len() == self.submitted
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub routes: i64,
    pub trains: i64,
    pub route_trains: i64,
    pub timetables: i64,
    pub timetable_entries: i64,
}

/// Column value for an optional text field.
pub(crate) fn stored(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Optional text field from its column value.
pub(crate) fn loaded(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
