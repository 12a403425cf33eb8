// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! SQL schema for the Railyard snapshot.

/// Base tables. Every statement is idempotent so the batch can run on each
/// boot against both fresh and existing snapshots.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS routes (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT '',
    version INTEGER NOT NULL DEFAULT 3
);

CREATE TABLE IF NOT EXISTS trains (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS route_trains (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    route_id INTEGER NOT NULL REFERENCES routes(id) ON DELETE CASCADE,
    train_id INTEGER NOT NULL REFERENCES trains(id) ON DELETE CASCADE,
    UNIQUE (route_id, train_id)
);

CREATE TABLE IF NOT EXISTS timetables (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    service_name TEXT NOT NULL,
    route_id     INTEGER REFERENCES routes(id) ON DELETE SET NULL,
    train_id     INTEGER REFERENCES trains(id) ON DELETE SET NULL,
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS timetable_entries (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    timetable_id INTEGER NOT NULL REFERENCES timetables(id) ON DELETE CASCADE,
    action       TEXT NOT NULL DEFAULT '',
    details      TEXT NOT NULL DEFAULT '',
    location     TEXT NOT NULL DEFAULT '',
    platform     TEXT NOT NULL DEFAULT '',
    time1        TEXT NOT NULL DEFAULT '',
    time2        TEXT NOT NULL DEFAULT '',
    latitude     TEXT NOT NULL DEFAULT '',
    longitude    TEXT NOT NULL DEFAULT '',
    sort_order   INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_timetable_entries_order
    ON timetable_entries(timetable_id, sort_order);

CREATE INDEX IF NOT EXISTS idx_route_trains_train
    ON route_trains(train_id);
"#;

/// A column that was introduced after the first released schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditiveColumn {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

/// Columns added to tables after their first release, applied in order.
///
/// Definitions must be accepted by `ALTER TABLE ... ADD COLUMN` on a
/// populated table: constant defaults only, and `REFERENCES` columns must
/// default to NULL.
pub const ADDITIVE_COLUMNS: &[AdditiveColumn] = &[
    AdditiveColumn {
        table: "timetable_entries",
        column: "latitude",
        definition: "TEXT NOT NULL DEFAULT ''",
    },
    AdditiveColumn {
        table: "timetable_entries",
        column: "longitude",
        definition: "TEXT NOT NULL DEFAULT ''",
    },
    AdditiveColumn {
        table: "routes",
        column: "version",
        definition: "INTEGER NOT NULL DEFAULT 3",
    },
    AdditiveColumn {
        table: "timetables",
        column: "route_id",
        definition: "INTEGER REFERENCES routes(id) ON DELETE SET NULL",
    },
    AdditiveColumn {
        table: "timetables",
        column: "train_id",
        definition: "INTEGER REFERENCES trains(id) ON DELETE SET NULL",
    },
];
