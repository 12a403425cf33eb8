// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Timetable and timetable entry repository.

use rusqlite::{Row, params};
use tracing::error;

use crate::connection::SnapshotStore;
use crate::error::{Error, Result};
use crate::types::{
    CreatedTimetable, EntryFields, NewTimetable, Timetable, TimetableDetail, TimetableEntry,
    TimetableFields, loaded, stored,
};

pub(crate) fn timetable_from_row(row: &Row<'_>) -> rusqlite::Result<Timetable> {
    Ok(Timetable {
        id: row.get(0)?,
        service_name: row.get(1)?,
        route_id: row.get(2)?,
        train_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<TimetableEntry> {
    Ok(TimetableEntry {
        id: row.get(0)?,
        timetable_id: row.get(1)?,
        sort_order: row.get(2)?,
        fields: EntryFields {
            action: row.get(3)?,
            details: loaded(row.get(4)?),
            location: loaded(row.get(5)?),
            platform: loaded(row.get(6)?),
            time1: loaded(row.get(7)?),
            time2: loaded(row.get(8)?),
            latitude: loaded(row.get(9)?),
            longitude: loaded(row.get(10)?),
        },
    })
}

const ENTRY_COLUMNS: &str = "id, timetable_id, sort_order, action, details, location, \
                             platform, time1, time2, latitude, longitude";

impl SnapshotStore {
    /// All timetables, newest first.
    pub fn list_timetables(&self) -> Result<Vec<Timetable>> {
        self.query_all(
            r#"
            SELECT id, service_name, route_id, train_id, created_at
            FROM timetables
            ORDER BY id DESC
            "#,
            [],
            timetable_from_row,
        )
    }

    pub fn get_timetable(&self, id: i64) -> Result<Option<Timetable>> {
        self.query_row_opt(
            r#"
            SELECT id, service_name, route_id, train_id, created_at
            FROM timetables
            WHERE id = ?1
            "#,
            params![id],
            timetable_from_row,
        )
    }

    /// A timetable with its entries in display order.
    pub fn timetable_detail(&self, id: i64) -> Result<Option<TimetableDetail>> {
        let Some(timetable) = self.get_timetable(id)? else {
            return Ok(None);
        };
        let entries = self.timetable_entries(id)?;
        Ok(Some(TimetableDetail { timetable, entries }))
    }

    /// Create a timetable and then its entries, one statement each.
    ///
    /// Entries get `sort_order` equal to their position in `new.entries`.
    /// This is not atomic: if an entry fails, everything written before it
    /// stays and the failure is returned in
    /// [`CreatedTimetable::interrupted`]. Only a failure to write the
    /// timetable row itself is returned as `Err`.
    pub fn create_timetable(&self, new: &NewTimetable) -> Result<CreatedTimetable> {
        let id = self.insert(
            "INSERT INTO timetables (service_name, route_id, train_id) VALUES (?1, ?2, ?3)",
            params![
                new.header.service_name,
                new.header.route_id,
                new.header.train_id
            ],
        )?;
        let timetable = self
            .get_timetable(id)?
            .ok_or(Error::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;

        let submitted = new.entries.len();
        let mut entries = Vec::with_capacity(submitted);
        let mut interrupted = None;
        for (position, fields) in new.entries.iter().enumerate() {
            match self.insert_entry(id, position as i64, fields) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    error!(
                        "Timetable {} interrupted after {} of {} entries: {}",
                        id,
                        entries.len(),
                        submitted,
                        e
                    );
                    interrupted = Some(e);
                    break;
                }
            }
        }

        Ok(CreatedTimetable {
            timetable,
            entries,
            submitted,
            interrupted,
        })
    }

    /// Replace a timetable's header fields.
    pub fn update_timetable(&self, id: i64, fields: &TimetableFields) -> Result<bool> {
        let changed = self.execute(
            "UPDATE timetables SET service_name = ?2, route_id = ?3, train_id = ?4 WHERE id = ?1",
            params![id, fields.service_name, fields.route_id, fields.train_id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a timetable and all of its entries.
    pub fn delete_timetable(&self, id: i64) -> Result<bool> {
        Ok(self.execute("DELETE FROM timetables WHERE id = ?1", params![id])? > 0)
    }

    /// Entries of a timetable by `sort_order`, then id.
    pub fn timetable_entries(&self, timetable_id: i64) -> Result<Vec<TimetableEntry>> {
        self.query_all(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM timetable_entries \
                 WHERE timetable_id = ?1 ORDER BY sort_order, id"
            ),
            params![timetable_id],
            entry_from_row,
        )
    }

    pub fn get_entry(&self, id: i64) -> Result<Option<TimetableEntry>> {
        self.query_row_opt(
            &format!("SELECT {ENTRY_COLUMNS} FROM timetable_entries WHERE id = ?1"),
            params![id],
            entry_from_row,
        )
    }

    /// Append an entry after the last one of its timetable.
    ///
    /// Orders may have gaps after deletions; the new entry gets one more
    /// than the current maximum.
    pub fn add_entry(&self, timetable_id: i64, fields: &EntryFields) -> Result<TimetableEntry> {
        let next: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM timetable_entries WHERE timetable_id = ?1",
            params![timetable_id],
            |row| row.get(0),
        )?;
        self.insert_entry(timetable_id, next, fields)
    }

    /// Replace an entry's editable fields. Its `sort_order` is kept.
    pub fn update_entry(&self, id: i64, fields: &EntryFields) -> Result<bool> {
        let changed = self.execute(
            r#"
            UPDATE timetable_entries
            SET action = ?2, details = ?3, location = ?4, platform = ?5,
                time1 = ?6, time2 = ?7, latitude = ?8, longitude = ?9
            WHERE id = ?1
            "#,
            params![
                id,
                fields.action,
                stored(&fields.details),
                stored(&fields.location),
                stored(&fields.platform),
                stored(&fields.time1),
                stored(&fields.time2),
                stored(&fields.latitude),
                stored(&fields.longitude),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete one entry. Remaining entries keep their `sort_order`.
    pub fn delete_entry(&self, id: i64) -> Result<bool> {
        Ok(self.execute("DELETE FROM timetable_entries WHERE id = ?1", params![id])? > 0)
    }

    fn insert_entry(
        &self,
        timetable_id: i64,
        sort_order: i64,
        fields: &EntryFields,
    ) -> Result<TimetableEntry> {
        let id = self.insert(
            r#"
            INSERT INTO timetable_entries
                (timetable_id, action, details, location, platform,
                 time1, time2, latitude, longitude, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                timetable_id,
                fields.action,
                stored(&fields.details),
                stored(&fields.location),
                stored(&fields.platform),
                stored(&fields.time1),
                stored(&fields.time2),
                stored(&fields.latitude),
                stored(&fields.longitude),
                sort_order,
            ],
        )?;
        self.get_entry(id)?
            .ok_or(Error::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }
}
