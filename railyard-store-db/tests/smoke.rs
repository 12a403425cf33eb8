// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Smoke tests for railyard-store-db.
//!
//! These tests exercise the repositories against an in-memory store.

use railyard_store_db::{
    EntryFields, Error, NewTimetable, RouteFields, SnapshotStore, TimetableFields,
};

fn route(name: &str) -> RouteFields {
    RouteFields {
        name: name.into(),
        country: "GB".into(),
        version: None,
    }
}

fn entry(action: &str, location: &str) -> EntryFields {
    EntryFields {
        action: action.into(),
        location: Some(location.into()),
        ..Default::default()
    }
}

/// Verify route CRUD and the default version tag.
#[test]
fn test_route_roundtrip() {
    let store = SnapshotStore::open_memory().unwrap();

    let first = store.create_route(&route("Northern Trans-Pennine")).unwrap();
    let second = store.create_route(&route("East Coast Main Line")).unwrap();
    assert!(second > first);

    let listed: Vec<_> = store.list_routes().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(listed, [second, first]);

    let fetched = store.get_route(first).unwrap().unwrap();
    assert_eq!(fetched.name, "Northern Trans-Pennine");
    assert_eq!(fetched.version, 3);

    let edited = RouteFields {
        version: Some(4),
        ..route("Northern Trans-Pennine 2")
    };
    assert!(store.update_route(first, &edited).unwrap());
    assert_eq!(store.get_route(first).unwrap().unwrap().version, 4);

    assert!(store.delete_route(first).unwrap());
    assert!(!store.delete_route(first).unwrap());
    assert!(store.get_route(first).unwrap().is_none());
    assert!(!store.update_route(first, &edited).unwrap());
}

/// A second train with the same name is rejected.
#[test]
fn test_duplicate_train_name() {
    let store = SnapshotStore::open_memory().unwrap();
    store.create_train("Class 66").unwrap();

    let err = store.create_train("Class 66").unwrap_err();
    assert!(
        matches!(err, Error::UniqueConstraintViolation { .. }),
        "{err:?}"
    );
    assert_eq!(store.list_trains().unwrap().len(), 1);
}

/// Reusing a train id is reported like any other uniqueness clash.
#[test]
fn test_duplicate_train_id() {
    let store = SnapshotStore::open_memory().unwrap();
    let id = store.create_train("Class 91").unwrap();

    let err = store
        .insert(
            "INSERT INTO trains (id, name) VALUES (?1, ?2)",
            rusqlite::params![id, "Class 92"],
        )
        .unwrap_err();
    assert!(
        matches!(err, Error::UniqueConstraintViolation { .. }),
        "{err:?}"
    );
}

/// Linking twice leaves one link.
#[test]
fn test_link_is_idempotent() {
    let store = SnapshotStore::open_memory().unwrap();
    let route_id = store.create_route(&route("Cathcart Circle")).unwrap();
    let train_id = store.create_train("Class 380").unwrap();

    assert!(store.add_route_train(route_id, train_id).unwrap());
    assert!(!store.add_route_train(route_id, train_id).unwrap());
    assert_eq!(store.route_train_links().unwrap().len(), 1);

    assert_eq!(store.train_routes(train_id).unwrap()[0].id, route_id);
    assert!(store.remove_route_train(route_id, train_id).unwrap());
    assert!(!store.remove_route_train(route_id, train_id).unwrap());
}

/// Linking to a train that does not exist is a reference error.
#[test]
fn test_link_to_missing_train() {
    let store = SnapshotStore::open_memory().unwrap();
    let route_id = store.create_route(&route("Cathcart Circle")).unwrap();

    let err = store.add_route_train(route_id, 999).unwrap_err();
    assert!(matches!(err, Error::MissingReference { .. }), "{err:?}");
}

/// Deleting a timetable removes its entries; deleting a route or train
/// only detaches timetables.
#[test]
fn test_cascades() {
    let store = SnapshotStore::open_memory().unwrap();
    let route_id = store.create_route(&route("Bakerloo")).unwrap();
    let train_id = store.create_train("1972 Stock").unwrap();
    store.add_route_train(route_id, train_id).unwrap();

    let created = store
        .create_timetable(&NewTimetable {
            header: TimetableFields {
                service_name: "1A23 Elephant & Castle".into(),
                route_id: Some(route_id),
                train_id: Some(train_id),
            },
            entries: vec![
                entry("Depart", "Harrow"),
                entry("Stop", "Baker Street"),
                entry("Arrive", "Elephant & Castle"),
            ],
        })
        .unwrap();
    assert!(created.is_complete());
    let id = created.timetable.id;
    assert_eq!(store.table_counts().unwrap().timetable_entries, 3);

    assert!(store.delete_train(train_id).unwrap());
    assert!(store.route_trains(route_id).unwrap().is_empty());
    assert_eq!(store.get_timetable(id).unwrap().unwrap().train_id, None);

    assert!(store.delete_route(route_id).unwrap());
    let orphan = store.get_timetable(id).unwrap().unwrap();
    assert_eq!(orphan.route_id, None);

    assert!(store.delete_timetable(id).unwrap());
    assert!(store.timetable_entries(id).unwrap().is_empty());
    assert_eq!(store.table_counts().unwrap().timetable_entries, 0);
}

/// Entries keep submission order and gaps survive deletes.
#[test]
fn test_entry_ordering() {
    let store = SnapshotStore::open_memory().unwrap();
    let created = store
        .create_timetable(&NewTimetable {
            header: TimetableFields {
                service_name: "2K14".into(),
                ..Default::default()
            },
            entries: vec![
                entry("Depart", "Leeds"),
                entry("Stop", "Huddersfield"),
                entry("Arrive", "Manchester Victoria"),
            ],
        })
        .unwrap();
    let id = created.timetable.id;
    let orders: Vec<_> = created.entries.iter().map(|e| e.sort_order).collect();
    assert_eq!(orders, [0, 1, 2]);

    assert!(store.delete_entry(created.entries[1].id).unwrap());
    let appended = store.add_entry(id, &entry("Stop", "Rochdale")).unwrap();
    assert_eq!(appended.sort_order, 3);

    let locations: Vec<_> = store
        .timetable_entries(id)
        .unwrap()
        .into_iter()
        .map(|e| e.fields.location.unwrap())
        .collect();
    assert_eq!(locations, ["Leeds", "Manchester Victoria", "Rochdale"]);

    let edited = EntryFields {
        platform: Some("3".into()),
        ..entry("Arrive", "Manchester Victoria")
    };
    assert!(store.update_entry(created.entries[2].id, &edited).unwrap());
    let stored = store.get_entry(created.entries[2].id).unwrap().unwrap();
    assert_eq!(stored.sort_order, 2);
    assert_eq!(stored.fields, edited);
}

/// An entry failure after the header keeps what was written.
#[test]
fn test_interrupted_compound_create() {
    let store = SnapshotStore::open_memory().unwrap();
    // Reject the second entry from inside SQLite.
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_bad_entry BEFORE INSERT ON timetable_entries
             WHEN NEW.action = 'bad'
             BEGIN SELECT RAISE(ABORT, 'rejected entry'); END;",
        )
        .unwrap();

    let created = store
        .create_timetable(&NewTimetable {
            header: TimetableFields {
                service_name: "5Z99".into(),
                ..Default::default()
            },
            entries: vec![
                entry("Depart", "York"),
                entry("bad", "Nowhere"),
                entry("Arrive", "Scarborough"),
            ],
        })
        .unwrap();

    assert!(!created.is_complete());
    assert_eq!(created.submitted, 3);
    assert_eq!(created.entries.len(), 1);
    assert!(created.interrupted.is_some());

    let detail = store
        .timetable_detail(created.timetable.id)
        .unwrap()
        .unwrap();
    assert_eq!(detail.entries, created.entries);
}

/// Absent optional fields are read back as `None`.
#[test]
fn test_sparse_entry_fields() {
    let store = SnapshotStore::open_memory().unwrap();
    let created = store
        .create_timetable(&NewTimetable {
            header: TimetableFields {
                service_name: "1S01".into(),
                ..Default::default()
            },
            entries: vec![EntryFields {
                action: "Pass".into(),
                details: Some(String::new()),
                ..Default::default()
            }],
        })
        .unwrap();

    let fields = &created.entries[0].fields;
    assert_eq!(fields.details, None);
    assert_eq!(fields.latitude, None);
    assert_eq!(fields.action, "Pass");
}
