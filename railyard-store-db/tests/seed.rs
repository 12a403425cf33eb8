// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Seeding tests against the fixture files in `tests/fixtures/seed`.

use std::fs;
use std::path::{Path, PathBuf};

use railyard_store_db::{
    Error, LINKS_FILE, ROUTES_FILE, RouteFields, SeedOutcome, SnapshotStore, TRAINS_FILE,
};
use rstest::rstest;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/seed")
}

fn copy_fixtures(to: &Path, except: Option<&str>) {
    for name in [TRAINS_FILE, ROUTES_FILE, LINKS_FILE] {
        if Some(name) != except {
            fs::copy(fixture_dir().join(name), to.join(name)).unwrap();
        }
    }
}

#[test]
fn seeds_in_dependency_order() {
    let store = SnapshotStore::open_memory().unwrap();

    let outcome = store.seed_from_dir(fixture_dir()).unwrap();
    // The duplicate link in the fixture is ignored.
    assert_eq!(
        outcome,
        SeedOutcome::Seeded {
            trains: 3,
            routes: 2,
            links: 4
        }
    );

    let counts = store.table_counts().unwrap();
    assert_eq!(counts.trains, 3);
    assert_eq!(counts.routes, 2);
    assert_eq!(counts.route_trains, 3);

    let wcml = store.get_route(1).unwrap().unwrap();
    assert_eq!(wcml.version, 3);
    assert_eq!(store.get_route(2).unwrap().unwrap().version, 2);

    let names: Vec<_> = store
        .route_trains(1)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["Class 350 Desiro", "Class 390 Pendolino"]);
}

#[test]
fn seeding_twice_changes_nothing() {
    let store = SnapshotStore::open_memory().unwrap();
    store.seed_from_dir(fixture_dir()).unwrap();
    let before = store.table_counts().unwrap();

    assert_eq!(
        store.seed_from_dir(fixture_dir()).unwrap(),
        SeedOutcome::AlreadyPopulated
    );
    assert_eq!(store.table_counts().unwrap(), before);
}

#[test]
fn existing_routes_block_seeding() {
    let store = SnapshotStore::open_memory().unwrap();
    store
        .create_route(&RouteFields {
            name: "Cajon Pass".into(),
            country: "US".into(),
            version: None,
        })
        .unwrap();

    assert_eq!(
        store.seed_from_dir(fixture_dir()).unwrap(),
        SeedOutcome::AlreadyPopulated
    );
    assert_eq!(store.table_counts().unwrap().trains, 0);
}

#[rstest]
#[case(TRAINS_FILE)]
#[case(ROUTES_FILE)]
#[case(LINKS_FILE)]
fn any_missing_file_skips_everything(#[case] missing: &str) {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path(), Some(missing));

    let store = SnapshotStore::open_memory().unwrap();
    assert_eq!(
        store.seed_from_dir(dir.path()).unwrap(),
        SeedOutcome::MissingFiles
    );
    assert_eq!(store.table_counts().unwrap(), Default::default());
}

#[test]
fn unparsable_file_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path(), None);
    fs::write(dir.path().join(LINKS_FILE), "[{\"route_id\": 1}]").unwrap();

    let store = SnapshotStore::open_memory().unwrap();
    match store.seed_from_dir(dir.path()) {
        Err(Error::Seed { path, .. }) => assert!(path.ends_with(LINKS_FILE)),
        other => panic!("expected seed error, got {other:?}"),
    }
    assert_eq!(store.table_counts().unwrap(), Default::default());
}

#[test]
fn existing_trains_are_reused() {
    let store = SnapshotStore::open_memory().unwrap();
    let own = store.create_train("My own train").unwrap();
    let pendolino = store.create_train("Class 390 Pendolino").unwrap();

    assert!(matches!(
        store.seed_from_dir(fixture_dir()).unwrap(),
        SeedOutcome::Seeded { .. }
    ));

    let counts = store.table_counts().unwrap();
    assert_eq!(counts.trains, 4);
    assert_eq!(counts.routes, 2);
    assert_eq!(counts.route_trains, 3);
    assert_eq!(store.get_train(own).unwrap().unwrap().name, "My own train");

    let wcml = store
        .list_routes()
        .unwrap()
        .into_iter()
        .find(|r| r.name == "WCML South")
        .unwrap();
    let linked: Vec<_> = store
        .route_trains(wcml.id)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert!(linked.contains(&pendolino));
    assert!(!linked.contains(&own));
}

#[test]
fn dangling_link_rolls_back_everything() {
    let dir = tempfile::tempdir().unwrap();
    copy_fixtures(dir.path(), Some(LINKS_FILE));
    fs::write(
        dir.path().join(LINKS_FILE),
        r#"[{"route_id": 1, "train_id": 1}, {"route_id": 1, "train_id": 99}]"#,
    )
    .unwrap();

    let snapshot = tempfile::tempdir().unwrap();
    let path = snapshot.path().join("railyard.db");
    let store = SnapshotStore::open(&path).unwrap();
    match store.seed_from_dir(dir.path()) {
        Err(Error::Seed { path, .. }) => assert!(path.ends_with(LINKS_FILE)),
        other => panic!("expected seed error, got {other:?}"),
    }
    assert_eq!(store.table_counts().unwrap(), Default::default());
    drop(store);

    // Nothing reached disk either, so a fixed file seeds on the next boot.
    let store = SnapshotStore::open(&path).unwrap();
    assert_eq!(store.table_counts().unwrap(), Default::default());
    assert!(matches!(
        store.seed_from_dir(fixture_dir()).unwrap(),
        SeedOutcome::Seeded { .. }
    ));
}
