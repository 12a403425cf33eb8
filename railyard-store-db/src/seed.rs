// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! One-time seeding of reference data from JSON files.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::params;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::connection::SnapshotStore;
use crate::error::{Error, Result};
use crate::types::DEFAULT_ROUTE_VERSION;

pub const TRAINS_FILE: &str = "trains.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const LINKS_FILE: &str = "route_trains.json";

/// What [`SnapshotStore::seed_from_dir`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded {
        trains: usize,
        routes: usize,
        links: usize,
    },
    /// The store already has routes.
    AlreadyPopulated,
    /// At least one of the three seed files does not exist.
    MissingFiles,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedTrain {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedRoute {
    id: i64,
    name: String,
    country: String,
    #[serde(default)]
    version: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedLink {
    route_id: i64,
    train_id: i64,
}

impl SnapshotStore {
    /// Populate routes, trains and their links from `dir`.
    ///
    /// Does nothing if any route exists or if any of [`TRAINS_FILE`],
    /// [`ROUTES_FILE`] and [`LINKS_FILE`] is missing. All three files are
    /// parsed before the first row is written, and the rows are written in
    /// one transaction: a failure leaves the store as it was.
    ///
    /// Trains already in the store are matched by name and reused.
    pub fn seed_from_dir<P: AsRef<Path>>(&self, dir: P) -> Result<SeedOutcome> {
        let dir = dir.as_ref();

        let routes_present: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM routes", [], |row| row.get(0))?;
        if routes_present > 0 {
            debug!("Store already has {} routes, not seeding", routes_present);
            return Ok(SeedOutcome::AlreadyPopulated);
        }

        let paths = [TRAINS_FILE, ROUTES_FILE, LINKS_FILE].map(|name| dir.join(name));
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            info!(
                "Seed file {} not found, skipping seeding",
                missing.display()
            );
            return Ok(SeedOutcome::MissingFiles);
        }
        let [trains_path, routes_path, links_path] = paths;

        let trains: Vec<SeedTrain> = read_seed_file(&trains_path)?;
        let routes: Vec<SeedRoute> = read_seed_file(&routes_path)?;
        let links: Vec<SeedLink> = read_seed_file(&links_path)?;

        let tx = self.conn.unchecked_transaction()?;

        // Seed ids only tie the three files together; rows get whatever ids
        // the store assigns.
        let mut train_ids = HashMap::with_capacity(trains.len());
        for train in &trains {
            tx.execute(
                "INSERT OR IGNORE INTO trains (name) VALUES (?1)",
                params![train.name],
            )
            .map_err(Error::from_statement)?;
            let id: i64 = tx.query_row(
                "SELECT id FROM trains WHERE name = ?1",
                params![train.name],
                |row| row.get(0),
            )?;
            train_ids.insert(train.id, id);
        }
        let mut route_ids = HashMap::with_capacity(routes.len());
        for route in &routes {
            tx.execute(
                "INSERT INTO routes (name, country, version) VALUES (?1, ?2, ?3)",
                params![
                    route.name,
                    route.country,
                    route.version.unwrap_or(DEFAULT_ROUTE_VERSION)
                ],
            )
            .map_err(Error::from_statement)?;
            route_ids.insert(route.id, tx.last_insert_rowid());
        }
        for link in &links {
            let unknown = |kind: &str, id: i64| Error::Seed {
                path: links_path.clone(),
                reason: format!("link refers to unknown {kind} {id}"),
            };
            let route_id = *route_ids
                .get(&link.route_id)
                .ok_or_else(|| unknown("route", link.route_id))?;
            let train_id = *train_ids
                .get(&link.train_id)
                .ok_or_else(|| unknown("train", link.train_id))?;
            tx.execute(
                "INSERT OR IGNORE INTO route_trains (route_id, train_id) VALUES (?1, ?2)",
                params![route_id, train_id],
            )
            .map_err(Error::from_statement)?;
        }

        tx.commit()?;
        self.persist()?;

        info!(
            "Seeded {} trains, {} routes and {} links from {}",
            trains.len(),
            routes.len(),
            links.len(),
            dir.display()
        );
        Ok(SeedOutcome::Seeded {
            trains: trains.len(),
            routes: routes.len(),
            links: links.len(),
        })
    }
}

fn read_seed_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let seed_err = |reason: String| Error::Seed {
        path: PathBuf::from(path),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e: io::Error| seed_err(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| seed_err(e.to_string()))
}
