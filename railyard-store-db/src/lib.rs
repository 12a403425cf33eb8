// SPDX-FileCopyrightText: 2026 Railyard contributors
// SPDX-License-Identifier: MIT

//! Snapshot-persisted relational store for Railyard.
//!
//! The whole database lives in an in-memory SQLite connection. After every
//! mutating statement the complete image is written back to a single file
//! (see [`SnapshotStore::persist`]), which is the only durability mechanism.
//!
//! # Key Features
//!
//! - Load-or-create boot from one snapshot file
//! - Additive column migrations that tolerate already-migrated files
//! - One-time seeding of routes, trains and their links from JSON files
//! - Typed repositories for routes, trains, timetables and their entries
//!
//! # Example
//!
//! ```ignore
//! use railyard_store_db::{SnapshotStore, RouteFields};
//!
//! let store = SnapshotStore::open("railyard.sqlite")?;
//! let id = store.create_route(&RouteFields {
//!     name: "WCML South".into(),
//!     country: "GB".into(),
//!     version: None,
//! })?;
//! assert_eq!(store.get_route(id)?.unwrap().version, 3);
//! ```

mod connection;
mod error;
mod migrate;
mod routes;
mod schema;
mod seed;
mod timetables;
mod trains;
mod types;

pub use connection::SnapshotStore;
pub use error::{Error, PersistError, Result};
pub use schema::{ADDITIVE_COLUMNS, AdditiveColumn, SCHEMA_SQL};
pub use seed::{LINKS_FILE, ROUTES_FILE, SeedOutcome, TRAINS_FILE};
pub use types::*;
