// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite catalog for plugin store metadata.
//!
//! This crate records plugins (artifacts), their free-form tags and the
//! append-only history of published versions, and makes catalog mutation safe
//! under concurrent callers.
//!
//! **Architecture**: This is the Catalog Layer of the plugin store. Callers
//! open one [`Session`] per thread and share a single [`Catalog`] value,
//! whose [`WriteLock`] serializes every write.
//!
//! # Key Features
//!
//! - Tag deduplication under concurrent writers
//! - Artifact create/update with savepoint rollback on failure
//! - Append-only version history
//! - Visibility, name and conjunctive tag filtered search
//! - Cascading artifact deletion that leaves shared tags in place
//!
//! # Example
//!
//! ```ignore
//! use plugin_store_db::{Catalog, NewArtifact, OpenMode, SearchQuery, Session};
//!
//! let mut session = Session::open("plugins.db", OpenMode::ReadWrite)?;
//! let catalog = Catalog::new();
//!
//! let foo = catalog.create_artifact(&mut session, &NewArtifact {
//!     name: "Foo".into(),
//!     author: "alice".into(),
//!     tags: vec!["util".into(), "ui".into()],
//!     ..Default::default()
//! })?;
//!
//! let hits = catalog.search(&session, &SearchQuery::with_tags(["ui"]))?;
//! assert_eq!(hits[0].id, foo.id);
//! ```

mod catalog;
mod connection;
mod delete;
mod error;
mod lock;
pub mod migrate;
mod query;
mod schema;
mod tags;
mod types;
mod write;

pub use catalog::Catalog;
pub use connection::{OpenMode, OpenOptions, Session};
pub use error::{Error, Result};
pub use lock::{WriteGuard, WriteLock};
pub use schema::SCHEMA_VERSION;
pub use tags::resolve as resolve_tags;
pub use types::*;
