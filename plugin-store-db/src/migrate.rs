// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Schema migration runner.
//!
//! The catalog itself never creates or alters tables; it only checks the
//! version when a [`Session`](crate::Session) is opened. Run [`upgrade`]
//! (or the `plugin-store-migrate` binary) before handing a database to it.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema::{MIGRATIONS, SCHEMA_VERSION};

/// Read the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    let version = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Apply all pending migrations to `conn`.
///
/// Each migration runs in its own transaction together with the version bump,
/// so an interrupted upgrade leaves the database at the last completed
/// version. Returns the number of migrations applied.
pub fn upgrade(conn: &mut Connection) -> Result<usize> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(Error::SchemaVersionMismatch {
            expected: SCHEMA_VERSION,
            found: current,
        });
    }

    let mut applied = 0;
    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = index as i32 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        // PRAGMA does not accept bound parameters
        tx.execute_batch(&format!("PRAGMA user_version = {version}"))?;
        tx.commit()?;
        debug!("Applied schema migration {version}");
        applied += 1;
    }

    if applied > 0 {
        info!("Upgraded catalog schema from {current} to {SCHEMA_VERSION}");
    }
    Ok(applied)
}

/// Open (creating if necessary) the database at `path` and upgrade it.
pub fn upgrade_path<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let mut conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
    )
    .map_err(|e| Error::DatabaseOpen {
        path: path.to_owned(),
        source: e,
    })?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    upgrade(&mut conn)
}
