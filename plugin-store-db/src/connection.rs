// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Catalog sessions.
//!
//! A [`Session`] is one SQLite connection. Writes go through
//! [`Session::with_transaction`], which wraps the caller's statements in a
//! savepoint nested inside an immediate transaction.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::migrate;
use crate::schema::SCHEMA_VERSION;

/// Database open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only access
    ReadOnly,
    /// Read-write access to an existing, migrated database
    ReadWrite,
}

/// Connection-level settings applied when a session is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// How long SQLite retries before reporting `SQLITE_BUSY`
    pub busy_timeout: Duration,
    /// Enforce declared foreign keys
    pub foreign_keys: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            foreign_keys: true,
        }
    }
}

/// SQLite session over the plugin catalog.
pub struct Session {
    pub(crate) conn: Connection,
}

impl Session {
    /// Open an existing catalog database with default options.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with(path, mode, OpenOptions::default())
    }

    /// Open an existing catalog database.
    ///
    /// The schema must already be at [`SCHEMA_VERSION`]; see [`migrate`].
    pub fn open_with<P: AsRef<Path>>(
        path: P,
        mode: OpenMode,
        options: OpenOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::DatabaseNotFound(path.to_owned()));
        }

        let flags = match mode {
            OpenMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            OpenMode::ReadWrite => OpenFlags::SQLITE_OPEN_READ_WRITE,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(|e| Error::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        })?;
        let session = Self { conn };
        session.configure(&options)?;
        session.check_schema()?;

        debug!("Opened catalog session at {} ({:?})", path.display(), mode);
        Ok(session)
    }

    /// Create an in-memory catalog (for testing).
    ///
    /// The database is initialized with the full schema.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migrate::upgrade(&mut conn)?;
        let session = Self { conn };
        session.configure(&OpenOptions::default())?;
        debug!("Created in-memory catalog");
        Ok(session)
    }

    fn configure(&self, options: &OpenOptions) -> Result<()> {
        self.conn.busy_timeout(options.busy_timeout)?;
        self.conn.pragma_update(None, "foreign_keys", options.foreign_keys)?;
        Ok(())
    }

    fn check_schema(&self) -> Result<()> {
        let found = migrate::schema_version(&self.conn)?;
        if found != SCHEMA_VERSION {
            return Err(Error::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found,
            });
        }
        Ok(())
    }

    /// Run `f` inside a nested transaction scope.
    ///
    /// An immediate transaction is opened and `f` runs inside a savepoint of
    /// it. When `f` succeeds the savepoint is released and the transaction
    /// committed. When `f` fails the savepoint is rolled back, the outer
    /// transaction ends without changes and the error is returned unchanged.
    pub fn with_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut nested = tx.savepoint()?;

        match f(&nested) {
            Ok(value) => {
                nested.commit()?;
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = nested.rollback() {
                    warn!("Failed to roll back nested transaction: {rollback_err}");
                }
                // Dropping the savepoint releases it, dropping `tx` rolls back.
                Err(err)
            }
        }
    }

    /// Get raw connection (for advanced usage).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get mutable raw connection (for transactions).
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
