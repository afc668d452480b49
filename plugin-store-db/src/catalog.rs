// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! The catalog handle.

use tracing::debug;

use crate::connection::Session;
use crate::error::Result;
use crate::lock::WriteLock;
use crate::tags;
use crate::types::Tag;

/// Entry point for catalog reads and writes.
///
/// A `Catalog` owns the write lock that serializes all writers. Create one per
/// database per process and clone it into every thread or task; each of them
/// brings its own [`Session`].
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    lock: WriteLock,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog around an existing lock.
    pub fn with_lock(lock: WriteLock) -> Self {
        Self { lock }
    }

    /// The lock serializing this catalog's writers.
    pub fn write_lock(&self) -> &WriteLock {
        &self.lock
    }

    /// Resolve tag names to Tag rows, creating the missing ones.
    ///
    /// Runs under the write lock in its own transaction.
    pub fn resolve_tags(&self, session: &mut Session, names: &[String]) -> Result<Vec<Tag>> {
        let guard = self.lock.acquire();
        let resolved = session.with_transaction(|conn| tags::resolve(conn, &guard, names))?;
        debug!("Resolved {} tag(s)", resolved.len());
        Ok(resolved)
    }
}
