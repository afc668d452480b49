// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Cascading artifact deletion.

use rusqlite::params;
use tracing::debug;

use crate::catalog::Catalog;
use crate::connection::Session;
use crate::error::Result;

impl Catalog {
    /// Delete an artifact with its tag associations and versions.
    ///
    /// Children are removed before the artifact row, all in one transaction
    /// that commits once at the end. Tag rows are left in place even if no
    /// artifact references them any more.
    ///
    /// Returns `false` if there was no artifact with this ID.
    pub fn delete(&self, session: &mut Session, id: i64) -> Result<bool> {
        let tx = session.conn.transaction()?;

        let links = tx.execute("DELETE FROM PluginTags WHERE artifact = ?1", params![id])?;
        let versions = tx.execute("DELETE FROM Versions WHERE artifact = ?1", params![id])?;
        let rows = tx.execute("DELETE FROM Artifacts WHERE id = ?1", params![id])?;

        tx.commit()?;
        debug!("Deleted artifact {id} ({links} tag link(s), {versions} version(s))");
        Ok(rows > 0)
    }
}
