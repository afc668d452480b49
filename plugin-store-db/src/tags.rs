// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Tag resolution.

use std::collections::HashSet;

use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::Result;
use crate::lock::WriteGuard;
use crate::types::Tag;

/// Resolve tag names to Tag rows, inserting the ones that don't exist yet.
///
/// Existing tags come first in ID order, followed by the newly created ones
/// in request order. A name repeated in `names` is returned once.
///
/// The caller must hold the catalog write lock for as long as the enclosing
/// transaction is open; that is what keeps two writers from creating the same
/// tag. Insert failures are returned as-is and the enclosing savepoint is
/// expected to roll them back.
pub fn resolve(conn: &Connection, _guard: &WriteGuard<'_>, names: &[String]) -> Result<Vec<Tag>> {
    let mut seen = HashSet::with_capacity(names.len());
    let requested: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect();

    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; requested.len()].join(", ");
    let mut stmt = conn.prepare(&format!(
        "SELECT id, tag FROM Tags WHERE tag IN ({placeholders}) ORDER BY id"
    ))?;
    let mut tags = stmt
        .query_map(params_from_iter(requested.iter()), |row| {
            Ok(Tag {
                id: row.get(0)?,
                tag: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let existing: HashSet<String> = tags.iter().map(|t| t.tag.clone()).collect();
    let mut insert = conn.prepare_cached("INSERT INTO Tags (tag) VALUES (?1)")?;
    for name in requested {
        if existing.contains(name) {
            continue;
        }
        insert.execute([name])?;
        let id = conn.last_insert_rowid();
        debug!("Created tag '{name}' ({id})");
        tags.push(Tag {
            id,
            tag: name.to_owned(),
        });
    }

    Ok(tags)
}
