// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read query operations for the catalog.
//!
//! None of these take the write lock.

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::catalog::Catalog;
use crate::connection::Session;
use crate::error::Result;
use crate::types::{Artifact, SearchQuery, Tag, Version, unix_millis_to_system_time};

const ARTIFACT_COLUMNS: &str = "a.id, a.name, a.author, a.description, a.visible";

fn artifact_from_row(row: &Row<'_>) -> rusqlite::Result<Artifact> {
    Ok(Artifact {
        id: row.get(0)?,
        name: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
        visible: row.get(4)?,
        tags: Vec::new(),
        versions: Vec::new(),
    })
}

/// Escape `LIKE` wildcards so `needle` matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Fill in tags and versions of an artifact row.
fn hydrate(conn: &Connection, mut artifact: Artifact) -> Result<Artifact> {
    artifact.tags = query_tags_by_artifact(conn, artifact.id)?;
    artifact.versions = query_versions(conn, artifact.id)?;
    Ok(artifact)
}

fn query_tags_by_artifact(conn: &Connection, artifact_id: i64) -> Result<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT t.id, t.tag
        FROM PluginTags p
        JOIN Tags t ON p.tag = t.id
        WHERE p.artifact = ?1
        ORDER BY t.id
        "#,
    )?;

    let mut tags = Vec::new();
    let mut rows = stmt.query(params![artifact_id])?;
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: row.get(0)?,
            tag: row.get(1)?,
        });
    }
    Ok(tags)
}

fn query_versions(conn: &Connection, artifact_id: i64) -> Result<Vec<Version>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT id, artifact, name, hash, addedOn
        FROM Versions
        WHERE artifact = ?1
        ORDER BY id
        "#,
    )?;

    let mut versions = Vec::new();
    let mut rows = stmt.query(params![artifact_id])?;
    while let Some(row) = rows.next()? {
        versions.push(Version {
            id: row.get(0)?,
            artifact_id: row.get(1)?,
            name: row.get(2)?,
            hash: row.get(3)?,
            added_on: unix_millis_to_system_time(row.get(4)?),
        });
    }
    Ok(versions)
}

impl Catalog {
    /// Search artifacts by name substring, tags and visibility.
    ///
    /// An artifact matches the tag filter only if it carries every requested
    /// tag. Results are ordered by ID and windowed by `limit` and `page`.
    /// Returns an empty list when nothing matches.
    pub fn search(&self, session: &Session, query: &SearchQuery) -> Result<Vec<Artifact>> {
        let mut sql = format!("SELECT {ARTIFACT_COLUMNS} FROM Artifacts a WHERE 1 = 1");
        let mut args: Vec<Value> = Vec::new();

        if let Some(name) = query.name.as_deref().filter(|n| !n.is_empty()) {
            args.push(Value::Text(like_pattern(name)));
            sql.push_str(&format!(" AND a.name LIKE ?{} ESCAPE '\\'", args.len()));
        }

        for tag in &query.tags {
            args.push(Value::Text(tag.clone()));
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM PluginTags p JOIN Tags t ON p.tag = t.id \
                 WHERE p.artifact = a.id AND t.tag = ?{})",
                args.len()
            ));
        }

        if !query.include_hidden {
            sql.push_str(" AND a.visible = 1");
        }

        args.push(Value::Integer(i64::from(query.limit)));
        args.push(Value::Integer(
            i64::try_from(query.offset()).unwrap_or(i64::MAX),
        ));
        sql.push_str(&format!(
            " ORDER BY a.id LIMIT ?{} OFFSET ?{}",
            args.len() - 1,
            args.len()
        ));

        let conn = &session.conn;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), artifact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|artifact| hydrate(conn, artifact))
            .collect()
    }

    /// Look up an artifact by exact name.
    ///
    /// Names are not unique in the schema; the lowest ID wins.
    /// Returns `None` if no artifact has that name.
    pub fn get_by_name(&self, session: &Session, name: &str) -> Result<Option<Artifact>> {
        let mut stmt = session.conn.prepare_cached(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM Artifacts a WHERE a.name = ?1 ORDER BY a.id LIMIT 1"
        ))?;

        match stmt.query_row(params![name], artifact_from_row).optional()? {
            Some(artifact) => Ok(Some(hydrate(&session.conn, artifact)?)),
            None => Ok(None),
        }
    }

    /// Look up an artifact by database ID.
    ///
    /// Returns `None` if the artifact does not exist.
    pub fn get_by_id(&self, session: &Session, id: i64) -> Result<Option<Artifact>> {
        let mut stmt = session.conn.prepare_cached(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM Artifacts a WHERE a.id = ?1"
        ))?;

        match stmt.query_row(params![id], artifact_from_row).optional()? {
            Some(artifact) => Ok(Some(hydrate(&session.conn, artifact)?)),
            None => Ok(None),
        }
    }

    /// Get the versions of an artifact, oldest first.
    pub fn versions(&self, session: &Session, artifact_id: i64) -> Result<Vec<Version>> {
        query_versions(&session.conn, artifact_id)
    }

    /// Look up a tag by name.
    pub fn get_tag(&self, session: &Session, name: &str) -> Result<Option<Tag>> {
        let tag = session
            .conn
            .prepare_cached("SELECT id, tag FROM Tags WHERE tag = ?1")?
            .query_row(params![name], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    tag: row.get(1)?,
                })
            })
            .optional()?;
        Ok(tag)
    }

    /// Get all tags in the catalog, including ones no artifact uses any more.
    pub fn list_tags(&self, session: &Session) -> Result<Vec<Tag>> {
        let mut stmt = session
            .conn
            .prepare_cached("SELECT id, tag FROM Tags ORDER BY id")?;

        let mut tags = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: row.get(0)?,
                tag: row.get(1)?,
            });
        }
        Ok(tags)
    }

    /// Count the number of artifacts, hidden ones included.
    pub fn count_artifacts(&self, session: &Session) -> Result<u64> {
        let count: i64 = session
            .conn
            .query_row("SELECT COUNT(*) FROM Artifacts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
