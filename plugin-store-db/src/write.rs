// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations for the catalog.
//!
//! Every write holds the catalog write lock from tag resolution through
//! commit and runs its statements inside [`Session::with_transaction`].

use std::time::SystemTime;

use rusqlite::{Connection, params};
use tracing::debug;

use crate::catalog::Catalog;
use crate::connection::Session;
use crate::error::{Error, Result};
use crate::tags;
use crate::types::{
    Artifact, ArtifactUpdate, NewArtifact, Tag, Version, system_time_to_unix_millis,
    unix_millis_to_system_time,
};

/// Point the artifact's PluginTags rows at exactly `tags`.
fn replace_tag_links(conn: &Connection, artifact_id: i64, tags: &[Tag]) -> Result<()> {
    conn.execute(
        "DELETE FROM PluginTags WHERE artifact = ?1",
        params![artifact_id],
    )?;

    let mut stmt = conn.prepare_cached("INSERT INTO PluginTags (artifact, tag) VALUES (?1, ?2)")?;
    for tag in tags {
        stmt.execute(params![artifact_id, tag.id])?;
    }
    Ok(())
}

impl Catalog {
    /// Create a new artifact together with its tag associations.
    ///
    /// Missing tags are created. If `new.id` is set the row is inserted at that
    /// ID; a collision fails with a constraint error and nothing is written.
    /// Returns the artifact as re-read after commit.
    pub fn create_artifact(&self, session: &mut Session, new: &NewArtifact) -> Result<Artifact> {
        let id = {
            let guard = self.write_lock().acquire();
            session.with_transaction(|conn| {
                let tags = tags::resolve(conn, &guard, &new.tags)?;

                conn.execute(
                    r#"
                    INSERT INTO Artifacts (id, name, author, description, visible)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![new.id, new.name, new.author, new.description, new.visible],
                )?;
                let id = conn.last_insert_rowid();

                replace_tag_links(conn, id, &tags)?;
                Ok(id)
            })?
        };

        debug!("Created artifact '{}' ({id})", new.name);
        self.get_by_id(session, id)?.ok_or(Error::ArtifactNotFound(id))
    }

    /// Apply a sparse update to an artifact.
    ///
    /// Only fields present in `update` are written. Present tags replace the
    /// whole association set; tags dropped from it stay in the catalog.
    pub fn update_artifact(
        &self,
        session: &mut Session,
        artifact: &Artifact,
        update: &ArtifactUpdate,
    ) -> Result<Artifact> {
        let id = artifact.id;
        {
            let guard = self.write_lock().acquire();
            session.with_transaction(|conn| {
                let rows = conn.execute(
                    r#"
                    UPDATE Artifacts
                    SET author = COALESCE(?2, author),
                        description = COALESCE(?3, description)
                    WHERE id = ?1
                    "#,
                    params![id, update.author, update.description],
                )?;
                if rows == 0 {
                    return Err(Error::ArtifactNotFound(id));
                }

                if let Some(names) = &update.tags {
                    let tags = tags::resolve(conn, &guard, names)?;
                    replace_tag_links(conn, id, &tags)?;
                }
                Ok(())
            })?;
        }

        debug!("Updated artifact {id}");
        self.get_by_id(session, id)?.ok_or(Error::ArtifactNotFound(id))
    }

    /// Append a version to an artifact's history.
    ///
    /// The artifact is not looked up first. Whether a dangling `artifact_id` is
    /// rejected depends on the session enforcing foreign keys.
    pub fn append_version(
        &self,
        session: &mut Session,
        artifact_id: i64,
        name: &str,
        hash: &str,
    ) -> Result<Version> {
        let _guard = self.write_lock().acquire();
        // Stored with millisecond precision; report what was stored
        let added_on = system_time_to_unix_millis(SystemTime::now());

        let id = session.with_transaction(|conn| {
            conn.execute(
                r#"
                INSERT INTO Versions (artifact, name, hash, addedOn)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![artifact_id, name, hash, added_on],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        debug!("Appended version '{name}' ({id}) to artifact {artifact_id}");
        Ok(Version {
            id,
            artifact_id,
            name: name.to_owned(),
            hash: hash.to_owned(),
            added_on: unix_millis_to_system_time(added_on),
        })
    }
}
