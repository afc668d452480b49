// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Async access to the catalog.
//!
//! Catalog operations block (SQLite I/O, the write lock), so each call runs on
//! tokio's blocking pool with a session of its own.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use plugin_store_db::{
    Artifact, ArtifactUpdate, Catalog, NewArtifact, OpenMode, SearchQuery, Session, Tag, Version,
    migrate,
};

use crate::config::Config;
use crate::error::{Result, ServiceError};

#[derive(Clone)]
pub struct CatalogService {
    config: Arc<Config>,
    catalog: Catalog,
}

impl CatalogService {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Catalog::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A search query using the configured page size.
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            limit: self.config.default_page_size,
            ..Default::default()
        }
    }

    /// Bring the configured database to the current schema, creating it if needed.
    pub async fn migrate(&self) -> Result<usize> {
        let path = self.config.db_path.clone();
        let applied = tokio::task::spawn_blocking(move || migrate::upgrade_path(&path))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))??;
        info!(
            "Catalog at {} is at schema version {} ({applied} migration(s) applied)",
            self.config.db_path.display(),
            plugin_store_db::SCHEMA_VERSION
        );
        Ok(applied)
    }

    /// Execute a catalog operation asynchronously
    async fn db_operation<T, F>(&self, mode: OpenMode, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Catalog, &mut Session) -> plugin_store_db::Result<T> + Send + 'static,
    {
        let catalog = self.catalog.clone();
        let path: PathBuf = self.config.db_path.clone();
        let options = self.config.open_options();
        let result = tokio::task::spawn_blocking(move || {
            let mut session = Session::open_with(&path, mode, options)?;
            f(&catalog, &mut session)
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?;
        Ok(result?)
    }

    pub async fn resolve_tags(&self, names: Vec<String>) -> Result<Vec<Tag>> {
        self.db_operation(OpenMode::ReadWrite, move |catalog, session| {
            catalog.resolve_tags(session, &names)
        })
        .await
    }

    pub async fn create_artifact(&self, new: NewArtifact) -> Result<Artifact> {
        let artifact = self
            .db_operation(OpenMode::ReadWrite, move |catalog, session| {
                catalog.create_artifact(session, &new)
            })
            .await?;
        debug!("Created artifact '{}' ({})", artifact.name, artifact.id);
        Ok(artifact)
    }

    pub async fn update_artifact(
        &self,
        artifact: Artifact,
        update: ArtifactUpdate,
    ) -> Result<Artifact> {
        self.db_operation(OpenMode::ReadWrite, move |catalog, session| {
            catalog.update_artifact(session, &artifact, &update)
        })
        .await
    }

    pub async fn append_version(
        &self,
        artifact_id: i64,
        name: String,
        hash: String,
    ) -> Result<Version> {
        self.db_operation(OpenMode::ReadWrite, move |catalog, session| {
            catalog.append_version(session, artifact_id, &name, &hash)
        })
        .await
    }

    pub async fn search(&self, query: SearchQuery) -> Result<Vec<Artifact>> {
        self.db_operation(OpenMode::ReadOnly, move |catalog, session| {
            catalog.search(session, &query)
        })
        .await
    }

    pub async fn get_by_name(&self, name: String) -> Result<Option<Artifact>> {
        self.db_operation(OpenMode::ReadOnly, move |catalog, session| {
            catalog.get_by_name(session, &name)
        })
        .await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Artifact>> {
        self.db_operation(OpenMode::ReadOnly, move |catalog, session| {
            catalog.get_by_id(session, id)
        })
        .await
    }

    pub async fn versions(&self, artifact_id: i64) -> Result<Vec<Version>> {
        self.db_operation(OpenMode::ReadOnly, move |catalog, session| {
            catalog.versions(session, artifact_id)
        })
        .await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.db_operation(OpenMode::ReadOnly, |catalog, session| {
            catalog.list_tags(session)
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .db_operation(OpenMode::ReadWrite, move |catalog, session| {
                catalog.delete(session, id)
            })
            .await?;
        if deleted {
            debug!("Deleted artifact {id}");
        }
        Ok(deleted)
    }
}
