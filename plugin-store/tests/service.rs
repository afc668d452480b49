// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! End-to-end tests of the async catalog facade.

use std::collections::BTreeSet;

use plugin_store::{CatalogService, Config, ServiceError};
use plugin_store_db::{ArtifactUpdate, NewArtifact, SearchQuery};
use plugin_store_utils_test::TempCatalogDir;

async fn service(dir: &TempCatalogDir) -> CatalogService {
    let service = CatalogService::new(Config {
        db_path: dir.db_path().to_owned(),
        default_page_size: 2,
        ..Default::default()
    });
    service.migrate().await.unwrap();
    service
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let dir = TempCatalogDir::new().unwrap();
    let service = service(&dir).await;
    assert_eq!(service.migrate().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unmigrated_database_is_rejected() {
    let dir = TempCatalogDir::new().unwrap();
    let service = CatalogService::new(Config {
        db_path: dir.db_path().to_owned(),
        ..Default::default()
    });

    let err = service.get_by_id(1).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Catalog(plugin_store_db::Error::DatabaseNotFound(_))
    ));
}

#[tokio::test]
async fn test_catalog_lifecycle() {
    let dir = TempCatalogDir::new().unwrap();
    let service = service(&dir).await;

    let foo = service
        .create_artifact(NewArtifact {
            name: "Foo".into(),
            author: "alice".into(),
            description: "desc".into(),
            tags: vec!["util".into(), "ui".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let hits = service
        .search(SearchQuery::with_tags(["ui"]))
        .await
        .unwrap();
    assert_eq!(hits, vec![foo.clone()]);
    assert!(
        service
            .search(SearchQuery::with_tags(["ui", "missing"]))
            .await
            .unwrap()
            .is_empty()
    );

    let version = service
        .append_version(foo.id, "1.0.0".into(), "abc123".into())
        .await
        .unwrap();
    assert_eq!(service.versions(foo.id).await.unwrap(), vec![version]);

    let updated = service
        .update_artifact(
            foo.clone(),
            ArtifactUpdate {
                description: Some("better".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description, "better");
    assert_eq!(updated.tags, foo.tags);

    assert_eq!(
        service.get_by_name("Foo".into()).await.unwrap().map(|a| a.id),
        Some(foo.id)
    );

    assert!(service.delete(foo.id).await.unwrap());
    assert!(service.get_by_id(foo.id).await.unwrap().is_none());
    assert_eq!(service.list_tags().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_configured_page_size() {
    let dir = TempCatalogDir::new().unwrap();
    let service = service(&dir).await;

    for i in 0..3 {
        service
            .create_artifact(NewArtifact {
                name: format!("plugin-{i}"),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let first = service.search(service.search_query()).await.unwrap();
    assert_eq!(first.len(), 2);
    let second = service
        .search(SearchQuery {
            page: 1,
            ..service.search_query()
        })
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_share_tags() {
    let dir = TempCatalogDir::new().unwrap();
    let service = service(&dir).await;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_artifact(NewArtifact {
                        name: format!("plugin-{i}"),
                        tags: vec!["common".into(), format!("group-{}", i % 3)],
                        ..Default::default()
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let tags = service.list_tags().await.unwrap();
    let names: BTreeSet<_> = tags.iter().map(|t| t.tag.as_str()).collect();
    assert_eq!(tags.len(), names.len());
    assert_eq!(
        names,
        BTreeSet::from(["common", "group-0", "group-1", "group-2"])
    );
}
