// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Multi-session tests against an on-disk catalog.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier, mpsc};
use std::thread;
use std::time::Duration;

use plugin_store_db::{
    Catalog, NewArtifact, OpenMode, OpenOptions, SearchQuery, Session, migrate,
};
use plugin_store_utils_test::TempCatalogDir;

fn setup() -> TempCatalogDir {
    let dir = TempCatalogDir::new().unwrap();
    migrate::upgrade_path(dir.db_path()).unwrap();
    dir
}

fn open(dir: &TempCatalogDir) -> Session {
    Session::open(dir.db_path(), OpenMode::ReadWrite).unwrap()
}

/// Overlapping tag lists from many writers must still yield one row per name.
#[test]
fn test_concurrent_tag_dedup() {
    const WRITERS: usize = 8;
    const ROUNDS: usize = 5;

    let dir = setup();
    let catalog = Catalog::new();
    let barrier = Arc::new(Barrier::new(WRITERS));

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let catalog = catalog.clone();
            let barrier = barrier.clone();
            let path = dir.db_path().to_owned();
            thread::spawn(move || {
                let mut session = Session::open(&path, OpenMode::ReadWrite).unwrap();
                barrier.wait();

                let mut created = Vec::new();
                for round in 0..ROUNDS {
                    let tags = vec![
                        "shared".to_string(),
                        format!("round-{round}"),
                        format!("pair-{}", writer % 2),
                        "shared".to_string(),
                    ];
                    let artifact = catalog
                        .create_artifact(
                            &mut session,
                            &NewArtifact {
                                name: format!("plugin-{writer}-{round}"),
                                author: format!("writer-{writer}"),
                                tags: tags.clone(),
                                ..Default::default()
                            },
                        )
                        .unwrap();
                    created.push((artifact, tags));
                }
                created
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let session = open(&dir);
    let tags = catalog.list_tags(&session).unwrap();
    let distinct: BTreeSet<_> = tags.iter().map(|t| t.tag.clone()).collect();
    assert_eq!(tags.len(), distinct.len(), "duplicate tag rows: {tags:?}");
    // shared + round-0..4 + pair-0/1
    assert_eq!(distinct.len(), 1 + ROUNDS + 2);

    for (artifact, requested) in results {
        let stored = catalog.get_by_id(&session, artifact.id).unwrap().unwrap();
        let expected: BTreeSet<_> = requested.into_iter().collect();
        let actual: BTreeSet<_> = stored.tag_names().into_iter().map(String::from).collect();
        assert_eq!(actual, expected);

        for tag in &stored.tags {
            let row = catalog.get_tag(&session, &tag.tag).unwrap().unwrap();
            assert_eq!(&row, tag);
        }
    }
    assert_eq!(
        catalog.count_artifacts(&session).unwrap(),
        (WRITERS * ROUNDS) as u64
    );
}

/// Concurrent version appends all land with distinct IDs.
#[test]
fn test_concurrent_version_appends() {
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 10;

    let dir = setup();
    let catalog = Catalog::new();
    let artifact = catalog
        .create_artifact(
            &mut open(&dir),
            &NewArtifact {
                name: "Foo".into(),
                ..Default::default()
            },
        )
        .unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let catalog = catalog.clone();
            let barrier = barrier.clone();
            let path = dir.db_path().to_owned();
            thread::spawn(move || {
                let mut session = Session::open(&path, OpenMode::ReadWrite).unwrap();
                barrier.wait();
                for i in 0..PER_WRITER {
                    catalog
                        .append_version(
                            &mut session,
                            artifact.id,
                            &format!("{writer}.{i}.0"),
                            &format!("{writer:032x}{i:032x}"),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let versions = catalog.versions(&open(&dir), artifact.id).unwrap();
    assert_eq!(versions.len(), WRITERS * PER_WRITER);
    let ids: BTreeSet<_> = versions.iter().map(|v| v.id).collect();
    assert_eq!(ids.len(), versions.len());
    let hashes: BTreeSet<_> = versions.iter().map(|v| v.hash.clone()).collect();
    assert_eq!(hashes.len(), versions.len());
}

/// Reads complete while another thread holds the write lock.
#[test]
fn test_reads_do_not_wait_for_writers() {
    let dir = setup();
    let catalog = Catalog::new();
    catalog
        .create_artifact(
            &mut open(&dir),
            &NewArtifact {
                name: "Foo".into(),
                tags: vec!["ui".into()],
                ..Default::default()
            },
        )
        .unwrap();

    let _guard = catalog.write_lock().acquire();

    let (tx, rx) = mpsc::channel();
    let reader = catalog.clone();
    let path = dir.db_path().to_owned();
    thread::spawn(move || {
        let session = Session::open(&path, OpenMode::ReadOnly).unwrap();
        let hits = reader
            .search(&session, &SearchQuery::with_tags(["ui"]))
            .unwrap();
        let by_name = reader.get_by_name(&session, "Foo").unwrap();
        tx.send((hits.len(), by_name.is_some())).unwrap();
    });

    let result = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("reader blocked on the write lock");
    assert_eq!(result, (1, true));
}

/// Writers queue behind a held write lock instead of failing.
#[test]
fn test_writer_waits_for_lock() {
    let dir = setup();
    let catalog = Catalog::new();
    let guard = catalog.write_lock().acquire();

    let (tx, rx) = mpsc::channel();
    let writer = catalog.clone();
    let path = dir.db_path().to_owned();
    let handle = thread::spawn(move || {
        let mut session = Session::open(&path, OpenMode::ReadWrite).unwrap();
        let tags = writer.resolve_tags(&mut session, &["late".to_string()]).unwrap();
        tx.send(tags.len()).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    drop(guard);
    assert_eq!(rx.recv_timeout(Duration::from_secs(10)).unwrap(), 1);
    handle.join().unwrap();
}

/// Without foreign key enforcement a dangling version is accepted.
#[test]
fn test_dangling_version_without_foreign_keys() {
    let dir = setup();
    let catalog = Catalog::new();
    let mut session = Session::open_with(
        dir.db_path(),
        OpenMode::ReadWrite,
        OpenOptions {
            foreign_keys: false,
            ..Default::default()
        },
    )
    .unwrap();

    let version = catalog
        .append_version(&mut session, 4242, "1.0.0", "cafe")
        .unwrap();
    assert_eq!(version.artifact_id, 4242);
    assert_eq!(catalog.versions(&session, 4242).unwrap(), vec![version]);
    assert!(catalog.get_by_id(&session, 4242).unwrap().is_none());
}

/// Deleting in one session is visible in another.
#[test]
fn test_delete_visible_across_sessions() {
    let dir = setup();
    let catalog = Catalog::new();
    let mut writer = open(&dir);
    let reader = open(&dir);

    let artifact = catalog
        .create_artifact(
            &mut writer,
            &NewArtifact {
                name: "Foo".into(),
                tags: vec!["util".into()],
                ..Default::default()
            },
        )
        .unwrap();
    assert!(catalog.get_by_id(&reader, artifact.id).unwrap().is_some());

    assert!(catalog.delete(&mut writer, artifact.id).unwrap());
    assert!(catalog.get_by_id(&reader, artifact.id).unwrap().is_none());
    assert!(catalog.get_tag(&reader, "util").unwrap().is_some());
}
