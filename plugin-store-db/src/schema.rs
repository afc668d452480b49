// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database schema definitions for the plugin catalog.
//!
//! Each entry of [`MIGRATIONS`] brings the schema from version `i` to
//! version `i + 1`. The current version is recorded in `PRAGMA user_version`.

/// Initial schema (Artifacts, Tags, PluginTags, Versions)
const V1_SQL: &str = r#"
create table if not exists Artifacts (
    id          integer primary key autoincrement not null,
    name        text not null,
    author      text not null,
    description text not null,
    visible     integer not null default 1
);

create index if not exists IndexArtifactName on Artifacts(name);

create table if not exists Tags (
    id  integer primary key autoincrement not null,
    tag text unique not null
);

create table if not exists PluginTags (
    artifact integer not null,
    tag      integer not null,
    primary key (artifact, tag),
    foreign key (artifact) references Artifacts(id),
    foreign key (tag) references Tags(id)
);

create index if not exists IndexPluginTagsTag on PluginTags(tag);

create table if not exists Versions (
    id       integer primary key autoincrement not null,
    artifact integer not null,
    name     text not null,
    hash     text not null,
    addedOn  integer not null,
    foreign key (artifact) references Artifacts(id)
);

create index if not exists IndexVersionsArtifact on Versions(artifact);
"#;

/// Ordered schema migrations.
pub(crate) const MIGRATIONS: &[&str] = &[V1_SQL];

/// Schema version the catalog expects.
pub const SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;
