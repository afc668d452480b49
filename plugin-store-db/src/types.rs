// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Row types and request parameters for the plugin catalog.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Page size used when a search does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// A registered plugin with its tags and published versions.
///
/// This represents a row from the Artifacts table, hydrated with its
/// PluginTags associations and its Versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Database row ID
    pub id: i64,
    pub name: String,
    pub author: String,
    pub description: String,
    /// Hidden artifacts are excluded from search by default
    pub visible: bool,
    /// Associated tags, ordered by tag ID
    pub tags: Vec<Tag>,
    /// Published versions, oldest first
    pub versions: Vec<Version>,
}

impl Artifact {
    /// Names of the associated tags.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.tag.as_str()).collect()
    }

    /// Check if the artifact is associated with the tag `name`.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.tag == name)
    }

    /// The most recently appended version, if any.
    pub fn latest_version(&self) -> Option<&Version> {
        self.versions.last()
    }
}

/// A shared, deduplicated label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Database row ID
    pub id: i64,
    /// Tag name, unique across the catalog
    pub tag: String,
}

/// An immutable publication of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    /// Database row ID
    pub id: i64,
    /// ID of the owning artifact
    pub artifact_id: i64,
    pub name: String,
    /// Content identifier of the published payload, as supplied by the caller
    pub hash: String,
    /// When this version was appended
    pub added_on: SystemTime,
}

/// Parameters for creating a new artifact.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub name: String,
    pub author: String,
    pub description: String,
    /// Tag names; missing tags are created, duplicates are ignored
    pub tags: Vec<String>,
    /// Restore at a known ID instead of letting the store assign one.
    ///
    /// The caller is responsible for the ID being free.
    pub id: Option<i64>,
    pub visible: bool,
}

impl Default for NewArtifact {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            description: String::new(),
            tags: Vec::new(),
            id: None,
            visible: true,
        }
    }
}

/// Sparse update of an artifact. Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactUpdate {
    pub author: Option<String>,
    pub description: Option<String>,
    /// Replaces the whole tag set when present
    pub tags: Option<Vec<String>>,
}

impl ArtifactUpdate {
    /// Check if the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// Filters and pagination window for [`Catalog::search`](crate::Catalog::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring of the artifact name; empty means no filter
    pub name: Option<String>,
    /// Every one of these tags must be associated; empty means no filter
    pub tags: Vec<String>,
    pub include_hidden: bool,
    pub limit: u32,
    /// Zero-based page; the window starts at `limit * page`
    pub page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            name: None,
            tags: Vec::new(),
            include_hidden: false,
            limit: DEFAULT_PAGE_SIZE,
            page: 0,
        }
    }
}

impl SearchQuery {
    /// Query matching names containing `name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Query matching artifacts carrying all of `tags`.
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Row offset of the first result.
    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page)
    }
}

/// Convert Unix milliseconds to SystemTime.
pub(crate) fn unix_millis_to_system_time(millis: i64) -> SystemTime {
    if millis >= 0 {
        UNIX_EPOCH + Duration::from_millis(millis as u64)
    } else {
        UNIX_EPOCH - Duration::from_millis(millis.unsigned_abs())
    }
}

/// Convert SystemTime to Unix milliseconds.
pub(crate) fn system_time_to_unix_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}
