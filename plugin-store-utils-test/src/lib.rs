// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Test utilities for the plugin store.
//!
//! This crate provides proptest strategies and fixtures for testing the
//! plugin store crates.

use std::path::{Path, PathBuf};

use proptest::prelude::*;
use tempfile::TempDir;

#[doc(hidden)]
pub use pretty_assertions;

/// A temporary directory holding a single catalog database file.
///
/// The file itself is not created; run the migration runner on
/// [`TempCatalogDir::db_path`] first.
pub struct TempCatalogDir {
    _inner: TempDir,
    db_path: PathBuf,
}

impl TempCatalogDir {
    /// Create a new temporary directory.
    pub fn new() -> std::io::Result<Self> {
        let inner = TempDir::new()?;
        let db_path = inner.path().canonicalize()?.join("plugins.db");
        Ok(Self {
            _inner: inner,
            db_path,
        })
    }

    /// Path of the database file inside the directory.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

/// Tag names drawn from a small alphabet so that lists overlap often.
pub fn arb_tag_name() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

/// Tag lists that may repeat names.
pub fn arb_tag_list(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_tag_name(), 0..=max_len)
}

pub fn arb_artifact_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _%-]{0,24}"
}

pub fn arb_author() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

pub fn arb_description() -> impl Strategy<Value = String> {
    "[ -~]{0,80}"
}

/// Hex-encoded content hash of a published payload.
pub fn arb_hash() -> impl Strategy<Value = String> {
    "[0-9a-f]{64}"
}

/// Distinct names in first-occurrence order.
pub fn dedup_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

#[macro_export]
macro_rules! pretty_prop_assert_eq {
    ($left:expr , $right:expr,) => ({
        $crate::pretty_prop_assert_eq!($left, $right)
    });
    ($left:expr , $right:expr) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                ::proptest::prop_assert!(*left_val == *right_val,
                    "assertion failed: `(left == right)`\
                          \n\
                          \n{}\
                          \n",
                          $crate::pretty_assertions::Comparison::new(left_val, right_val))
            }
        }
    });
    ($left:expr , $right:expr, $($arg:tt)*) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                ::proptest::prop_assert!(*left_val == *right_val,
                    "assertion failed: `(left == right)`: {}\
                          \n\
                          \n{}\
                          \n",
                           format_args!($($arg)*),
                           $crate::pretty_assertions::Comparison::new(left_val, right_val))
            }
        }
    });
}
