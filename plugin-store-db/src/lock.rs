// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write serialization for the catalog.
//!
//! Every operation that creates tags, changes an artifact's tag set or
//! appends a version runs while holding the [`WriteLock`]. Reads never take it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// Exclusive-access token shared by all clones of a [`Catalog`](crate::Catalog).
///
/// Clones refer to the same underlying mutex.
#[derive(Debug, Clone, Default)]
pub struct WriteLock {
    inner: Arc<Mutex<()>>,
}

/// Proof that the write lock is held.
///
/// The lock is released when this value is dropped.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl WriteLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock, waiting for as long as it takes.
    pub fn acquire(&self) -> WriteGuard<'_> {
        trace!("Waiting for catalog write lock");
        // The mutex guards no data, so a panic in another writer leaves
        // nothing inconsistent behind.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        trace!("Acquired catalog write lock");
        WriteGuard { _guard: guard }
    }

    /// Acquire the lock only if no other writer holds it.
    pub fn try_acquire(&self) -> Option<WriteGuard<'_>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(WriteGuard { _guard: guard }),
            Err(std::sync::TryLockError::Poisoned(e)) => Some(WriteGuard {
                _guard: e.into_inner(),
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }

    /// Check if two handles share the same mutex.
    pub fn same_lock(&self, other: &WriteLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
