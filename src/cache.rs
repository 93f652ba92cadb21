//! Memoization of GET results, keyed by a string derived from the request.
//!
//! Entries hold a shared future, stored before it is first polled, so that
//! concurrent GETs for the same key join one transport call. Entries live
//! until they are invalidated by a non-GET request to the same key or the
//! cache is cleared; there is no TTL or size bound.

use crate::{Response, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A pending or settled result that any number of callers may await.
pub type SharedResult = Shared<BoxFuture<'static, Result<Response>>>;

/// Outcome of [`ResponseCache::get_or_start`].
pub enum Lookup {
    /// An entry existed; the caller joins it.
    Hit(SharedResult),
    /// No entry existed; a new one was started and stored.
    Started(SharedResult),
}

impl Lookup {
    pub fn into_shared(self) -> SharedResult {
        match self {
            Lookup::Hit(shared) | Lookup::Started(shared) => shared,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, SharedResult>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key`, or stores the future produced by `start`.
    ///
    /// The lookup and the insertion happen under one lock, so two callers
    /// racing on the same key always end up sharing a single future.
    pub fn get_or_start<F>(&self, key: &str, start: F) -> Lookup
    where
        F: FnOnce() -> BoxFuture<'static, Result<Response>>,
    {
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get(key) {
            return Lookup::Hit(existing.clone());
        }

        let shared = start().shared();
        entries.insert(key.to_string(), shared.clone());
        Lookup::Started(shared)
    }

    /// Removes the entry for `key` only if it still is `shared`.
    ///
    /// Used to drop failed results without discarding a newer entry that was
    /// stored after an invalidation.
    pub fn evict(&self, key: &str, shared: &SharedResult) {
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|current| current.ptr_eq(shared)) {
            entries.remove(key);
        }
    }

    /// Removes the entry for `key`. Returns `true` if one existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .finish()
    }
}
