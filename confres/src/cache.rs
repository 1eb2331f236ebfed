//! The age-aware cache: a key-to-value store where each entry
//! carries its creation timestamp, and a lookup may demand a fresher
//! entry than what's stored.

use crate::clock::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct Entry {
    value: String,
    created_ms: i64,
}

/// Caches resolved values under a per-lookup maximum age.
///
/// All access is serialized behind a single mutex: the spec only
/// requires that concurrent `get`+insert never observe a torn entry,
/// not single-flight deduplication of concurrent fallbacks on the
/// same key, so one mutex over the whole map is sufficient.
pub struct AgeAwareCache {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl AgeAwareCache {
    /// Create an empty cache driven by `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return a value for `key`, no older than `max_age_ms`, calling
    /// `fallback` to refresh it if the stored entry is missing or
    /// stale.
    ///
    /// An entry is fresh iff `now < created_ms + max_age_ms` (strict):
    /// an entry created exactly `max_age_ms` in the past is stale and
    /// forces a fresh lookup. A fallback that returns `None` is never
    /// stored; a fallback that returns `Some` replaces any existing
    /// entry, fresh or not.
    pub fn get(
        &self,
        key: &str,
        max_age_ms: i64,
        fallback: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        let now = self.clock.now_ms();
        {
            let entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get(key) {
                if now < entry.created_ms + max_age_ms {
                    return Some(entry.value.clone());
                }
            }
        }

        let value = fallback();
        if let Some(v) = &value {
            self.entries.lock().unwrap().insert(
                key.to_string(),
                Entry {
                    value: v.clone(),
                    created_ms: now,
                },
            );
        }
        value
    }
}

/// A cache that never stores anything: every `get` runs the fallback.
///
/// Used when an application disables caching outright, as distinct
/// from calling [`AgeAwareCache::get`] with `max_age_ms = 0` (which
/// still forces a fresh lookup on every call, but keeps storing the
/// result for any caller that asks for an older entry later).
#[derive(Debug, Default)]
pub struct NullCache;

impl NullCache {
    /// Always runs `fallback` and returns its result without storing
    /// it.
    pub fn get(&self, fallback: impl FnOnce() -> Option<String>) -> Option<String> {
        fallback()
    }
}

/// The engine's cache slot: either a real [`AgeAwareCache`] or the
/// [`NullCache`] installed by [`crate::ConfigLoaderBuilder::without_cache`].
///
/// Folding both behind one type lets the engine hold a single
/// non-optional field and call `get` the same way regardless of
/// whether caching is enabled, rather than branching on an `Option` at
/// every call site.
pub enum Cache {
    /// Caching enabled: entries are kept and honour `max_age_ms`.
    Aged(AgeAwareCache),
    /// Caching disabled: every call re-resolves and nothing is stored.
    Disabled(NullCache),
}

impl Cache {
    /// Dispatch to the underlying cache. `max_age_ms` is ignored by
    /// the `Disabled` variant, which always runs `fallback`.
    pub fn get(
        &self,
        key: &str,
        max_age_ms: i64,
        fallback: impl FnOnce() -> Option<String>,
    ) -> Option<String> {
        match self {
            Cache::Aged(cache) => cache.get(key, max_age_ms, fallback),
            Cache::Disabled(cache) => cache.get(fallback),
        }
    }
}
