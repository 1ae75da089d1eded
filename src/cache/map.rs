use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{ns, CacheResult, MetaCache};
use crate::error::CacheMiss;
use crate::metrics::{record_cache_hit, record_cache_miss};

struct Namespace {
    enabled: bool,
    entries: HashMap<String, String>,
}

impl Namespace {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }
}

struct Inner {
    default_enabled: bool,
    spaces: HashMap<String, Namespace>,

    // Счётчики
    hits: u64,
    misses: u64,
}

impl Inner {
    fn space(&self, id: &str) -> Option<&Namespace> {
        self.spaces.get(id)
    }

    fn space_mut(&mut self, id: &str) -> &mut Namespace {
        let default_enabled = self.default_enabled;
        self.spaces
            .entry(id.to_string())
            .or_insert_with(|| Namespace::new(default_enabled))
    }

    fn enabled(&self, id: &str) -> bool {
        self.space(id).map(|s| s.enabled).unwrap_or(self.default_enabled)
    }
}

/// In-memory cache backed by one map per namespace.
pub struct MapCache {
    inner: Mutex<Inner>,
}

impl Default for MapCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MapCache {
    /// New namespaces start enabled.
    pub fn new() -> Self {
        Self::with_default_enabled(true)
    }

    /// New namespaces start disabled until `enable()`.
    pub fn disabled() -> Self {
        Self::with_default_enabled(false)
    }

    fn with_default_enabled(on: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                default_enabled: on,
                spaces: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    // poisoned lock: состояние - просто карта строк, продолжаем с ним.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// (hits, misses) since creation.
    pub fn counters(&self) -> (u64, u64) {
        let g = self.lock();
        (g.hits, g.misses)
    }

    /// (namespaces, entries across all namespaces).
    pub fn stats(&self) -> (usize, usize) {
        let g = self.lock();
        let entries = g.spaces.values().map(|s| s.entries.len()).sum();
        (g.spaces.len(), entries)
    }
}

impl MetaCache for MapCache {
    fn enable(&self, id: Option<&str>) {
        self.lock().space_mut(ns(id)).enabled = true;
    }

    fn disable(&self, id: Option<&str>) {
        self.lock().space_mut(ns(id)).enabled = false;
    }

    fn is_enabled(&self, id: Option<&str>) -> bool {
        self.lock().enabled(ns(id))
    }

    fn get(&self, key: &str, id: Option<&str>) -> CacheResult<String> {
        let mut g = self.lock();
        let found = match g.space(ns(id)) {
            Some(s) if s.enabled => s.entries.get(key).cloned(),
            _ => None,
        };
        match found {
            Some(v) => {
                g.hits = g.hits.saturating_add(1);
                record_cache_hit();
                Ok(v)
            }
            None => {
                g.misses = g.misses.saturating_add(1);
                record_cache_miss();
                Err(CacheMiss)
            }
        }
    }

    fn set(&self, key: &str, value: &str, id: Option<&str>) -> CacheResult<()> {
        let mut g = self.lock();
        let space = g.space_mut(ns(id));
        if !space.enabled {
            return Err(CacheMiss);
        }
        space.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str, id: Option<&str>) -> CacheResult<()> {
        let mut g = self.lock();
        let space = g.space_mut(ns(id));
        if !space.enabled {
            return Err(CacheMiss);
        }
        space.entries.remove(key).map(|_| ()).ok_or(CacheMiss)
    }

    fn clear(&self, id: Option<&str>) {
        let mut g = self.lock();
        let space = g.space_mut(ns(id));
        if space.enabled {
            space.entries.clear();
        }
    }

    fn count(&self, id: Option<&str>) -> CacheResult<usize> {
        let g = self.lock();
        if !g.enabled(ns(id)) {
            return Err(CacheMiss);
        }
        Ok(g.space(ns(id)).map(|s| s.entries.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_count() {
        let c = MapCache::new();
        assert_eq!(c.count(None), Ok(0));
        assert_eq!(c.get("/a", None), Err(CacheMiss));

        c.set("/a", "{\"x\":1}", None).unwrap();
        c.set("/b", "{}", None).unwrap();
        assert_eq!(c.get("/a", None).unwrap(), "{\"x\":1}");
        assert_eq!(c.count(None), Ok(2));

        c.delete("/a", None).unwrap();
        assert_eq!(c.delete("/a", None), Err(CacheMiss), "absent key");
        assert_eq!(c.count(None), Ok(1));

        c.clear(None);
        assert_eq!(c.count(None), Ok(0));
        assert_eq!(c.counters(), (1, 1));
    }

    #[test]
    fn namespaces_are_independent() {
        let c = MapCache::new();
        c.set("/f", "real", Some("real")).unwrap();
        c.set("/f", "diag", Some("diag")).unwrap();
        assert_eq!(c.get("/f", Some("real")).unwrap(), "real");
        assert_eq!(c.get("/f", Some("diag")).unwrap(), "diag");
        assert_eq!(c.get("/f", None), Err(CacheMiss));

        c.clear(Some("diag"));
        assert_eq!(c.count(Some("diag")), Ok(0));
        assert_eq!(c.count(Some("real")), Ok(1));
        assert_eq!(c.stats(), (2, 1));
    }

    #[test]
    fn disable_hides_but_keeps_entries() {
        let c = MapCache::new();
        c.set("/f", "v", None).unwrap();

        c.disable(None);
        assert!(!c.is_enabled(None));
        assert_eq!(c.get("/f", None), Err(CacheMiss));
        assert_eq!(c.set("/g", "w", None), Err(CacheMiss));
        assert_eq!(c.delete("/f", None), Err(CacheMiss));
        assert_eq!(c.count(None), Err(CacheMiss));
        c.clear(None); // no-op while disabled

        c.enable(None);
        assert_eq!(c.get("/f", None).unwrap(), "v", "entry survives disable/enable");
        assert_eq!(c.get("/g", None), Err(CacheMiss), "set while disabled stored nothing");
        assert!(c.is_enabled(Some("other")), "toggling one namespace leaves others alone");
    }

    #[test]
    fn disabled_by_default() {
        let c = MapCache::disabled();
        assert!(!c.is_enabled(None));
        assert_eq!(c.set("/f", "v", None), Err(CacheMiss));
        c.enable(None);
        c.set("/f", "v", None).unwrap();
        assert_eq!(c.get("/f", None).unwrap(), "v");
        assert!(!c.is_enabled(Some("x")));
    }
}
