//! cache - namespaced string cache перед side-channel'ом.
//!
//! Ключ - абсолютный путь host-файла, значение - сериализованная запись (строкой;
//! десериализация при чтении). Namespace (`id`) разбивает пространство ключей;
//! `None` означает DEFAULT_CACHE_ID.
//!
//! Две реализации трейта:
//! - MapCache  - настоящая карта, enable/disable per namespace;
//! - NullCache - всегда промах, ничего не хранит (store без кэша без ветвлений у вызывающего).
//!
//! Отключённый namespace: get/count → CacheMiss, set/delete → CacheMiss без
//! побочных эффектов, clear - no-op. Уже сохранённые записи переживают disable/enable.

mod map;
mod null;

use std::sync::{Arc, OnceLock};

use crate::consts::DEFAULT_CACHE_ID;
use crate::error::CacheMiss;

pub use map::MapCache;
pub use null::NullCache;

pub type CacheResult<T> = std::result::Result<T, CacheMiss>;

pub trait MetaCache: Send + Sync {
    fn enable(&self, id: Option<&str>);
    fn disable(&self, id: Option<&str>);
    fn is_enabled(&self, id: Option<&str>) -> bool;

    /// Miss both when disabled and when the key is absent.
    fn get(&self, key: &str, id: Option<&str>) -> CacheResult<String>;
    /// Miss only when disabled.
    fn set(&self, key: &str, value: &str, id: Option<&str>) -> CacheResult<()>;
    fn delete(&self, key: &str, id: Option<&str>) -> CacheResult<()>;
    /// Drop every entry of the namespace; no-op while disabled.
    fn clear(&self, id: Option<&str>);
    fn count(&self, id: Option<&str>) -> CacheResult<usize>;
}

#[inline]
pub(crate) fn ns(id: Option<&str>) -> &str {
    id.unwrap_or(DEFAULT_CACHE_ID)
}

static DEFAULT_CACHE: OnceLock<Arc<MapCache>> = OnceLock::new();

/// Process-lifetime cache instance, created on first use.
///
/// Бизнес-логика сюда не ходит: store получает кэш через конструктор,
/// а этот экземпляр собирается один раз на старте (builder / CLI).
pub fn default_cache() -> Arc<MapCache> {
    DEFAULT_CACHE
        .get_or_init(|| Arc::new(MapCache::new()))
        .clone()
}
