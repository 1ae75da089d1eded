//! store - MetaStore: оркестратор чтения/записи/удаления записей.
//!
//! Разнесение:
//! - mod.rs    - тип MetaStore, конструкторы, read/has_record/clear_cache.
//! - save.rs   - save() (одиночный файл или батч, fail-fast).
//! - remove.rs - remove() (одиночный файл или батч, best-effort).
//!
//! read(): кэш → (промах) поток → заполнить кэш. Ошибка чтения потока
//! возвращается сразу, без fallback'ов.
//!
//! Ключ кэша - абсолютный путь host-файла как его дал вызывающий; long-path
//! префикс появляется только на границе ОС (stream::os_path).
//!
//! Сверка кэша с файлом (`verify_on_read`) выключена по умолчанию: без неё
//! кэш считается верным, пока файл меняется только через этот store.

mod remove;
mod save;

use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::cache::MetaCache;
use crate::config::{StoreBuilder, StoreConfig};
use crate::error::{MetaError, Result};
use crate::metrics::record_cache_stale_eviction;
use crate::record::Record;
use crate::stream::{os_path, AdsStreams, StreamIo, StreamPath};
use crate::util::{absolute_path, cache_key};

pub use remove::{RemoveOp, RemoveReport};
pub use save::{SaveOp, SaveReport};

pub struct MetaStore<S: StreamIo = AdsStreams> {
    cfg: StoreConfig,
    io: S,
    cache: Arc<dyn MetaCache>,
}

impl MetaStore {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Store over OS streams; cache chosen from `cfg.cache_enabled`.
    pub fn open(cfg: StoreConfig) -> Result<Self> {
        StoreBuilder::from_default().config(cfg).build()
    }

    /// Store over OS streams with an explicit cache.
    pub fn new(cfg: StoreConfig, cache: Arc<dyn MetaCache>) -> Result<Self> {
        Self::with_io(cfg, AdsStreams, cache)
    }
}

impl<S: StreamIo> MetaStore<S> {
    pub fn with_io(cfg: StoreConfig, io: S, cache: Arc<dyn MetaCache>) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg, io, cache })
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    #[inline]
    pub fn cache(&self) -> &dyn MetaCache {
        self.cache.as_ref()
    }

    #[inline]
    pub fn io(&self) -> &S {
        &self.io
    }

    #[inline]
    pub(crate) fn cache_id(&self) -> Option<&str> {
        Some(self.cfg.cache_id.as_str())
    }

    /// `<absolute file>:<stream_name>` for this store.
    pub fn stream_path(&self, file: &Path) -> StreamPath {
        StreamPath::new(absolute_path(file), self.cfg.stream_name.as_str())
    }

    /// Read the record of `file`: cache first, then the side-channel.
    pub fn read(&self, file: &Path) -> Result<Record> {
        let key = cache_key(file);

        if let Ok(raw) = self.cache.get(&key, self.cache_id()) {
            match Record::from_json(&raw) {
                Ok(rec) if !self.cfg.verify_on_read || self.still_fresh(file, &rec) => {
                    debug!("cache hit {}", key);
                    return Ok(rec);
                }
                Ok(_) => {
                    debug!("cache entry stale for {}, evicting", key);
                    record_cache_stale_eviction();
                    let _ = self.cache.delete(&key, self.cache_id());
                }
                Err(e) => {
                    warn!("dropping undecodable cache entry for {}: {}", key, e);
                    let _ = self.cache.delete(&key, self.cache_id());
                }
            }
        }

        let sp = self.stream_path(file);
        let raw = self.io.read(&sp)?;
        let rec = Record::from_json(&raw).map_err(|e| MetaError::Codec {
            path: sp.to_string(),
            source: e,
        })?;
        // Miss при выключенном кэше - норма.
        let _ = self.cache.set(&key, &raw, self.cache_id());
        Ok(rec)
    }

    /// true iff the side-channel exists. Does not consult the cache.
    pub fn has_record(&self, file: &Path) -> bool {
        self.io.exists(&self.stream_path(file))
    }

    /// Drop every cached entry of this store's namespace.
    pub fn clear_cache(&self) {
        self.cache.clear(self.cache_id());
    }

    fn still_fresh(&self, file: &Path, rec: &Record) -> bool {
        match std::fs::metadata(os_path(file)) {
            Ok(md) => rec.is_fresh_for(&md),
            Err(_) => false,
        }
    }
}
