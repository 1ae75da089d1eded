//! Centralized configuration and builder for SideMeta.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - StoreConfig::from_env() reads the SM_* variables; fluent `with_*` overrides.
//! - StoreBuilder assembles a MetaStore from a config plus an explicit cache.
//!
//! Env:
//! - SM_STREAM_NAME      - имя потока (default "Meta").
//! - SM_CACHE            - 0|1|true|false (default true). false => NullCache.
//! - SM_CACHE_ID         - namespace кэша (default "default").
//! - SM_ARCHIVE_POLICY   - drop|preserve (default drop).
//! - SM_VERIFY_ON_READ   - сверять cache hit с текущим stat файла (default false).
//!
//! Stream name is a stable identifier: changing it orphans every record
//! written under the old name (see DESIGN.md for the migration procedure).

use std::fmt;
use std::sync::Arc;

use crate::attrs::ArchivePolicy;
use crate::cache::{default_cache, MetaCache, NullCache};
use crate::consts::{DEFAULT_CACHE_ID, DEFAULT_STREAM_NAME};
use crate::error::Result;
use crate::store::MetaStore;
use crate::stream::{validate_stream_name, AdsStreams, StreamIo};
use crate::util::parse_flag;

/// Top-level configuration for a metadata store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Side-channel name (`<file>:<stream_name>`).
    /// Env: SM_STREAM_NAME (default "Meta")
    pub stream_name: String,

    /// Whether the store uses a real cache.
    /// Env: SM_CACHE (default true)
    pub cache_enabled: bool,

    /// Cache namespace used by the store.
    /// Env: SM_CACHE_ID (default "default")
    pub cache_id: String,

    /// Archive bit handling after a mutation.
    /// Env: SM_ARCHIVE_POLICY = drop|preserve (default drop)
    pub archive_policy: ArchivePolicy,

    /// Compare a cache hit against the host file's stat before returning it.
    /// Env: SM_VERIFY_ON_READ (default false)
    pub verify_on_read: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            cache_enabled: true,
            cache_id: DEFAULT_CACHE_ID.to_string(),
            archive_policy: ArchivePolicy::Drop,
            verify_on_read: false,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables. Unparsable values keep defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SM_STREAM_NAME") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.stream_name = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("SM_CACHE") {
            cfg.cache_enabled = parse_flag(&v);
        }

        if let Ok(v) = std::env::var("SM_CACHE_ID") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.cache_id = s.to_string();
            }
        }

        if let Ok(v) = std::env::var("SM_ARCHIVE_POLICY") {
            if let Ok(p) = v.parse::<ArchivePolicy>() {
                cfg.archive_policy = p;
            }
        }

        if let Ok(v) = std::env::var("SM_VERIFY_ON_READ") {
            cfg.verify_on_read = parse_flag(&v);
        }

        cfg
    }

    pub fn with_stream_name<S: Into<String>>(mut self, name: S) -> Self {
        self.stream_name = name.into();
        self
    }

    pub fn with_cache_enabled(mut self, on: bool) -> Self {
        self.cache_enabled = on;
        self
    }

    pub fn with_cache_id<S: Into<String>>(mut self, id: S) -> Self {
        self.cache_id = id.into();
        self
    }

    pub fn with_archive_policy(mut self, p: ArchivePolicy) -> Self {
        self.archive_policy = p;
        self
    }

    pub fn with_verify_on_read(mut self, on: bool) -> Self {
        self.verify_on_read = on;
        self
    }

    /// Reject configurations the store cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_stream_name(&self.stream_name)
    }
}

impl fmt::Display for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoreConfig {{ \
             stream_name: {}, \
             cache_enabled: {}, \
             cache_id: {}, \
             archive_policy: {}, \
             verify_on_read: {} \
             }}",
            self.stream_name,
            self.cache_enabled,
            self.cache_id,
            self.archive_policy,
            self.verify_on_read,
        )
    }
}

/// Builder producing a MetaStore.
///
/// Cache selection: explicit `cache()` wins; otherwise `cache_enabled` picks the
/// process-wide default MapCache or a NullCache.
pub struct StoreBuilder<S: StreamIo = AdsStreams> {
    cfg: StoreConfig,
    cache: Option<Arc<dyn MetaCache>>,
    io: S,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: StoreConfig::from_env(),
            cache: None,
            io: AdsStreams,
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: StoreConfig::default(),
            cache: None,
            io: AdsStreams,
        }
    }
}

impl<S: StreamIo> StoreBuilder<S> {
    pub fn config(mut self, cfg: StoreConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn stream_name<N: Into<String>>(mut self, name: N) -> Self {
        self.cfg.stream_name = name.into();
        self
    }

    pub fn cache_enabled(mut self, on: bool) -> Self {
        self.cfg.cache_enabled = on;
        self
    }

    pub fn cache_id<N: Into<String>>(mut self, id: N) -> Self {
        self.cfg.cache_id = id.into();
        self
    }

    pub fn archive_policy(mut self, p: ArchivePolicy) -> Self {
        self.cfg.archive_policy = p;
        self
    }

    pub fn verify_on_read(mut self, on: bool) -> Self {
        self.cfg.verify_on_read = on;
        self
    }

    pub fn cache(mut self, cache: Arc<dyn MetaCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the side-channel back-end.
    pub fn io<T: StreamIo>(self, io: T) -> StoreBuilder<T> {
        StoreBuilder {
            cfg: self.cfg,
            cache: self.cache,
            io,
        }
    }

    /// Finish the builder and obtain the store.
    pub fn build(self) -> Result<MetaStore<S>> {
        let cache: Arc<dyn MetaCache> = match self.cache {
            Some(c) => c,
            None if self.cfg.cache_enabled => default_cache(),
            None => Arc::new(NullCache),
        };
        MetaStore::with_io(self.cfg, self.io, cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = StoreConfig::default();
        assert_eq!(c.stream_name, "Meta");
        assert!(c.cache_enabled);
        assert_eq!(c.cache_id, "default");
        assert_eq!(c.archive_policy, ArchivePolicy::Drop);
        assert!(!c.verify_on_read);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn fluent_overrides_and_display() {
        let c = StoreConfig::default()
            .with_stream_name("Info")
            .with_cache_id("diag")
            .with_cache_enabled(false)
            .with_archive_policy(ArchivePolicy::Preserve)
            .with_verify_on_read(true);
        let s = c.to_string();
        assert!(s.contains("stream_name: Info"), "{s}");
        assert!(s.contains("archive_policy: preserve"), "{s}");
        assert!(s.contains("verify_on_read: true"), "{s}");
    }

    #[test]
    fn invalid_stream_name_fails_build() {
        let r = StoreBuilder::from_default().stream_name("bad:name").build();
        assert!(r.is_err());
    }

    #[test]
    fn disabled_cache_builds_null_cache() {
        let store = StoreBuilder::from_default().cache_enabled(false).build().unwrap();
        assert!(!store.cache().is_enabled(None));
    }
}
