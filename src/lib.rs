#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod config;
pub mod error;
pub mod metrics;
pub mod record;

// Side-channel I/O и атрибуты host-файла
pub mod stream;  // src/stream/{mod,path}.rs
pub mod attrs;   // src/attrs/{mod,queue,unix,windows}.rs

// Кэш записей (MapCache / NullCache)
pub mod cache;   // src/cache/{mod,map,null}.rs

// Оркестратор
pub mod store;   // src/store/{mod,save,remove}.rs

// Утилиты (to_epoch_millis, cache_key, parse_flag)
pub mod util;    // src/util/mod.rs

// Удобные реэкспорты
pub use attrs::{ArchivePolicy, AttrSnapshot, FileAttrs};
pub use cache::{default_cache, MapCache, MetaCache, NullCache};
pub use config::{StoreBuilder, StoreConfig};
pub use error::{AttrStep, AttrWarning, CacheMiss, MetaError, Result};
pub use record::Record;
pub use store::{MetaStore, RemoveOp, RemoveReport, SaveOp, SaveReport};
pub use stream::{AdsStreams, StreamIo, StreamPath};
