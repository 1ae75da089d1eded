use super::{CacheResult, MetaCache};
use crate::error::CacheMiss;

/// Cache that never stores anything. Always reports disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl MetaCache for NullCache {
    fn enable(&self, _id: Option<&str>) {}

    fn disable(&self, _id: Option<&str>) {}

    fn is_enabled(&self, _id: Option<&str>) -> bool {
        false
    }

    fn get(&self, _key: &str, _id: Option<&str>) -> CacheResult<String> {
        Err(CacheMiss)
    }

    fn set(&self, _key: &str, _value: &str, _id: Option<&str>) -> CacheResult<()> {
        Err(CacheMiss)
    }

    fn delete(&self, _key: &str, _id: Option<&str>) -> CacheResult<()> {
        Err(CacheMiss)
    }

    fn clear(&self, _id: Option<&str>) {}

    fn count(&self, _id: Option<&str>) -> CacheResult<usize> {
        Err(CacheMiss)
    }
}
