use anyhow::Result;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use SideMeta::util::cache_key;
use SideMeta::{
    AdsStreams, MapCache, MetaCache, MetaStore, NullCache, Record, StoreConfig, StreamIo,
    StreamPath,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!("smtest-cache-{prefix}-{pid}-{t}-{id}"));
    fs::create_dir_all(&root).unwrap();
    root
}

fn host(root: &Path, name: &str, len: usize) -> PathBuf {
    let p = root.join(name);
    fs::write(&p, vec![7u8; len]).unwrap();
    p
}

/// AdsStreams + счётчики вызовов.
#[derive(Default)]
struct CountingIo {
    inner: AdsStreams,
    reads: Cell<usize>,
    writes: Cell<usize>,
}

impl StreamIo for CountingIo {
    fn exists(&self, sp: &StreamPath) -> bool {
        self.inner.exists(sp)
    }
    fn read(&self, sp: &StreamPath) -> SideMeta::Result<String> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(sp)
    }
    fn write(&self, sp: &StreamPath, contents: &str) -> SideMeta::Result<usize> {
        self.writes.set(self.writes.get() + 1);
        self.inner.write(sp, contents)
    }
    fn delete(&self, sp: &StreamPath) {
        self.inner.delete(sp)
    }
}

fn counting_store(cfg: StoreConfig, cache: Arc<dyn MetaCache>) -> Result<MetaStore<CountingIo>> {
    Ok(MetaStore::with_io(cfg, CountingIo::default(), cache)?)
}

#[test]
fn cache_hit_skips_stream_read() -> Result<()> {
    let root = unique_root("hit");
    let f = host(&root, "movie.mkv", 10);
    let store = counting_store(StoreConfig::default(), Arc::new(MapCache::new()))?;

    let rec = Record::new(1, 10).with("codec", "H264");
    store.save_one(&f, &rec)?;
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.io().reads.get(), 0, "save populated the cache");

    store.clear_cache();
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.io().reads.get(), 1, "miss reads once, then cached");
    Ok(())
}

#[test]
fn scenario_b_disabled_cache_reads_stream_every_time() -> Result<()> {
    let root = unique_root("scenario-b");
    let movie = host(&root, "movie.mkv", 500);
    let cache = Arc::new(MapCache::new());
    cache.disable(None);
    let store = counting_store(StoreConfig::default(), cache.clone())?;

    store.save_one(&movie, &Record::new(1_700_000_000_000, 500).with("video_codec", "H264"))?;
    store.read(&movie)?;
    store.read(&movie)?;
    assert_eq!(store.io().reads.get(), 2);
    assert!(cache.get(&cache_key(&movie), None).is_err());
    Ok(())
}

#[test]
fn null_cache_store_behaves_like_uncached() -> Result<()> {
    let root = unique_root("null");
    let f = host(&root, "x.mkv", 3);
    let store = counting_store(StoreConfig::default(), Arc::new(NullCache))?;

    let rec = Record::new(3, 3);
    store.save_one(&f, &rec)?;
    for _ in 0..3 {
        assert_eq!(store.read(&f)?, rec);
    }
    assert_eq!(store.io().reads.get(), 3);
    Ok(())
}

#[test]
fn disable_enable_preserves_entries() -> Result<()> {
    let root = unique_root("toggle");
    let f = host(&root, "t.mkv", 4);
    let cache = Arc::new(MapCache::new());
    let store = counting_store(StoreConfig::default(), cache.clone())?;

    let rec = Record::new(4, 4).with("codec", "AV1");
    store.save_one(&f, &rec)?;

    cache.disable(None);
    assert!(cache.get(&cache_key(&f), None).is_err(), "get while disabled is a miss");
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.io().reads.get(), 1);

    cache.enable(None);
    assert_eq!(cache.count(None)?, 1, "entry survived the toggle");
    assert_eq!(store.read(&f)?, rec);
    assert_eq!(store.io().reads.get(), 1, "served from cache again");
    Ok(())
}

#[test]
fn namespaces_isolate_stores_sharing_one_cache() -> Result<()> {
    let root = unique_root("ns");
    let f = host(&root, "n.mkv", 1);
    let cache: Arc<dyn MetaCache> = Arc::new(MapCache::new());
    let main = counting_store(StoreConfig::default().with_cache_id("main"), cache.clone())?;
    let diag = counting_store(StoreConfig::default().with_cache_id("diag"), cache.clone())?;

    main.save_one(&f, &Record::new(1, 1))?;
    assert_eq!(cache.count(Some("main"))?, 1);
    assert_eq!(cache.count(Some("diag"))?, 0);

    diag.read(&f)?;
    assert_eq!(diag.io().reads.get(), 1, "other namespace misses");
    main.clear_cache();
    assert_eq!(cache.count(Some("main"))?, 0);
    assert_eq!(cache.count(Some("diag"))?, 1);
    Ok(())
}

#[test]
fn external_change_is_served_stale_unless_verified() -> Result<()> {
    let root = unique_root("stale");
    let f = host(&root, "s.mkv", 100);

    // без сверки: внешнее изменение файла не видно, ответ из кэша
    let plain = counting_store(StoreConfig::default(), Arc::new(MapCache::new()))?;
    let rec = Record::for_file(&f)?.with("codec", "H264");
    plain.save_one(&f, &rec)?;
    fs::write(&f, vec![1u8; 200])?;
    assert_eq!(plain.read(&f)?, rec);
    assert_eq!(plain.io().reads.get(), 0);

    // со сверкой: stat не совпал → запись из кэша выброшена, чтение из потока
    let cache = Arc::new(MapCache::new());
    let verified = counting_store(StoreConfig::default().with_verify_on_read(true), cache.clone())?;
    let rec = Record::for_file(&f)?.with("codec", "H264");
    verified.save_one(&f, &rec)?;
    assert_eq!(verified.read(&f)?, rec);
    assert_eq!(verified.io().reads.get(), 0, "fresh entry served from cache");

    fs::write(&f, vec![1u8; 300])?;
    assert_eq!(verified.read(&f)?, rec, "stream still holds the old record");
    assert_eq!(verified.io().reads.get(), 1, "stale entry forced a stream read");
    Ok(())
}
