use anyhow::Result;
use serde_json::json;

use SideMeta::metrics;
use SideMeta::MetaStore;

pub fn exec(store: &MetaStore, json_out: bool, reset: bool) -> Result<()> {
    let cfg = store.config();
    let m = metrics::snapshot();
    let cache_count = store.cache().count(Some(cfg.cache_id.as_str())).ok();

    if json_out {
        let v = json!({
            "config": {
                "stream_name": cfg.stream_name,
                "cache_enabled": cfg.cache_enabled,
                "cache_id": cfg.cache_id,
                "archive_policy": cfg.archive_policy.to_string(),
                "verify_on_read": cfg.verify_on_read,
            },
            "cache": {
                "enabled": store.cache().is_enabled(Some(cfg.cache_id.as_str())),
                "entries": cache_count,
            },
            "metrics": {
                "stream_reads": m.stream_reads,
                "stream_writes": m.stream_writes,
                "stream_bytes_written": m.stream_bytes_written,
                "stream_deletes": m.stream_deletes,
                "cache_hits": m.cache_hits,
                "cache_misses": m.cache_misses,
                "cache_hit_ratio": m.cache_hit_ratio(),
                "cache_stale_evictions": m.cache_stale_evictions,
                "attr_restores": m.attr_restores,
                "attr_restore_failures": m.attr_restore_failures,
                "batch_aborts": m.batch_aborts,
            }
        });
        println!("{}", serde_json::to_string_pretty(&v)?);
        if reset {
            metrics::reset();
        }
        return Ok(());
    }

    println!("{}", cfg);
    match cache_count {
        Some(n) => println!("cache: enabled, {} entr(ies)", n),
        None => println!("cache: disabled"),
    }
    println!(
        "streams: reads={} writes={} ({} B) deletes={}",
        m.stream_reads, m.stream_writes, m.stream_bytes_written, m.stream_deletes
    );
    println!(
        "cache: hits={} misses={} ratio={:.3} stale_evictions={}",
        m.cache_hits,
        m.cache_misses,
        m.cache_hit_ratio(),
        m.cache_stale_evictions
    );
    println!(
        "attrs: restores={} failures={}; batch_aborts={}",
        m.attr_restores, m.attr_restore_failures, m.batch_aborts
    );
    if reset {
        metrics::reset();
        println!("metrics: reset");
    }
    Ok(())
}
