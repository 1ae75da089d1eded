//! save - запись записей в side-channel с сохранением атрибутов host-файла.
//!
//! На каждый элемент: сериализация → снимок атрибутов/mtime (+ снятие
//! блокирующих битов) → запись потока → кэш. Восстановление откладывается
//! в RestoreQueue и выполняется одним проходом в конце.
//!
//! Fail-fast: первая ошибка прерывает батч. Уже записанные элементы остаются
//! записанными; элементы после упавшего не трогаются (ни поток, ни кэш, ни
//! атрибуты). Атрибуты упавшего и предыдущих элементов восстанавливаются.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::MetaStore;
use crate::attrs::{AttrSnapshot, RestoreQueue};
use crate::error::{AttrWarning, MetaError, Result};
use crate::metrics::record_batch_abort;
use crate::record::Record;
use crate::stream::StreamIo;
use crate::util::cache_key;

/// One file or an ordered batch.
#[derive(Debug, Clone)]
pub enum SaveOp {
    Single(PathBuf, Record),
    Batch(Vec<(PathBuf, Record)>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    /// Total bytes written to side-channels.
    pub bytes: usize,
    pub files: usize,
    /// Non-fatal attribute/timestamp failures.
    pub warnings: Vec<AttrWarning>,
}

impl<S: StreamIo> MetaStore<S> {
    pub fn save(&self, op: SaveOp) -> Result<SaveReport> {
        match op {
            SaveOp::Single(file, rec) => self.save_one(&file, &rec),
            SaveOp::Batch(items) => self.save_batch(&items),
        }
    }

    /// Errors are returned as-is (path + cause), wrapped in `WithWarnings`
    /// only when the attribute restore after the failure also went wrong.
    pub fn save_one(&self, file: &Path, rec: &Record) -> Result<SaveReport> {
        self.save_items(std::iter::once((file, rec)), false)
    }

    /// Errors are wrapped in `BatchAbort` with the failing index.
    pub fn save_batch(&self, items: &[(PathBuf, Record)]) -> Result<SaveReport> {
        self.save_items(items.iter().map(|(p, r)| (p.as_path(), r)), true)
    }

    fn save_items<'a, I>(&self, items: I, batch: bool) -> Result<SaveReport>
    where
        I: IntoIterator<Item = (&'a Path, &'a Record)>,
    {
        let mut queue = RestoreQueue::new();
        let mut report = SaveReport::default();

        for (index, (file, rec)) in items.into_iter().enumerate() {
            match self.save_item(file, rec, &mut queue) {
                Ok(n) => {
                    report.bytes += n;
                    report.files += 1;
                }
                Err(e) => {
                    let warnings = queue.flush();
                    if !batch {
                        return Err(e.with_warnings(warnings));
                    }
                    record_batch_abort();
                    warn!(
                        "save: processed {} item(s), failed at #{} {}: {}",
                        report.files,
                        index,
                        file.display(),
                        e
                    );
                    return Err(MetaError::BatchAbort {
                        index,
                        path: file.to_path_buf(),
                        source: Box::new(e),
                        warnings,
                    });
                }
            }
        }

        report.warnings = queue.flush();
        debug!(
            "save: {} file(s), {} B, {} warning(s)",
            report.files,
            report.bytes,
            report.warnings.len()
        );
        Ok(report)
    }

    fn save_item(&self, file: &Path, rec: &Record, queue: &mut RestoreQueue) -> Result<usize> {
        let sp = self.stream_path(file);
        let raw = rec.to_json().map_err(|e| MetaError::Codec {
            path: sp.to_string(),
            source: e,
        })?;

        // Повтор пути в батче: исходный снимок уже в очереди, биты уже сняты.
        if !queue.covers(file) {
            let snap = AttrSnapshot::capture(file, self.cfg.archive_policy)?;
            if let Err(w) = snap.strip() {
                queue.note(w);
            }
            queue.push(snap);
        }

        let n = self.io.write(&sp, &raw)?;
        let _ = self.cache.set(&cache_key(file), &raw, self.cache_id());
        Ok(n)
    }
}
