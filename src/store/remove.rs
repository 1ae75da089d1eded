//! remove - удаление записей (поток + кэш) с сохранением атрибутов.
//!
//! Best-effort: отсутствующий поток или отсутствующий host-файл - не ошибка.
//! Повторный remove() того же файла - no-op.

use std::path::{Path, PathBuf};

use log::debug;

use super::MetaStore;
use crate::attrs::{AttrSnapshot, RestoreQueue};
use crate::error::{AttrStep, AttrWarning, MetaError};
use crate::stream::StreamIo;
use crate::util::cache_key;

#[derive(Debug, Clone)]
pub enum RemoveOp {
    Single(PathBuf),
    Batch(Vec<PathBuf>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoveReport {
    pub files: usize,
    pub warnings: Vec<AttrWarning>,
}

impl<S: StreamIo> MetaStore<S> {
    pub fn remove(&self, op: RemoveOp) -> RemoveReport {
        match op {
            RemoveOp::Single(file) => self.remove_one(&file),
            RemoveOp::Batch(files) => self.remove_batch(&files),
        }
    }

    pub fn remove_one(&self, file: &Path) -> RemoveReport {
        self.remove_items(std::iter::once(file))
    }

    pub fn remove_batch(&self, files: &[PathBuf]) -> RemoveReport {
        self.remove_items(files.iter().map(PathBuf::as_path))
    }

    fn remove_items<'a, I>(&self, files: I) -> RemoveReport
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut queue = RestoreQueue::new();
        let mut files_done = 0usize;

        for file in files {
            self.remove_item(file, &mut queue);
            files_done += 1;
        }

        let report = RemoveReport {
            files: files_done,
            warnings: queue.flush(),
        };
        debug!(
            "remove: {} file(s), {} warning(s)",
            report.files,
            report.warnings.len()
        );
        report
    }

    fn remove_item(&self, file: &Path, queue: &mut RestoreQueue) {
        if !queue.covers(file) {
            match AttrSnapshot::capture(file, self.cfg.archive_policy) {
                Ok(snap) => {
                    if let Err(w) = snap.strip() {
                        queue.note(w);
                    }
                    queue.push(snap);
                }
                // host-файла нет - восстанавливать нечего.
                Err(MetaError::MissingFile { .. }) => {}
                Err(e) => queue.note(AttrWarning::new(file, AttrStep::Capture, e)),
            }
        }

        let _ = self.cache.delete(&cache_key(file), self.cache_id());
        self.io.delete(&self.stream_path(file));
    }
}
