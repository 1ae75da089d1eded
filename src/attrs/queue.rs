//! RestoreQueue - отложенное восстановление атрибутов/mtime на весь батч.
//!
//! Снимки копятся по мере обработки файлов и восстанавливаются вместе в
//! flush(). Если flush() не был вызван (ранний return, panic), Drop делает
//! то же самое: host-файл не остаётся со снятыми атрибутами ни на каком пути.
//!
//! Порядок восстановления - LIFO: при повторе пути в батче последним
//! применяется самый ранний (исходный) снимок.

use std::path::Path;

use log::warn;

use super::AttrSnapshot;
use crate::error::AttrWarning;

#[derive(Debug, Default)]
pub struct RestoreQueue {
    pending: Vec<AttrSnapshot>,
    warnings: Vec<AttrWarning>,
}

impl RestoreQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snap: AttrSnapshot) {
        self.pending.push(snap);
    }

    /// Record a warning raised before the restore step (failed capture or strip).
    pub fn note(&mut self, w: AttrWarning) {
        warn!("attribute warning: {}", w);
        self.warnings.push(w);
    }

    /// true, если для `path` уже есть отложенный снимок.
    pub fn covers(&self, path: &Path) -> bool {
        self.pending.iter().any(|s| s.path() == path)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Restore everything queued; returns all warnings collected so far.
    pub fn flush(mut self) -> Vec<AttrWarning> {
        self.drain()
    }

    fn drain(&mut self) -> Vec<AttrWarning> {
        while let Some(snap) = self.pending.pop() {
            let w = snap.restore();
            self.warnings.extend(w);
        }
        std::mem::take(&mut self.warnings)
    }
}

impl Drop for RestoreQueue {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            // Предупреждения уже залогированы в restore(); вызывающему их не вернуть.
            let _ = self.drain();
        }
    }
}
