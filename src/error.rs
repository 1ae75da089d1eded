//! Typed errors of the metadata store.
//!
//! - `NotFound` / `Io` / `Codec` - граница ОС и сериализации (Side-Channel I/O).
//! - `CacheMiss` - отдельный тип (не вариант MetaError), который возвращают все
//!   операции кэша; store превращает его в fallback на чтение потока.
//! - `MissingFile` - misuse: save() для несуществующего host-файла.
//! - `BatchAbort` - первая ошибка батча + индекс/путь упавшего элемента.
//! - `WithWarnings` - ошибка одиночной операции, после которой восстановление
//!   атрибутов/mtime тоже не удалось (без предупреждений ошибка отдаётся как есть).
//!
//! Ошибки восстановления атрибутов/mtime не фатальны: это `AttrWarning`,
//! которые логируются и возвращаются в отчёте операции.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetaError>;

/// Cache miss: namespace disabled or key absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cache miss")]
pub struct CacheMiss;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("no metadata stream at {path}")]
    NotFound { path: String },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("record codec error at {path}: {source}")]
    Codec {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("host file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("invalid stream name {name:?}: {reason}")]
    InvalidStreamName { name: String, reason: &'static str },

    #[error("batch aborted at item {index} ({}): {source}", path.display())]
    BatchAbort {
        index: usize,
        path: PathBuf,
        #[source]
        source: Box<MetaError>,
        warnings: Vec<AttrWarning>,
    },

    #[error("{source} ({} attribute warning(s))", warnings.len())]
    WithWarnings {
        #[source]
        source: Box<MetaError>,
        warnings: Vec<AttrWarning>,
    },
}

impl MetaError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        MetaError::Io {
            path: path.into(),
            source,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetaError::NotFound { .. })
    }

    /// Index of the failing item for batch errors.
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            MetaError::BatchAbort { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Ошибка по конкретному файлу (разворачивает BatchAbort/WithWarnings).
    pub fn root_cause(&self) -> &MetaError {
        match self {
            MetaError::BatchAbort { source, .. } | MetaError::WithWarnings { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Attribute/timestamp warnings collected before the failure was returned.
    pub fn warnings(&self) -> &[AttrWarning] {
        match self {
            MetaError::BatchAbort { warnings, .. } | MetaError::WithWarnings { warnings, .. } => {
                warnings.as_slice()
            }
            _ => &[],
        }
    }

    /// Attach restore warnings to a single-operation error; no-op when there are none.
    pub(crate) fn with_warnings(self, warnings: Vec<AttrWarning>) -> Self {
        if warnings.is_empty() {
            self
        } else {
            MetaError::WithWarnings {
                source: Box::new(self),
                warnings,
            }
        }
    }
}

/// Which step of the attribute round-trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrStep {
    Capture,
    Strip,
    RestoreMtime,
    RestoreAttrs,
}

impl fmt::Display for AttrStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttrStep::Capture => "capture",
            AttrStep::Strip => "strip",
            AttrStep::RestoreMtime => "restore-mtime",
            AttrStep::RestoreAttrs => "restore-attrs",
        };
        f.write_str(s)
    }
}

/// Non-fatal attribute/timestamp failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrWarning {
    pub path: PathBuf,
    pub step: AttrStep,
    pub message: String,
}

impl AttrWarning {
    pub(crate) fn new(path: impl Into<PathBuf>, step: AttrStep, err: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            step,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for AttrWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path.display(), self.step, self.message)
    }
}
