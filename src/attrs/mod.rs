//! attrs - снимок и восстановление атрибутов host-файла вокруг мутации потока.
//!
//! Поток: capture() → strip() (снять биты, блокирующие запись потока) →
//! запись/удаление потока → restore() (mtime, затем атрибуты).
//!
//! - На Windows блокирующие биты: read-only, system, hidden.
//! - На прочих платформах: read-only (write-биты mode); mode восстанавливается точно.
//!
//! Archive-бит: политика `ArchivePolicy`. По умолчанию `Drop` - бит снимается и
//! не восстанавливается (ОС сама управляет им при записи). `Preserve` - вернуть как было.
//!
//! mtime восстанавливается через `filetime` с точностью, которую даёт ФС.

mod queue;

#[cfg(windows)]
#[path = "windows.rs"]
mod native;

#[cfg(not(windows))]
#[path = "unix.rs"]
mod native;

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use filetime::FileTime;
use log::warn;

use crate::error::{AttrStep, AttrWarning, MetaError, Result};
use crate::metrics::record_attr_restore;
use crate::stream::os_path;

pub use queue::RestoreQueue;

/// The four attribute bits the store keeps invisible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileAttrs {
    pub readonly: bool,
    pub system: bool,
    pub hidden: bool,
    pub archive: bool,
}

impl FileAttrs {
    #[inline]
    pub fn any(&self) -> bool {
        self.readonly || self.system || self.hidden || self.archive
    }

    /// self без битов из `mask`.
    pub fn without(self, mask: FileAttrs) -> FileAttrs {
        FileAttrs {
            readonly: self.readonly && !mask.readonly,
            system: self.system && !mask.system,
            hidden: self.hidden && !mask.hidden,
            archive: self.archive && !mask.archive,
        }
    }

    /// Only the bits set in both.
    pub fn intersect(self, other: FileAttrs) -> FileAttrs {
        FileAttrs {
            readonly: self.readonly && other.readonly,
            system: self.system && other.system,
            hidden: self.hidden && other.hidden,
            archive: self.archive && other.archive,
        }
    }
}

impl fmt::Display for FileAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            flag(self.readonly, 'R'),
            flag(self.system, 'S'),
            flag(self.hidden, 'H'),
            flag(self.archive, 'A')
        )
    }
}

/// What happens to the archive bit after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArchivePolicy {
    /// Clear and do not restore.
    #[default]
    Drop,
    /// Restore the captured value.
    Preserve,
}

impl FromStr for ArchivePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" | "clear" => Ok(ArchivePolicy::Drop),
            "preserve" | "keep" => Ok(ArchivePolicy::Preserve),
            other => Err(format!("unknown archive policy '{}'", other)),
        }
    }
}

impl fmt::Display for ArchivePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchivePolicy::Drop => f.write_str("drop"),
            ArchivePolicy::Preserve => f.write_str("preserve"),
        }
    }
}

/// Bits that would make the side-channel write fail on this platform.
pub fn blocking_mask() -> FileAttrs {
    native::BLOCKING
}

/// Current attribute bits of `path`.
pub fn read_attrs(path: &Path) -> std::io::Result<FileAttrs> {
    let md = std::fs::metadata(os_path(path))?;
    Ok(native::decode(path, native::raw(&md)))
}

/// Attributes + mtime of one host file, captured right before a mutation.
#[derive(Debug, Clone)]
pub struct AttrSnapshot {
    path: PathBuf,
    attrs: FileAttrs,
    raw: u32,
    mtime: FileTime,
    policy: ArchivePolicy,
}

impl AttrSnapshot {
    /// Snapshot `path`. A missing host file is `MissingFile`.
    pub fn capture(path: &Path, policy: ArchivePolicy) -> Result<Self> {
        let md = std::fs::metadata(os_path(path)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MetaError::MissingFile {
                    path: path.to_path_buf(),
                }
            } else {
                MetaError::io(path.display().to_string(), e)
            }
        })?;
        let raw = native::raw(&md);
        Ok(Self {
            path: path.to_path_buf(),
            attrs: native::decode(path, raw),
            raw,
            mtime: FileTime::from_last_modification_time(&md),
            policy,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn attrs(&self) -> FileAttrs {
        self.attrs
    }

    #[inline]
    pub fn mtime(&self) -> FileTime {
        self.mtime
    }

    /// Bits cleared for the duration of the write window.
    pub fn strip_set(&self) -> FileAttrs {
        self.attrs.intersect(blocking_mask())
    }

    /// Bits re-applied on restore (archive subject to the policy).
    pub fn reapply_set(&self) -> FileAttrs {
        let mut out = self.attrs;
        if self.policy == ArchivePolicy::Drop {
            out.archive = false;
        }
        out
    }

    /// Снять блокирующие биты. No-op, если снимать нечего.
    pub fn strip(&self) -> std::result::Result<(), AttrWarning> {
        let strip = self.strip_set();
        if !strip.any() {
            return Ok(());
        }
        native::apply(&os_path(&self.path), self.raw, self.attrs.without(strip))
            .map_err(|e| AttrWarning::new(&self.path, AttrStep::Strip, e))
    }

    /// Restore mtime, then attributes. Failures are returned, never raised.
    pub fn restore(&self) -> Vec<AttrWarning> {
        let p = os_path(&self.path);
        let mut warnings = Vec::new();

        // mtime первым: атрибуты ещё сняты, read-only не мешает.
        if let Err(e) = filetime::set_file_mtime(&p, self.mtime) {
            warnings.push(AttrWarning::new(&self.path, AttrStep::RestoreMtime, e));
        }

        let target = self.reapply_set();
        let changed = self.strip_set().any() || target != self.attrs;
        if changed {
            if let Err(e) = native::apply(&p, self.raw, target) {
                warnings.push(AttrWarning::new(&self.path, AttrStep::RestoreAttrs, e));
            }
        }

        record_attr_restore(warnings.is_empty());
        for w in &warnings {
            warn!("attribute restore failed: {}", w);
        }
        warnings
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn unique_file(prefix: &str) -> PathBuf {
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = std::env::temp_dir().join(format!("smtest-{prefix}-{}-{t}", std::process::id()));
        fs::write(&p, b"x").unwrap();
        p
    }

    #[test]
    fn readonly_strip_and_restore_mode_exactly() {
        let p = unique_file("attrs-ro");
        fs::set_permissions(&p, fs::Permissions::from_mode(0o440)).unwrap();
        let old = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&p, old).unwrap();

        let snap = AttrSnapshot::capture(&p, ArchivePolicy::Drop).unwrap();
        assert!(snap.attrs().readonly);
        assert!(snap.strip_set().readonly);

        snap.strip().unwrap();
        assert!(!read_attrs(&p).unwrap().readonly, "write window must be open");

        fs::write(&p, b"changed").unwrap();
        assert!(snap.restore().is_empty());

        let md = fs::metadata(&p).unwrap();
        assert_eq!(md.permissions().mode() & 0o777, 0o440);
        assert_eq!(FileTime::from_last_modification_time(&md).unix_seconds(), 1_600_000_000);
        let _ = fs::set_permissions(&p, fs::Permissions::from_mode(0o644));
        let _ = fs::remove_file(&p);
    }

    #[test]
    fn hidden_is_reported_from_dot_name() {
        let dir = std::env::temp_dir();
        let name = format!(".smtest-hidden-{}", std::process::id());
        let p = dir.join(name);
        fs::write(&p, b"x").unwrap();
        let a = read_attrs(&p).unwrap();
        assert!(a.hidden && !a.system && !a.archive);
        assert!(!blocking_mask().hidden);
        let _ = fs::remove_file(&p);
    }

    #[test]
    fn missing_file_is_distinguishable() {
        let p = std::env::temp_dir().join("smtest-definitely-missing-file");
        match AttrSnapshot::capture(&p, ArchivePolicy::Drop) {
            Err(MetaError::MissingFile { path }) => assert_eq!(path, p),
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[test]
    fn policy_and_display() {
        assert_eq!("Preserve".parse::<ArchivePolicy>().unwrap(), ArchivePolicy::Preserve);
        assert_eq!("drop".parse::<ArchivePolicy>().unwrap(), ArchivePolicy::Drop);
        assert!("sometimes".parse::<ArchivePolicy>().is_err());
        let a = FileAttrs { readonly: true, archive: true, ..Default::default() };
        assert_eq!(a.to_string(), "R--A");
    }
}
