// Unix: read-only = нет ни одного write-бита в mode; hidden = имя с точки.
// system/archive не существуют.

use std::fs::{self, Metadata, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::FileAttrs;

pub(super) const BLOCKING: FileAttrs = FileAttrs {
    readonly: true,
    system: false,
    hidden: false,
    archive: false,
};

pub(super) fn raw(md: &Metadata) -> u32 {
    md.permissions().mode()
}

pub(super) fn decode(path: &Path, raw: u32) -> FileAttrs {
    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false);
    FileAttrs {
        readonly: raw & 0o222 == 0,
        system: false,
        hidden,
        archive: false,
    }
}

/// Set mode so that read-only matches `want`, starting from the captured mode.
pub(super) fn apply(path: &Path, original: u32, want: FileAttrs) -> io::Result<()> {
    let was_ro = original & 0o222 == 0;
    let mode = match (was_ro, want.readonly) {
        (true, false) => original | 0o200,
        (false, true) => original & !0o222,
        _ => original,
    };
    fs::set_permissions(path, Permissions::from_mode(mode & 0o7777))
}
