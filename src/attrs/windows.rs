// Windows: FILE_ATTRIBUTE_* через MetadataExt::file_attributes / SetFileAttributesW.
// Прочие биты (NOT_CONTENT_INDEXED и т.п.) сохраняются как есть.

use std::fs::{self, Metadata};
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::fs::MetadataExt;
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::{
    SetFileAttributesW, FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_NORMAL,
    FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_SYSTEM,
};

use super::FileAttrs;

pub(super) const BLOCKING: FileAttrs = FileAttrs {
    readonly: true,
    system: true,
    hidden: true,
    archive: false,
};

const MANAGED: u32 =
    FILE_ATTRIBUTE_READONLY | FILE_ATTRIBUTE_SYSTEM | FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_ARCHIVE;

pub(super) fn raw(md: &Metadata) -> u32 {
    md.file_attributes()
}

pub(super) fn decode(_path: &Path, raw: u32) -> FileAttrs {
    FileAttrs {
        readonly: raw & FILE_ATTRIBUTE_READONLY != 0,
        system: raw & FILE_ATTRIBUTE_SYSTEM != 0,
        hidden: raw & FILE_ATTRIBUTE_HIDDEN != 0,
        archive: raw & FILE_ATTRIBUTE_ARCHIVE != 0,
    }
}

fn encode(a: FileAttrs) -> u32 {
    let mut v = 0;
    if a.readonly {
        v |= FILE_ATTRIBUTE_READONLY;
    }
    if a.system {
        v |= FILE_ATTRIBUTE_SYSTEM;
    }
    if a.hidden {
        v |= FILE_ATTRIBUTE_HIDDEN;
    }
    if a.archive {
        v |= FILE_ATTRIBUTE_ARCHIVE;
    }
    v
}

/// Replace the four managed bits with `want`, keep everything else from the current state.
pub(super) fn apply(path: &Path, _original: u32, want: FileAttrs) -> io::Result<()> {
    let current = fs::metadata(path)?.file_attributes();
    let mut value = (current & !(MANAGED | FILE_ATTRIBUTE_NORMAL)) | encode(want);
    if value == 0 {
        value = FILE_ATTRIBUTE_NORMAL;
    }
    let wide: Vec<u16> = path.as_os_str().encode_wide().chain(once(0)).collect();
    // SAFETY: `wide` is a NUL-terminated UTF-16 buffer that outlives the call.
    let ok = unsafe { SetFileAttributesW(wide.as_ptr(), value) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
