//! stream/path - адрес side-channel'а `<host>:<stream>` и long-path переписывание.
//!
//! Long paths: путь длиной >= LONG_PATH_THRESHOLD символов получает `\\?\`
//! (или `\\?\UNC\` для `\\server\share`) перед любым вызовом ОС. Префикс
//! живёт только в `os_path()`; ключи кэша и значения для вызывающего его не видят.

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::{
    LONG_PATH_PREFIX, LONG_PATH_THRESHOLD, LONG_UNC_PREFIX, STREAM_SEP,
};
use crate::error::{MetaError, Result};
use crate::util::absolute_path;

/// Rewrite a Win32 path with the long-path prefix if it is at or above the threshold.
///
/// Pure string transform, available on every platform. `\\?\` turns off Win32
/// normalization, so only absolute paths (`X:\...`, `\\server\share\...`) are
/// prefixed, with `.`/`..` collapsed first. Relative paths come back unchanged;
/// callers resolve them via `os_path()`.
pub fn with_long_path_prefix(path: &str) -> Cow<'_, str> {
    if path.chars().count() < LONG_PATH_THRESHOLD || path.starts_with(LONG_PATH_PREFIX) {
        return Cow::Borrowed(path);
    }
    // \\?\ отключает нормализацию - разделители должны быть обратными.
    let normalized = path.replace('/', "\\");
    if let Some(unc) = normalized.strip_prefix(r"\\") {
        let mut parts = unc.splitn(3, '\\');
        let server = parts.next().unwrap_or("");
        let share = parts.next().unwrap_or("");
        if server.is_empty() || share.is_empty() {
            return Cow::Borrowed(path);
        }
        let rest = collapse_dots(parts.next().unwrap_or(""));
        return Cow::Owned(format!("{LONG_UNC_PREFIX}{server}\\{share}\\{rest}"));
    }
    if is_drive_absolute(&normalized) {
        let (drive, rest) = normalized.split_at(3);
        return Cow::Owned(format!("{LONG_PATH_PREFIX}{drive}{}", collapse_dots(rest)));
    }
    Cow::Borrowed(path)
}

// `C:\...`
fn is_drive_absolute(p: &str) -> bool {
    let b = p.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && b[2] == b'\\'
}

// Лексически: пустые сегменты и `.` выбрасываются, `..` снимает предыдущий (не выше корня).
fn collapse_dots(rest: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in rest.split('\\') {
        match seg {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("\\")
}

/// Path handed to the OS for `path`: absolute + prefixed on Windows, unchanged elsewhere.
pub fn os_path(path: &Path) -> PathBuf {
    if cfg!(windows) {
        let abs = absolute_path(path);
        let prefixed = match with_long_path_prefix(&abs.to_string_lossy()) {
            Cow::Owned(p) => Some(PathBuf::from(p)),
            Cow::Borrowed(_) => None,
        };
        prefixed.unwrap_or(abs)
    } else {
        path.to_path_buf()
    }
}

/// Reject stream names that would change the meaning of `<host>:<stream>`.
pub fn validate_stream_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name.contains(STREAM_SEP) {
        Some("contains ':'")
    } else if name.contains('/') || name.contains('\\') {
        Some("contains a path separator")
    } else if name.contains('\0') {
        Some("contains NUL")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(MetaError::InvalidStreamName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// `<host>:<stream>` address of one side-channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamPath {
    host: PathBuf,
    stream: String,
}

impl StreamPath {
    pub fn new(host: impl Into<PathBuf>, stream: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            stream: stream.into(),
        }
    }

    #[inline]
    pub fn host(&self) -> &Path {
        &self.host
    }

    #[inline]
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// `<host>:<stream>` as the caller sees it (never prefixed).
    pub fn joined(&self) -> PathBuf {
        let mut s = self.host.as_os_str().to_os_string();
        s.push(STREAM_SEP.to_string());
        s.push(&self.stream);
        PathBuf::from(s)
    }

    /// Path for the OS call (long-path prefix applied where the platform needs it).
    pub fn os_path(&self) -> PathBuf {
        os_path(&self.joined())
    }
}

impl fmt::Display for StreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.host.display(), STREAM_SEP, self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_paths_untouched() {
        let p = r"C:\media\movie.mkv:Meta";
        assert!(matches!(with_long_path_prefix(p), Cow::Borrowed(_)));
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut p = String::from(r"C:\media\");
        while p.chars().count() < LONG_PATH_THRESHOLD - 1 {
            p.push('x');
        }
        assert_eq!(with_long_path_prefix(&p), p.as_str(), "239 chars stay as is");
        p.push('x');
        assert_eq!(p.chars().count(), LONG_PATH_THRESHOLD);
        assert_eq!(with_long_path_prefix(&p), format!(r"\\?\{p}"));
    }

    #[test]
    fn unc_and_forward_slashes() {
        let p = format!(r"\\nas\share\{}", "d/".repeat(130));
        let got = with_long_path_prefix(&p);
        assert!(got.starts_with(r"\\?\UNC\nas\share\"), "{got}");
        assert!(!got.contains('/'));
    }

    #[test]
    fn relative_paths_are_not_prefixed() {
        let p = format!(r"media\{}\movie.mkv:Meta", "d".repeat(250));
        assert!(matches!(with_long_path_prefix(&p), Cow::Borrowed(_)));
        let dotted = format!(r"..\{}\movie.mkv", "d".repeat(250));
        assert_eq!(with_long_path_prefix(&dotted), dotted.as_str());
    }

    #[test]
    fn dot_segments_are_collapsed_before_prefixing() {
        let tail = "d".repeat(250);
        let p = format!(r"C:\media\..\{tail}\.\movie.mkv:Meta");
        assert_eq!(
            with_long_path_prefix(&p),
            format!(r"\\?\C:\{tail}\movie.mkv:Meta")
        );

        let up = format!(r"C:\..\..\{tail}");
        assert_eq!(with_long_path_prefix(&up), format!(r"\\?\C:\{tail}"), "never above the root");

        let unc = format!(r"\\nas\share\a\..\{tail}");
        assert_eq!(with_long_path_prefix(&unc), format!(r"\\?\UNC\nas\share\{tail}"));
    }

    #[test]
    fn already_prefixed_is_kept() {
        let p = format!(r"\\?\C:\{}", "x".repeat(300));
        assert_eq!(with_long_path_prefix(&p), p.as_str());
    }

    #[test]
    fn joined_and_display() {
        let sp = StreamPath::new("/tmp/movie.mkv", "Meta");
        assert_eq!(sp.to_string(), "/tmp/movie.mkv:Meta");
        assert_eq!(sp.joined(), PathBuf::from("/tmp/movie.mkv:Meta"));
        assert_eq!(sp.host(), Path::new("/tmp/movie.mkv"));
        assert_eq!(sp.stream(), "Meta");
    }

    #[test]
    fn stream_names() {
        assert!(validate_stream_name("Meta").is_ok());
        assert!(validate_stream_name("media.info").is_ok());
        for bad in ["", "a:b", "a/b", "a\\b", "a\0"] {
            assert!(validate_stream_name(bad).is_err(), "{bad:?}");
        }
    }
}
