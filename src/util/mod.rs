//! util - общие утилиты.
//!
//! Содержит:
//! - to_epoch_millis(): время в миллисекундах Unix epoch (i64).
//! - cache_key(): ключ кэша - абсолютный путь host-файла, без long-path префикса.
//! - parse_flag(): разбор ENV-флагов "1|true|yes|on".

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// SystemTime -> ms since epoch (negative for pre-1970 timestamps).
pub fn to_epoch_millis(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
        Err(e) => -i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX),
    }
}

/// Абсолютный путь без разрешения symlink'ов.
///
/// canonicalize() здесь не подходит: на Windows он возвращает `\\?\`-путь,
/// а префикс не должен попадать в ключ кэша.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Cache key for a host file.
pub fn cache_key(path: &Path) -> String {
    absolute_path(path).to_string_lossy().into_owned()
}

#[inline]
pub fn parse_flag(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "yes" || s == "on"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn epoch_millis_both_sides_of_epoch() {
        let after = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(to_epoch_millis(after), 1_700_000_000_123);
        let before = UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(to_epoch_millis(before), -1500);
        assert!(to_epoch_millis(SystemTime::now()) > 1_600_000_000_000);
    }

    #[test]
    fn cache_key_is_absolute() {
        let k = cache_key(Path::new("movie.mkv"));
        assert!(Path::new(&k).is_absolute(), "key must be absolute: {k}");
        assert!(k.ends_with("movie.mkv"));
        assert!(!k.starts_with(r"\\?\"));
    }

    #[test]
    fn flags() {
        for on in ["1", "true", " YES ", "On"] {
            assert!(parse_flag(on), "{on:?}");
        }
        for off in ["0", "false", "", "nope"] {
            assert!(!parse_flag(off), "{off:?}");
        }
    }
}
