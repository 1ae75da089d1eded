//! stream - Side-Channel I/O: read/write/exists/delete для `<file>:<stream>`.
//!
//! Разнесение:
//! - path.rs - StreamPath, long-path префикс, валидация имени потока.
//! - mod.rs  - трейт StreamIo и реализация AdsStreams поверх обычного файлового API.
//!
//! На NTFS `<file>:<stream>` открывается как alternate data stream того же файла.
//! На прочих ФС тот же путь - обычный соседний файл; семантика операций та же.
//!
//! Операции не паникуют на обычных условиях: отсутствие потока - `NotFound`,
//! всё остальное - `Io { path, source }`.

pub mod path;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};

use log::debug;

use crate::error::{MetaError, Result};
use crate::metrics::{record_stream_delete, record_stream_read, record_stream_write};

pub use path::{os_path, validate_stream_name, with_long_path_prefix, StreamPath};

/// Byte-level access to side-channels. Implemented by `AdsStreams`; tests wrap it.
pub trait StreamIo {
    /// true iff the side-channel resolves to existing content.
    fn exists(&self, sp: &StreamPath) -> bool;

    /// Full contents decoded as UTF-8.
    fn read(&self, sp: &StreamPath) -> Result<String>;

    /// Create or truncate, then write `contents`. Returns bytes written.
    fn write(&self, sp: &StreamPath, contents: &str) -> Result<usize>;

    /// Best-effort delete of the side-channel only.
    fn delete(&self, sp: &StreamPath);
}

impl<T: StreamIo + ?Sized> StreamIo for &T {
    fn exists(&self, sp: &StreamPath) -> bool {
        (**self).exists(sp)
    }
    fn read(&self, sp: &StreamPath) -> Result<String> {
        (**self).read(sp)
    }
    fn write(&self, sp: &StreamPath, contents: &str) -> Result<usize> {
        (**self).write(sp, contents)
    }
    fn delete(&self, sp: &StreamPath) {
        (**self).delete(sp)
    }
}

/// OS-backed side-channels (NTFS ADS on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct AdsStreams;

impl StreamIo for AdsStreams {
    fn exists(&self, sp: &StreamPath) -> bool {
        fs::metadata(sp.os_path()).map(|m| m.is_file()).unwrap_or(false)
    }

    fn read(&self, sp: &StreamPath) -> Result<String> {
        let p = sp.os_path();
        let mut f = OpenOptions::new().read(true).open(&p).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MetaError::NotFound {
                    path: sp.to_string(),
                }
            } else {
                MetaError::io(sp.to_string(), e)
            }
        })?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .map_err(|e| MetaError::io(sp.to_string(), e))?;
        let s = String::from_utf8(buf).map_err(|e| {
            MetaError::io(sp.to_string(), std::io::Error::new(ErrorKind::InvalidData, e))
        })?;
        record_stream_read();
        debug!("stream read {} ({} B)", sp, s.len());
        Ok(s)
    }

    fn write(&self, sp: &StreamPath, contents: &str) -> Result<usize> {
        let p = sp.os_path();
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&p)
            .map_err(|e| MetaError::io(sp.to_string(), e))?;
        f.write_all(contents.as_bytes())
            .map_err(|e| MetaError::io(sp.to_string(), e))?;
        let n = contents.len();
        record_stream_write(n);
        debug!("stream write {} ({} B)", sp, n);
        Ok(n)
    }

    fn delete(&self, sp: &StreamPath) {
        // Удаляем только поток; отсутствие потока - не ошибка.
        match fs::remove_file(sp.os_path()) {
            Ok(()) => {
                record_stream_delete();
                debug!("stream delete {}", sp);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!("stream delete {} failed: {}", sp, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unique_file(prefix: &str) -> PathBuf {
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = std::env::temp_dir().join(format!("smtest-{prefix}-{}-{t}.bin", std::process::id()));
        fs::write(&p, b"host").unwrap();
        p
    }

    #[test]
    fn write_read_delete_cycle() {
        let host = unique_file("ads-cycle");
        let sp = StreamPath::new(&host, "Meta");
        let io = AdsStreams;

        assert!(!io.exists(&sp));
        assert!(io.read(&sp).unwrap_err().is_not_found());

        assert_eq!(io.write(&sp, "{\"a\":1}").unwrap(), 7);
        assert!(io.exists(&sp));
        assert_eq!(io.read(&sp).unwrap(), "{\"a\":1}");

        // truncate on overwrite
        io.write(&sp, "{}").unwrap();
        assert_eq!(io.read(&sp).unwrap(), "{}");

        io.delete(&sp);
        assert!(!io.exists(&sp));
        io.delete(&sp); // второй раз - тихо
        assert_eq!(fs::read(&host).unwrap(), b"host", "host contents untouched");
        let _ = fs::remove_file(&host);
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let host = unique_file("ads-utf8");
        let sp = StreamPath::new(&host, "Meta");
        fs::write(sp.os_path(), [0xff, 0xfe, 0x00]).unwrap();
        match AdsStreams.read(&sp) {
            Err(MetaError::Io { source, .. }) => assert_eq!(source.kind(), ErrorKind::InvalidData),
            other => panic!("expected Io(InvalidData), got {other:?}"),
        }
        AdsStreams.delete(&sp);
        let _ = fs::remove_file(&host);
    }
}
