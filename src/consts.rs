//! Общие константы: имя потока, namespace кэша, long-path, зарезервированные ключи записи.

// -------- Stream --------
/// Имя потока по умолчанию (`<file>:Meta`).
pub const DEFAULT_STREAM_NAME: &str = "Meta";

/// Separator between the host path and the stream name.
pub const STREAM_SEP: char = ':';

// -------- Cache --------
/// Namespace, используемый при `id = None`.
pub const DEFAULT_CACHE_ID: &str = "default";

// -------- Long paths (Win32) --------
// Пути длиной >= порога переписываются с префиксом до любого вызова ОС.
pub const LONG_PATH_THRESHOLD: usize = 240;
pub const LONG_PATH_PREFIX: &str = r"\\?\";
pub const LONG_UNC_PREFIX: &str = r"\\?\UNC\";

// -------- Record --------
pub const KEY_LAST_MODIFIED: &str = "last_modified";
pub const KEY_LAST_SIZE: &str = "last_size";
pub const RESERVED_KEYS: [&str; 2] = [KEY_LAST_MODIFIED, KEY_LAST_SIZE];
