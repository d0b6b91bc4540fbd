// Persisted key-value slots backing the task list

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key under which the task list is stored
pub const TODOS_KEY: &str = "todos";

/// A local key-value store holding whole string values
///
/// Reads never fail: a missing or unreadable value is `None`. Writes replace
/// the previous value entirely.
pub trait Slot {
    fn read(&self, key: &str) -> Option<String>;

    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: Slot + ?Sized> Slot for Box<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Slot key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Slot key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid slot key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

// ============================================================================
// File backend
// ============================================================================

/// One `{key}.json` file per key inside a directory
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Open a file slot rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).context("Failed to create slot directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Slot for FileSlot {
    fn read(&self, key: &str) -> Option<String> {
        if validate_key(key).is_err() {
            return None;
        }

        let path = self.path_for(key);
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(file = ?path, error = ?e, "Failed to read slot file");
                None
            }
        }
    }

    /// Replace the value via a temp file renamed over the old one
    ///
    /// Writers serialize on `{key}.lock`. Readers never see a partial file.
    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(format!("{}.lock", key)))
            .context("Failed to open slot lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = File::create(&tmp_path).context("Failed to create temp slot file")?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path).context("Failed to move temp slot file into place")?;

        debug!(file = ?path, bytes = value.len(), "Wrote slot file");
        // Lock is released when `lock` is dropped
        Ok(())
    }
}

// ============================================================================
// SQLite backend
// ============================================================================

/// Key-value table inside a SQLite database file
pub struct SqliteSlot {
    db: Connection,
}

impl SqliteSlot {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create slot directory")?;
        }
        let db = Connection::open(path.as_ref()).context("Failed to open SQLite database")?;
        Self::from_connection(db)
    }

    pub fn in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        Self::from_connection(db)
    }

    fn from_connection(db: Connection) -> Result<Self> {
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { db })
    }
}

impl Slot for SqliteSlot {
    fn read(&self, key: &str) -> Option<String> {
        if validate_key(key).is_err() {
            return None;
        }

        let result = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, String>(0))
            .optional();

        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = ?e, "Failed to read slot row");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        debug!(key, bytes = value.len(), "Wrote slot row");
        Ok(())
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Process-local slot; counts writes
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut slot = Self::default();
        slot.values.insert(key.to_string(), value.into());
        slot
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> Option<String> {
        validate_key(key).ok()?;
        self.values.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_slot_missing_key() {
        let temp = TempDir::new().unwrap();
        let slot = FileSlot::open(temp.path()).unwrap();
        assert!(slot.read(TODOS_KEY).is_none());
    }

    #[test]
    fn test_file_slot_overwrites() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path().join("nested")).unwrap();

        slot.write(TODOS_KEY, "[1,2,3,4,5,6]").unwrap();
        slot.write(TODOS_KEY, "[]").unwrap();

        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("[]"));
        let content = fs::read_to_string(slot.path_for(TODOS_KEY)).unwrap();
        assert_eq!(content, "[]");
    }

    #[test]
    fn test_file_slot_write_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path()).unwrap();
        assert_eq!(slot.dir(), temp.path());

        slot.write(TODOS_KEY, "[]").unwrap();
        assert!(slot.path_for(TODOS_KEY).exists());
        assert!(!slot.dir().join("todos.json.tmp").exists());
    }

    #[test]
    fn test_file_slot_ignores_interrupted_write() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path()).unwrap();
        slot.write(TODOS_KEY, "[\"kept\"]").unwrap();

        // A writer that died before renaming leaves only the temp file behind
        fs::write(slot.dir().join("todos.json.tmp"), "[\"half").unwrap();
        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("[\"kept\"]"));

        slot.write(TODOS_KEY, "[]").unwrap();
        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_slot_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let mut slot = FileSlot::open(temp.path()).unwrap();

        assert!(slot.write("../escape", "x").is_err());
        assert!(slot.read("../escape").is_none());
    }

    #[test]
    fn test_sqlite_slot_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("slots.db");

        {
            let mut slot = SqliteSlot::open(&path).unwrap();
            assert!(slot.read(TODOS_KEY).is_none());
            slot.write(TODOS_KEY, "first").unwrap();
            slot.write(TODOS_KEY, "second").unwrap();
        }

        let slot = SqliteSlot::open(&path).unwrap();
        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("second"));
    }

    #[test]
    fn test_sqlite_slot_in_memory() {
        let mut slot = SqliteSlot::in_memory().unwrap();
        slot.write(TODOS_KEY, "[]").unwrap();
        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("[]"));
        assert!(slot.write("a/b", "x").is_err());
        assert!(slot.read("a/b").is_none());
    }

    #[test]
    fn test_memory_slot_counts_writes() {
        let mut slot = MemorySlot::with_value(TODOS_KEY, "[]");
        assert_eq!(slot.write_count(), 0);

        slot.write(TODOS_KEY, "[ ]").unwrap();
        assert_eq!(slot.write_count(), 1);
        assert_eq!(slot.read(TODOS_KEY).as_deref(), Some("[ ]"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("my-list_2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }
}
