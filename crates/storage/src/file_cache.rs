use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::repository::{LocalCache, StorageError};

/// Directory-backed local cache: one file per key.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

fn io<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Io(e.to_string())
}

impl FileCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl LocalCache for FileCache {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.slot_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io(err)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(io)?;
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io)?;
        fs::rename(&tmp, &path).map_err(io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::OVERRIDES_KEY;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("quiz-file-cache-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn missing_slot_reads_none() {
        let cache = FileCache::new(scratch_dir());
        assert_eq!(cache.read(OVERRIDES_KEY).unwrap(), None);
    }

    #[test]
    fn write_creates_directory_and_overwrites() {
        let dir = scratch_dir();
        let cache = FileCache::new(&dir);
        cache.write(OVERRIDES_KEY, "[1]").unwrap();
        cache.write(OVERRIDES_KEY, "[]").unwrap();

        assert_eq!(cache.read(OVERRIDES_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.join("jlpt-custom-questions.json").exists());
        assert!(!dir.join("jlpt-custom-questions.json.tmp").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let cache = FileCache::new("/tmp/x");
        assert_eq!(
            cache.slot_path("../etc/passwd"),
            PathBuf::from("/tmp/x/___etc_passwd.json")
        );
    }
}
