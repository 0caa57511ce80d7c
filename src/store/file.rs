use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{KeyValueStore, StoreError};

/// Key-value store keeping one `<key>.json` file per key in a directory.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// reader never sees a partially written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", file_stem(key)));
        fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("values").unwrap().is_none());
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested").join("keyline"));
        store.set("values", r#"{"data":[]}"#).unwrap();
        let path = store.path_for("values");
        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(path).unwrap(), r#"{"data":[]}"#);
        assert_eq!(store.get("values").unwrap().as_deref(), Some(r#"{"data":[]}"#));
    }

    #[test]
    fn test_set_overwrites_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("values", "one").unwrap();
        store.set("values", "two").unwrap();
        assert_eq!(store.get("values").unwrap().as_deref(), Some("two"));
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, [std::ffi::OsString::from("values.json")]);
    }

    #[test]
    fn test_key_is_sanitized() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("../etc/x"), PathBuf::from("/data/___etc_x.json"));
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("values", "x").unwrap();
        store.remove("values").unwrap();
        assert!(store.get("values").unwrap().is_none());
        store.remove("values").unwrap();
    }
}
