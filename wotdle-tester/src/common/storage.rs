use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wotdle_game::KeyValueStorage;

#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Directory-backed storage: one `<key>.json` file per slot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    type Error = FileStorageError;

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(FileStorageError::Read { path, source }),
        }
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.root)
            .and_then(|()| fs::write(&path, blob))
            .map_err(|source| FileStorageError::Write { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "wotdle-storage-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn missing_file_reads_as_empty_slot() {
        let storage = FileStorage::new(temp_root("missing"));
        assert_eq!(storage.load("wotdle-store").unwrap(), None);
    }

    #[test]
    fn save_creates_directory_and_overwrites() {
        let root = temp_root("save");
        let storage = FileStorage::new(&root);
        storage.save("wotdle-store", "{\"version\":1}").unwrap();
        storage.save("wotdle-store", "{\"version\":2}").unwrap();
        assert!(root.join("wotdle-store.json").exists());
        assert_eq!(
            storage.load("wotdle-store").unwrap().as_deref(),
            Some("{\"version\":2}")
        );
    }

    #[test]
    fn unreadable_slot_is_an_error() {
        let root = temp_root("dir");
        let storage = FileStorage::new(&root);
        fs::create_dir_all(storage.path_for("wotdle-store")).unwrap();
        let err = storage.load("wotdle-store").unwrap_err();
        assert!(matches!(err, FileStorageError::Read { .. }));
    }
}
