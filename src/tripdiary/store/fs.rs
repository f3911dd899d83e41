use super::StorageBackend;
use crate::error::{Result, TripDiaryError};
use std::fs;
use std::path::{Path, PathBuf};

/// File-per-key storage under a single directory.
///
/// Writes go to a `.tmp` sibling first and are renamed into place so a crash
/// mid-write never leaves a half-written envelope behind.
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(TripDiaryError::Io)?;
        }
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(TripDiaryError::Io)?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(TripDiaryError::Io)?;
        fs::rename(&tmp, &path).map_err(TripDiaryError::Io)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(TripDiaryError::Io)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        assert_eq!(backend.get("trip-storage").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set("trip-storage", "{\"version\":3}").unwrap();
        assert_eq!(
            backend.get("trip-storage").unwrap().as_deref(),
            Some("{\"version\":3}")
        );
    }

    #[test]
    fn test_set_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("data");
        let backend = FileBackend::new(nested.clone());

        backend.set("trip-storage", "x").unwrap();
        assert!(nested.join("trip-storage.json").exists());
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());
        backend.set("trip-storage", "value").unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(
                !name.to_string_lossy().ends_with(".tmp"),
                "leftover tmp file: {:?}",
                name
            );
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().to_path_buf());

        backend.set("trip-storage", "value").unwrap();
        backend.remove("trip-storage").unwrap();
        assert_eq!(backend.get("trip-storage").unwrap(), None);

        // Absent key: still fine.
        backend.remove("trip-storage").unwrap();
    }
}
