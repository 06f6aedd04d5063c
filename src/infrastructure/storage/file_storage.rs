use crate::application::ports::StorageBackend;
use crate::shared::config::StorageConfig;
use crate::shared::error::AppError;
use std::path::{Path, PathBuf};

/// Durable substrate: one file per key under a data directory, written
/// through on every mutation so a process restart never loses state.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, AppError> {
        let root = if config.data_dir.is_empty() {
            dirs::data_dir()
                .ok_or_else(|| {
                    AppError::ConfigurationError("no platform data directory".to_string())
                })?
                .join("habitpool")
        } else {
            PathBuf::from(&config.data_dir)
        };
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys may contain separators; flatten to a safe file name.
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.root.join(format!("{name}.json"))
    }

    fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), AppError> {
        Self::write_atomically(&self.path_for(key), bytes)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_the_filesystem() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::with_root(dir.path()).unwrap();

        storage.set("participations/0xabc", b"{}").unwrap();
        assert_eq!(
            storage.get("participations/0xabc").unwrap().as_deref(),
            Some(&b"{}"[..])
        );

        storage.remove("participations/0xabc").unwrap();
        assert_eq!(storage.get("participations/0xabc").unwrap(), None);
    }

    #[test]
    fn missing_keys_read_as_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::with_root(dir.path()).unwrap();
        assert_eq!(storage.get("nothing").unwrap(), None);
        storage.remove("nothing").unwrap();
    }

    #[test]
    fn survives_reopening_the_directory() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::with_root(dir.path()).unwrap();
            storage.set("activities", b"[1,2,3]").unwrap();
        }
        let reopened = FileStorage::with_root(dir.path()).unwrap();
        assert_eq!(
            reopened.get("activities").unwrap().as_deref(),
            Some(&b"[1,2,3]"[..])
        );
    }
}
