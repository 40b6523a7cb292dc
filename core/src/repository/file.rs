use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::repository::traits::{validate_key, KeyValueStore};

const DEFAULT_DIR_NAME: &str = ".zentask";
const FILE_EXTENSION: &str = "json";

/// Stores each key as `<base_dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create data directory {}", path.display()))?;

        Ok(FileKeyValueStore { base_dir: path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

/// `~/.zentask`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension(format!("{}.tmp", FILE_EXTENSION));

        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!(key, bytes = value.len(), "wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(store.get("zenTasks").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();

        store.set("zenTasks", "[1]").unwrap();
        store.set("zenTasks", "[1,2]").unwrap();

        assert_eq!(store.get("zenTasks").unwrap(), Some("[1,2]".to_string()));
        assert!(dir.path().join("zenTasks.json").exists());
        assert!(!dir.path().join("zenTasks.json.tmp").exists());
    }

    #[test]
    fn test_creates_nested_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileKeyValueStore::new(Some(nested.clone())).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.base_dir(), nested.as_path());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(Some(dir.path().to_path_buf())).unwrap();

        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
