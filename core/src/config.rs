use std::path::PathBuf;

use anyhow::Result;

use crate::repository::file::default_data_dir;

pub const DATA_DIR_ENV: &str = "ZENTASK_DATA_DIR";
pub const LOG_FILE_NAME: &str = "zentask.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Explicit flag first, then `ZENTASK_DATA_DIR`, then `~/.zentask`.
    pub fn resolve(data_dir_flag: Option<PathBuf>) -> Result<Self> {
        let env_value = std::env::var(DATA_DIR_ENV).ok();
        Self::resolve_with(data_dir_flag, env_value.as_deref())
    }

    fn resolve_with(data_dir_flag: Option<PathBuf>, env_value: Option<&str>) -> Result<Self> {
        let data_dir = match (data_dir_flag, env_value) {
            (Some(dir), _) => dir,
            (None, Some(dir)) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        Ok(Self { data_dir })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins_over_env() {
        let config =
            Config::resolve_with(Some(PathBuf::from("/tmp/flag")), Some("/tmp/env")).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/flag"));
    }

    #[test]
    fn test_env_used_when_no_flag() {
        let config = Config::resolve_with(None, Some("/tmp/env")).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/env"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/env/zentask.log"));
    }

    #[test]
    fn test_blank_env_falls_back_to_home() {
        let config = Config::resolve_with(None, Some("  ")).unwrap();
        assert!(config.data_dir.ends_with(".zentask"));
    }
}
