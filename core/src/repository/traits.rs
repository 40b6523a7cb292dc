use anyhow::{anyhow, Result};

/// A local key-value store holding serialized documents.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Keys double as file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(anyhow!("Storage key must not be empty"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(anyhow!("Invalid storage key: '{}'", key));
    }
    Ok(())
}
