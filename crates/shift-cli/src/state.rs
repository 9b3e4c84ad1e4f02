//! JSON state file backing the request and rule commands.

use std::path::Path;

use anyhow::{Context, Result};
use shift_engine::{MemoryStore, StoreSnapshot};

/// Load the store from `path`. A missing file is an empty store.
pub fn load(path: &str) -> Result<MemoryStore> {
    if !Path::new(path).exists() {
        return Ok(MemoryStore::new());
    }
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read state: {}", path))?;
    let snapshot: StoreSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("Invalid state file: {}", path))?;
    Ok(MemoryStore::from_snapshot(snapshot))
}

pub fn save(path: &str, store: &MemoryStore) -> Result<()> {
    let snapshot = store.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write state: {}", path))
}
