//! Saving and restoring pivot layouts keyed by dataset shape.
//!
//! The core never performs I/O itself. Callers supply a [`ConfigStore`];
//! [`MemoryConfigStore`] covers tests and single-session use.

use std::collections::{BTreeSet, HashMap};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

use super::config::PivotConfig;

/// Prefix of every storage key.
pub const STORAGE_KEY_PREFIX: &str = "pivot-config:";

/// Key/value storage for serialized layouts.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    entries: HashMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Derive the storage key for a field set.
///
/// Order and duplicates do not matter: the names are deduplicated and
/// sorted before hashing.
pub fn generate_storage_key<S: AsRef<str>>(field_names: &[S]) -> String {
    let unique: BTreeSet<&str> = field_names.iter().map(AsRef::as_ref).collect();
    let mut hasher = Sha256::new();
    for (i, name) in unique.iter().enumerate() {
        if i > 0 {
            hasher.update([0x1f]);
        }
        hasher.update(name.as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}{}", STORAGE_KEY_PREFIX, &digest[..16])
}

/// Serialize `config` under `key`.
pub fn save_pivot_config(store: &mut dyn ConfigStore, key: &str, config: &PivotConfig) -> Result<()> {
    let payload = serde_json::to_string(config)?;
    store.set(key, payload)
}

/// Load the config saved under `key`.
///
/// A missing entry is `Ok(None)`. A corrupt entry is also `Ok(None)`: it is
/// logged and left for the next save to overwrite.
pub fn load_pivot_config(store: &dyn ConfigStore, key: &str) -> Result<Option<PivotConfig>> {
    let Some(payload) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&payload) {
        Ok(config) => Ok(Some(config)),
        Err(e) => {
            warn!(key = %key, error = %e, "discarding unreadable pivot layout");
            Ok(None)
        }
    }
}

/// Whether every field `config` references exists in `field_names`,
/// including the fields its calculated-field formulas read.
pub fn is_config_valid_for_fields<S: AsRef<str>>(config: &PivotConfig, field_names: &[S]) -> bool {
    config
        .referenced_fields()
        .iter()
        .all(|field| field_names.iter().any(|name| name.as_ref() == field.as_str()))
}

/// Restore the layout saved for `field_names`, or the default layout.
///
/// A saved layout is applied only when all of its fields still exist and it
/// passes validation. Partially valid layouts are never applied.
pub fn restore_pivot_config<S: AsRef<str>>(store: &dyn ConfigStore, field_names: &[S]) -> PivotConfig {
    let key = generate_storage_key(field_names);
    let loaded = match load_pivot_config(store, &key) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(key = %key, error = %e, "pivot layout store failed");
            None
        }
    };

    match loaded {
        Some(config) if !is_config_valid_for_fields(&config, field_names) => {
            warn!(key = %key, "saved pivot layout references missing fields; using default");
            PivotConfig::default()
        }
        Some(config) => match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(key = %key, error = %e, "saved pivot layout is invalid; using default");
                PivotConfig::default()
            }
        },
        None => PivotConfig::default(),
    }
}

/// Save `config` under the key for `field_names`.
pub fn save_for_fields<S: AsRef<str>>(
    store: &mut dyn ConfigStore,
    field_names: &[S],
    config: &PivotConfig,
) -> Result<String> {
    config.validate()?;
    let key = generate_storage_key(field_names);
    save_pivot_config(store, &key, config)?;
    Ok(key)
}
