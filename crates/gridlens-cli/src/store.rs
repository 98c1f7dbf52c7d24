//! File-backed layout store.
//!
//! Each layout is one JSON file under `<dir>/.gridlens/layouts/`, named
//! after its storage key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use gridlens::{ConfigStore, GridLensError, Result};

/// Directory, relative to the data file, that holds saved layouts.
pub const LAYOUT_DIR: &str = ".gridlens/layouts";

pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store next to `data_file`.
    pub fn beside(data_file: &Path) -> Self {
        let parent = data_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(parent.join(LAYOUT_DIR))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.root.join(format!("{}.json", name))
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(GridLensError::Persistence(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        fs::create_dir_all(&self.root)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
