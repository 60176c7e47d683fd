//! Lookup of the bundled demo files by name

use crate::drive::error::{DriveError, Result};
use std::path::PathBuf;
use tracing::debug;

pub trait ResourceLocator: Send + Sync {
    /// Returns the full contents of the named resource.
    fn open(&self, name: &str) -> Result<Vec<u8>>;
}

/// Searches a list of directories in order and reads the first match.
pub struct ResourceDirs {
    dirs: Vec<PathBuf>,
}

impl ResourceDirs {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl ResourceLocator for ResourceDirs {
    fn open(&self, name: &str) -> Result<Vec<u8>> {
        if name.is_empty() {
            return Err(DriveError::ResourceNotFound("<empty name>".to_string()));
        }
        let path = self
            .locate(name)
            .ok_or_else(|| DriveError::ResourceNotFound(name.to_string()))?;
        debug!("Reading resource {} from {}", name, path.display());
        std::fs::read(&path).map_err(|e| DriveError::io(path, e))
    }
}
