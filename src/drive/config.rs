//! Configuration for the Drive client

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const SERVICES_DIR: &str = ".googleservices";
const DATA_DIR: &str = "drive";
const DEFAULTS_FILE: &str = "client_defaults.json";
const SECRETS_FILE: &str = "client_secrets.json";
const TOKEN_FILE: &str = "StoredCredential";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client_name: String,
    pub services_dir: PathBuf,
    pub download_dir: PathBuf,
    pub list_page_size: i32,
    pub comments_page_size: i32,
    pub resource_dirs: Vec<PathBuf>,
}

impl ClientConfig {
    pub fn new(client_name: impl Into<String>, home: impl AsRef<Path>) -> Self {
        Self {
            client_name: client_name.into(),
            services_dir: home.as_ref().join(SERVICES_DIR).join(DATA_DIR),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_services_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.services_dir = dir.into();
        self
    }

    #[cfg(test)]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    #[cfg(test)]
    pub fn with_resource_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.resource_dirs = dirs;
        self
    }

    pub fn settings_path(&self) -> PathBuf {
        self.services_dir.join(DEFAULTS_FILE)
    }

    pub fn client_secrets_path(&self) -> PathBuf {
        self.services_dir.join(SECRETS_FILE)
    }

    pub fn token_cache_path(&self) -> PathBuf {
        self.services_dir.join(TOKEN_FILE)
    }
}

/// `resources/` beside the executable, then `resources/` and the working
/// directory itself.
fn default_resource_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir.join("resources"));
    }
    dirs.push(PathBuf::from("resources"));
    dirs.push(PathBuf::from("."));
    dirs
}

impl Default for ClientConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            client_name: "drive".to_string(),
            services_dir: home.join(SERVICES_DIR).join(DATA_DIR),
            download_dir: PathBuf::from("temp"),
            list_page_size: 10,
            comments_page_size: 10,
            resource_dirs: default_resource_dirs(),
        }
    }
}
