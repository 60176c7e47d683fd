//! Google Drive v3 client: per-user settings, workspace folder and file operations

pub mod auth;
pub mod config;
pub mod error;
pub mod file_ops;
pub mod info;
pub mod mime;
pub mod remote;
pub mod resources;
pub mod settings;
pub mod workspace;

#[cfg(test)]
pub mod stub;

pub use auth::DriveAuth;
pub use config::ClientConfig;
pub use error::DriveError;
pub use file_ops::FileOperations;
pub use info::InfoReader;
pub use mime::FileFormat;
pub use remote::{DriveApi, HubDrive};
pub use resources::{ResourceDirs, ResourceLocator};
pub use settings::SettingsStore;
pub use workspace::Workspace;
