//! Error types for the Drive client

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriveError>;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("Enter the client settings in {}", path.display())]
    NotConfigured { path: PathBuf },

    #[error("Failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Drive API error: {0}")]
    Remote(String),

    #[error("{0} is not allowed")]
    InvalidInput(String),

    #[error("No file ID stored in {key}; upload the file first or enter an ID")]
    MissingFileId { key: &'static str },

    #[error("Created remote ID {id} but could not record it as {key}; enter it by hand: {source}")]
    NotRecorded {
        key: &'static str,
        id: String,
        #[source]
        source: Box<DriveError>,
    },

    #[error("Unexpected remote state: {0}")]
    Invariant(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),
}

impl DriveError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriveError::Io {
            path: path.into(),
            source,
        }
    }
}

impl DriveError {
    /// Wraps a failed settings write that followed a successful remote create.
    pub fn not_recorded(key: &'static str, id: &str, source: DriveError) -> Self {
        DriveError::NotRecorded {
            key,
            id: id.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<google_drive3::Error> for DriveError {
    fn from(e: google_drive3::Error) -> Self {
        DriveError::Remote(e.to_string())
    }
}
