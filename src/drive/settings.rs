//! Client defaults document
//!
//! The JSON file at `~/.googleservices/drive/client_defaults.json` is both
//! input (project, folder and file names) and output (remote IDs recorded the
//! first time the folder or a file is created). Keys this record does not know
//! about are kept in `extras` and written back untouched.
//!
//! Updates are read-modify-write against the file so edits the user makes in
//! an editor between commands are never overwritten by a stale copy. There is
//! no lock: an editor save landing between the re-read and the write is lost.

use crate::drive::error::{DriveError, Result};
use crate::drive::mime::DocumentKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const UNCONFIGURED_PREFIX: &str = "Enter ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub project: String,
    pub prefix: String,
    pub email: String,
    #[serde(rename = "defaultdomain")]
    pub default_domain: String,

    pub folder: String,
    #[serde(rename = "folderID")]
    pub folder_id: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,

    #[serde(rename = "sourceTextFile")]
    pub source_text_file: String,
    #[serde(rename = "sourceTextFileID")]
    pub source_text_file_id: String,
    #[serde(rename = "sourceImageFile")]
    pub source_image_file: String,
    #[serde(rename = "sourceImageFileID")]
    pub source_image_file_id: String,
    #[serde(rename = "sourceDocFile")]
    pub source_doc_file: String,
    #[serde(rename = "sourceDocFileID")]
    pub source_doc_file_id: String,
    #[serde(rename = "sourceSpreadFile")]
    pub source_spread_file: String,
    #[serde(rename = "sourceSpreadFileID")]
    pub source_spread_file_id: String,
    #[serde(rename = "sourcePresFile")]
    pub source_pres_file: String,
    #[serde(rename = "sourcePresFileID")]
    pub source_pres_file_id: String,

    #[serde(flatten)]
    pub extras: BTreeMap<String, Value>,
}

impl Settings {
    /// Bundled file name for a document kind.
    pub fn file_name(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Text => &self.source_text_file,
            DocumentKind::Image => &self.source_image_file,
            DocumentKind::Doc => &self.source_doc_file,
            DocumentKind::Spread => &self.source_spread_file,
            DocumentKind::Pres => &self.source_pres_file,
        }
    }

    /// Remote ID recorded for a document kind; empty until uploaded.
    pub fn file_id(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::Text => &self.source_text_file_id,
            DocumentKind::Image => &self.source_image_file_id,
            DocumentKind::Doc => &self.source_doc_file_id,
            DocumentKind::Spread => &self.source_spread_file_id,
            DocumentKind::Pres => &self.source_pres_file_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.project.starts_with(UNCONFIGURED_PREFIX)
    }
}

/// Owns the in-memory settings record and the file it mirrors.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Self::read_settings(&path)?;
        debug!("Loaded settings from {}", path.display());
        Ok(Self { path, settings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Re-reads the file, keeping the current record if that fails.
    pub fn reload(&mut self) -> Result<()> {
        self.settings = Self::read_settings(&self.path)?;
        Ok(())
    }

    /// Sets one top-level key and rewrites the whole file.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let mut document = Self::read_document(&self.path)?;
        document.insert(key.to_string(), Value::String(value.to_string()));

        let settings: Settings = serde_json::from_value(Value::Object(document.clone()))?;
        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');
        write_replacing(&self.path, &text)?;

        self.settings = settings;
        info!("Updated {} in {}", key, self.path.display());
        Ok(())
    }

    fn read_settings(path: &Path) -> Result<Settings> {
        let document = Self::read_document(path)?;
        let settings: Settings = serde_json::from_value(Value::Object(document))?;
        if !settings.is_configured() {
            return Err(DriveError::NotConfigured {
                path: path.to_path_buf(),
            });
        }
        Ok(settings)
    }

    fn read_document(path: &Path) -> Result<Map<String, Value>> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DriveError::NotConfigured {
                    path: path.to_path_buf(),
                }
            } else {
                DriveError::io(path, e)
            }
        })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Writes next to the target and renames over it, so a reader never sees a
/// half-written document.
fn write_replacing(path: &Path, text: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, text).map_err(|e| DriveError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| DriveError::io(path, e))
}
