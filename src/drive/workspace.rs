//! Workspace folder bootstrap
//!
//! `files.create` is not idempotent, so the folder ID stored in the settings
//! document is the only thing preventing duplicate folders across runs. A
//! stored ID is trusted without checking the remote.

use crate::drive::error::{DriveError, Result};
use crate::drive::remote::DriveApi;
use crate::drive::settings::SettingsStore;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Existing { name: String, id: String },
    Created { name: String, id: String },
}

impl fmt::Display for InitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitOutcome::Existing { name, .. } => {
                write!(f, "{} already exists; not created.", name)
            }
            InitOutcome::Created { name, id } => write!(f, "{} created ({}).", name, id),
        }
    }
}

pub struct Workspace<'a> {
    drive: &'a dyn DriveApi,
}

impl<'a> Workspace<'a> {
    pub fn new(drive: &'a dyn DriveApi) -> Self {
        Self { drive }
    }

    /// Creates the workspace folder unless its ID is already recorded.
    pub async fn init(&self, settings: &mut SettingsStore) -> Result<InitOutcome> {
        let name = settings.settings().folder.clone();
        let folder_id = settings.settings().folder_id.clone();

        if !folder_id.is_empty() {
            return Ok(InitOutcome::Existing {
                name,
                id: folder_id,
            });
        }

        let folder = self.drive.create_folder(&name).await?;
        let id = folder.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            warn!("Folder create for '{}' returned no ID", name);
            DriveError::Invariant(format!("folder '{}' was created without an ID", name))
        })?;

        settings
            .update("folderID", &id)
            .map_err(|e| DriveError::not_recorded("folderID", &id, e))?;
        info!("Created workspace folder '{}' with ID {}", name, id);

        Ok(InitOutcome::Created { name, id })
    }
}
