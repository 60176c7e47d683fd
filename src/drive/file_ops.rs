//! File operations against the workspace folder
//! Upload converts office formats into editor documents on the remote side,
//! download exports them back.

use crate::drive::error::{DriveError, Result};
use crate::drive::mime::FileFormat;
use crate::drive::remote::{timestamp, DriveApi, ListQuery};
use crate::drive::resources::ResourceLocator;
use crate::drive::settings::{Settings, SettingsStore};
use crate::drive::workspace::Workspace;
use google_drive3::api::File;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LIST_FIELDS: &str =
    "nextPageToken, files(id, name, parents, modifiedTime, lastModifyingUser, mimeType)";
const LIST_ORDER: &str = "modifiedTime desc,name";
const LIST_SPACES: &str = "drive";

/// One line of a file listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    pub name: String,
    pub id: String,
    pub parent: String,
    pub mime_type: String,
    pub modified: String,
    pub modified_by: String,
}

impl fmt::Display for FileListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file: {} file id: ({}) parent: {} mimeType: {} modified: {} by {}",
            self.name, self.id, self.parent, self.mime_type, self.modified, self.modified_by
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    AlreadyUploaded { file_name: String, id: String },
    Uploaded { name: String, id: String },
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::AlreadyUploaded { file_name, id } => {
                write!(f, "{} already uploaded ({}); not uploaded", file_name, id)
            }
            UploadOutcome::Uploaded { name, id } => write!(f, "{} uploaded ({})", name, id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMethod {
    Media,
    Export { mime_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub name: String,
    pub remote_mime: String,
    pub method: DownloadMethod,
    pub path: PathBuf,
    pub size: usize,
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Downloading file: {} whose MIME is: {} ===",
            self.name, self.remote_mime
        )?;
        if let DownloadMethod::Export { mime_type } = &self.method {
            writeln!(f, "Exported as {}", mime_type)?;
        }
        write!(
            f,
            "{} downloaded to {} ({} bytes)",
            self.name,
            self.path.display(),
            self.size
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentReport {
    pub file_name: String,
    pub parent_name: String,
}

impl fmt::Display for ParentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is in: {}", self.file_name, self.parent_name)
    }
}

pub struct FileOperations<'a> {
    drive: &'a dyn DriveApi,
    resources: &'a dyn ResourceLocator,
}

impl<'a> FileOperations<'a> {
    pub fn new(drive: &'a dyn DriveApi, resources: &'a dyn ResourceLocator) -> Self {
        Self { drive, resources }
    }

    /// Uploads the bundled file for `format` into the workspace folder, once.
    ///
    /// The metadata carries the service-native MIME so the remote imports the
    /// bytes; the bytes themselves are sent with their open-format MIME.
    pub async fn upload(
        &self,
        settings: &mut SettingsStore,
        format: FileFormat,
    ) -> Result<UploadOutcome> {
        let kind = format.kind();
        let row = format.mime();

        let stored_id = settings.settings().file_id(kind);
        if !stored_id.is_empty() {
            return Ok(UploadOutcome::AlreadyUploaded {
                file_name: settings.settings().file_name(kind).to_string(),
                id: stored_id.to_string(),
            });
        }

        if settings.settings().folder_id.is_empty() {
            let outcome = Workspace::new(self.drive).init(settings).await?;
            info!("Workspace folder before upload: {}", outcome);
        }
        let folder_id = settings.settings().folder_id.clone();

        let file_name = settings.settings().file_name(kind).to_string();
        let content = self.resources.open(&file_name)?;

        if row.converts() {
            debug!("{} will be imported as {}", file_name, row.upload);
        }
        let (title, description) = format.upload_labels();
        let metadata = File {
            name: Some(title.to_string()),
            description: Some(description.to_string()),
            mime_type: Some(row.upload.to_string()),
            parents: Some(vec![folder_id]),
            ..Default::default()
        };

        let created = self
            .drive
            .create_file(metadata, content, row.download)
            .await?;
        let id = created.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            warn!("Upload of {} returned no ID", file_name);
            DriveError::Invariant(format!("{} was uploaded without an ID", file_name))
        })?;

        settings
            .update(kind.id_key(), &id)
            .map_err(|e| DriveError::not_recorded(kind.id_key(), &id, e))?;
        info!("Uploaded {} as {} ({})", file_name, title, id);

        Ok(UploadOutcome::Uploaded {
            name: created.name.unwrap_or_else(|| title.to_string()),
            id,
        })
    }

    /// Downloads a managed file into `local_dir`, exporting service-native
    /// documents to the open format for `format`.
    pub async fn download(
        &self,
        settings: &Settings,
        format: FileFormat,
        override_id: &str,
        local_dir: &Path,
    ) -> Result<DownloadOutcome> {
        let kind = format.kind();
        let override_id = override_id.trim();
        let file_id = if override_id.is_empty() {
            settings.file_id(kind)
        } else {
            override_id
        };
        if file_id.is_empty() {
            return Err(DriveError::MissingFileId {
                key: kind.id_key(),
            });
        }

        let download_mime = format.mime().download;
        let local_name = settings.file_name(kind);
        if local_name.is_empty() {
            return Err(DriveError::ResourceNotFound(format!(
                "{} is empty in the settings",
                kind.file_key()
            )));
        }
        let path = local_dir.join(local_name);

        let remote = self.drive.get_file(file_id, "id, name, mimeType").await?;
        let remote_mime = remote.mime_type.unwrap_or_default();
        let name = remote.name.unwrap_or_else(|| file_id.to_string());

        let (method, bytes) = if remote_mime == download_mime {
            (DownloadMethod::Media, self.drive.download_media(file_id).await?)
        } else {
            let bytes = self.drive.export_file(file_id, download_mime).await?;
            (
                DownloadMethod::Export {
                    mime_type: download_mime.to_string(),
                },
                bytes,
            )
        };

        tokio::fs::create_dir_all(local_dir)
            .await
            .map_err(|e| DriveError::io(local_dir, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| DriveError::io(&path, e))?;
        info!("Downloaded {} to {}", file_id, path.display());

        Ok(DownloadOutcome {
            name,
            remote_mime,
            method,
            path,
            size: bytes.len(),
        })
    }

    /// The `count` most recently modified files in the user's Drive.
    pub async fn list_files(&self, count: i32) -> Result<Vec<FileListing>> {
        self.list(count, None).await
    }

    /// Like `list_files`, restricted to one MIME type.
    pub async fn list_files_of_type(&self, count: i32, mime_type: &str) -> Result<Vec<FileListing>> {
        self.list(count, Some(format!("mimeType='{}'", mime_type)))
            .await
    }

    async fn list(&self, count: i32, filter: Option<String>) -> Result<Vec<FileListing>> {
        let query = ListQuery {
            page_size: count,
            order_by: LIST_ORDER.to_string(),
            spaces: LIST_SPACES.to_string(),
            fields: LIST_FIELDS.to_string(),
            filter,
        };

        // Only the first page is read.
        let list = self.drive.list_files(&query).await?;

        let mut listings = Vec::new();
        for file in list.files.unwrap_or_default() {
            let parent = match file.parents.as_ref().and_then(|p| p.first()) {
                Some(parent_id) => match self.parent_name(parent_id).await {
                    Ok(name) => name,
                    Err(e) => {
                        warn!("Parent {} of {:?} unavailable: {}", parent_id, file.name, e);
                        String::new()
                    }
                },
                None => {
                    warn!("{:?} has no parent folder", file.name);
                    String::new()
                }
            };

            listings.push(FileListing {
                name: file.name.unwrap_or_default(),
                id: file.id.unwrap_or_default(),
                parent,
                mime_type: file.mime_type.unwrap_or_default(),
                modified: timestamp(file.modified_time),
                modified_by: file
                    .last_modifying_user
                    .and_then(|u| u.display_name)
                    .unwrap_or_default(),
            });
        }
        Ok(listings)
    }

    /// Resolves the folder a file lives in. Every parent is fetched and the
    /// last one is reported.
    pub async fn get_parents(&self, file_id: &str) -> Result<ParentReport> {
        let file = self.drive.get_file(file_id, "name, parents").await?;
        let file_name = file.name.unwrap_or_else(|| file_id.to_string());

        let mut parent_name = None;
        for parent_id in file.parents.unwrap_or_default() {
            parent_name = Some(self.parent_name(&parent_id).await?);
        }

        let parent_name = parent_name.ok_or_else(|| {
            warn!("{} has no parent folder", file_name);
            DriveError::Invariant(format!("{} has no parent folder", file_name))
        })?;

        Ok(ParentReport {
            file_name,
            parent_name,
        })
    }

    async fn parent_name(&self, parent_id: &str) -> Result<String> {
        let parent = self.drive.get_file(parent_id, "name").await?;
        Ok(parent.name.unwrap_or_default())
    }
}
