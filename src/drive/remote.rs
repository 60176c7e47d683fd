//! Drive v3 calls used by the client
//!
//! `DriveApi` is the seam between the workspace/file/info operations and the
//! network. `HubDrive` issues the real calls through `google_drive3`; tests
//! swap in a recording stub.

use crate::drive::auth::AuthenticatedHub;
use crate::drive::error::{DriveError, Result};
use crate::drive::mime::FOLDER_MIME;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use google_drive3::api::{About, CommentList, File, FileList, Scope};
use http_body_util::BodyExt;
use std::io::Cursor;
use tracing::debug;

/// Parameters of a single `files.list` page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page_size: i32,
    pub order_by: String,
    pub spaces: String,
    pub fields: String,
    pub filter: Option<String>,
}

/// RFC 3339 in UTC with a `Z` suffix, whole seconds. Empty when the field
/// was not returned.
pub fn timestamp(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

#[async_trait]
pub trait DriveApi: Send + Sync {
    /// `POST /files` with folder metadata and no parent.
    async fn create_folder(&self, name: &str) -> Result<File>;

    /// `POST /files` multipart: `metadata` plus the raw bytes sent as `content_mime`.
    async fn create_file(&self, metadata: File, content: Vec<u8>, content_mime: &str)
        -> Result<File>;

    /// `GET /files/{id}` restricted to `fields`.
    async fn get_file(&self, file_id: &str, fields: &str) -> Result<File>;

    /// `GET /files` for one page.
    async fn list_files(&self, query: &ListQuery) -> Result<FileList>;

    /// `GET /files/{id}?alt=media`.
    async fn download_media(&self, file_id: &str) -> Result<Vec<u8>>;

    /// `GET /files/{id}/export?mimeType=...`.
    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>>;

    /// `GET /about?fields=*`.
    async fn about(&self) -> Result<About>;

    /// `GET /files/{id}/comments`.
    async fn list_comments(
        &self,
        file_id: &str,
        page_size: Option<i32>,
        fields: &str,
    ) -> Result<CommentList>;
}

pub struct HubDrive {
    hub: AuthenticatedHub,
}

impl HubDrive {
    pub fn new(hub: AuthenticatedHub) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl DriveApi for HubDrive {
    async fn create_folder(&self, name: &str) -> Result<File> {
        let metadata = File {
            name: Some(name.to_string()),
            mime_type: Some(FOLDER_MIME.to_string()),
            ..Default::default()
        };

        let folder_mime = FOLDER_MIME
            .parse()
            .map_err(|_| DriveError::InvalidInput(FOLDER_MIME.to_string()))?;

        let (_, folder) = self
            .hub
            .files()
            .create(metadata)
            .param("fields", "id, name, mimeType")
            .add_scope(Scope::Full)
            .upload(Cursor::new(Vec::new()), folder_mime)
            .await?;
        Ok(folder)
    }

    async fn create_file(
        &self,
        metadata: File,
        content: Vec<u8>,
        content_mime: &str,
    ) -> Result<File> {
        debug!(
            "Uploading {} bytes as {} ({:?})",
            content.len(),
            content_mime,
            metadata.mime_type
        );
        let media_mime = content_mime
            .parse()
            .map_err(|_| DriveError::InvalidInput(content_mime.to_string()))?;

        let (_, file) = self
            .hub
            .files()
            .create(metadata)
            .param("fields", "id, name, mimeType, description, parents")
            .add_scope(Scope::Full)
            .upload(Cursor::new(content), media_mime)
            .await?;
        Ok(file)
    }

    async fn get_file(&self, file_id: &str, fields: &str) -> Result<File> {
        let (_, file) = self
            .hub
            .files()
            .get(file_id)
            .param("fields", fields)
            .add_scope(Scope::Full)
            .doit()
            .await?;
        Ok(file)
    }

    async fn list_files(&self, query: &ListQuery) -> Result<FileList> {
        let mut request = self
            .hub
            .files()
            .list()
            .page_size(query.page_size)
            .order_by(&query.order_by)
            .spaces(&query.spaces)
            .param("fields", query.fields.as_str())
            .add_scope(Scope::Full);

        if let Some(filter) = &query.filter {
            request = request.q(filter);
        }

        let (_, list) = request.doit().await?;
        Ok(list)
    }

    async fn download_media(&self, file_id: &str) -> Result<Vec<u8>> {
        let response = self
            .hub
            .files()
            .get(file_id)
            .param("alt", "media")
            .add_scope(Scope::Full)
            .doit()
            .await?;

        let body = response
            .0
            .into_body()
            .collect()
            .await
            .map_err(|e| DriveError::Remote(format!("Failed to read media body: {}", e)))?;
        Ok(body.to_bytes().to_vec())
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        let response = self
            .hub
            .files()
            .export(file_id, mime_type)
            .add_scope(Scope::Full)
            .doit()
            .await?;

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| DriveError::Remote(format!("Failed to read export body: {}", e)))?;
        Ok(body.to_bytes().to_vec())
    }

    async fn about(&self) -> Result<About> {
        let (_, about) = self
            .hub
            .about()
            .get()
            .param("fields", "*")
            .add_scope(Scope::Full)
            .doit()
            .await?;
        Ok(about)
    }

    async fn list_comments(
        &self,
        file_id: &str,
        page_size: Option<i32>,
        fields: &str,
    ) -> Result<CommentList> {
        let mut request = self
            .hub
            .comments()
            .list(file_id)
            .param("fields", fields)
            .add_scope(Scope::Full);

        if let Some(size) = page_size {
            request = request.page_size(size);
        }

        let (_, comments) = request.doit().await?;
        Ok(comments)
    }
}
