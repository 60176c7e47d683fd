//! Recording stand-in for the Drive service

use crate::drive::error::{DriveError, Result};
use crate::drive::remote::{DriveApi, ListQuery};
use async_trait::async_trait;
use google_drive3::api::{About, Comment, CommentList, File, FileList, User};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateFolder {
        name: String,
    },
    CreateFile {
        name: Option<String>,
        description: Option<String>,
        mime_type: Option<String>,
        parents: Option<Vec<String>>,
        content_mime: String,
        size: usize,
    },
    GetFile {
        file_id: String,
        fields: String,
    },
    ListFiles(ListQuery),
    DownloadMedia {
        file_id: String,
    },
    ExportFile {
        file_id: String,
        mime_type: String,
    },
    About,
    ListComments {
        file_id: String,
        page_size: Option<i32>,
        fields: String,
    },
}

#[derive(Default)]
struct StubState {
    calls: Vec<Call>,
    files: HashMap<String, File>,
    media: HashMap<String, Vec<u8>>,
    exports: HashMap<String, Vec<u8>>,
    listing: Vec<File>,
    about: About,
    comments: Vec<Comment>,
    failing: HashSet<&'static str>,
    omit_ids: bool,
    next_id: usize,
}

#[derive(Default)]
pub struct RecordingDrive {
    state: Mutex<StubState>,
}

pub fn remote_file(id: &str, name: &str, mime_type: &str, parents: &[&str]) -> File {
    File {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        mime_type: Some(mime_type.to_string()),
        parents: if parents.is_empty() {
            None
        } else {
            Some(parents.iter().map(|p| p.to_string()).collect())
        },
        ..Default::default()
    }
}

pub fn user(name: &str) -> User {
    User {
        display_name: Some(name.to_string()),
        ..Default::default()
    }
}

impl RecordingDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, file: File) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = file.id.clone().unwrap();
            state.files.insert(id, file);
        }
        self
    }

    pub fn with_media(self, file_id: &str, bytes: &[u8]) -> Self {
        self.state
            .lock()
            .unwrap()
            .media
            .insert(file_id.to_string(), bytes.to_vec());
        self
    }

    pub fn with_export(self, file_id: &str, bytes: &[u8]) -> Self {
        self.state
            .lock()
            .unwrap()
            .exports
            .insert(file_id.to_string(), bytes.to_vec());
        self
    }

    pub fn with_listing(self, files: Vec<File>) -> Self {
        self.state.lock().unwrap().listing = files;
        self
    }

    pub fn with_about(self, about: About) -> Self {
        self.state.lock().unwrap().about = about;
        self
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        self.state.lock().unwrap().comments = comments;
        self
    }

    /// Makes every call to `operation` fail with a remote error.
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    /// Creates succeed but come back without an ID.
    pub fn omitting_ids(self) -> Self {
        self.state.lock().unwrap().omit_ids = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(DriveError::Remote(format!("{} failed (stub)", operation)));
        }
        Ok(())
    }

    fn mint(&self, mut file: File) -> File {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        if state.omit_ids {
            return file;
        }
        let id = format!("ID{}", state.next_id);
        file.id = Some(id.clone());
        state.files.insert(id, file.clone());
        file
    }
}

#[async_trait]
impl DriveApi for RecordingDrive {
    async fn create_folder(&self, name: &str) -> Result<File> {
        self.record(
            "create_folder",
            Call::CreateFolder {
                name: name.to_string(),
            },
        )?;
        Ok(self.mint(File {
            name: Some(name.to_string()),
            mime_type: Some(crate::drive::mime::FOLDER_MIME.to_string()),
            ..Default::default()
        }))
    }

    async fn create_file(
        &self,
        metadata: File,
        content: Vec<u8>,
        content_mime: &str,
    ) -> Result<File> {
        self.record(
            "create_file",
            Call::CreateFile {
                name: metadata.name.clone(),
                description: metadata.description.clone(),
                mime_type: metadata.mime_type.clone(),
                parents: metadata.parents.clone(),
                content_mime: content_mime.to_string(),
                size: content.len(),
            },
        )?;
        Ok(self.mint(metadata))
    }

    async fn get_file(&self, file_id: &str, fields: &str) -> Result<File> {
        self.record(
            "get_file",
            Call::GetFile {
                file_id: file_id.to_string(),
                fields: fields.to_string(),
            },
        )?;
        self.state
            .lock()
            .unwrap()
            .files
            .get(file_id)
            .cloned()
            .ok_or_else(|| DriveError::Remote(format!("File not found: {}", file_id)))
    }

    async fn list_files(&self, query: &ListQuery) -> Result<FileList> {
        self.record("list_files", Call::ListFiles(query.clone()))?;
        let state = self.state.lock().unwrap();
        let files: Vec<File> = state
            .listing
            .iter()
            .take(query.page_size.max(0) as usize)
            .cloned()
            .collect();
        Ok(FileList {
            files: Some(files),
            next_page_token: Some("ignored-token".to_string()),
            ..Default::default()
        })
    }

    async fn download_media(&self, file_id: &str) -> Result<Vec<u8>> {
        self.record(
            "download_media",
            Call::DownloadMedia {
                file_id: file_id.to_string(),
            },
        )?;
        self.state
            .lock()
            .unwrap()
            .media
            .get(file_id)
            .cloned()
            .ok_or_else(|| DriveError::Remote(format!("File not found: {}", file_id)))
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>> {
        self.record(
            "export_file",
            Call::ExportFile {
                file_id: file_id.to_string(),
                mime_type: mime_type.to_string(),
            },
        )?;
        self.state
            .lock()
            .unwrap()
            .exports
            .get(file_id)
            .cloned()
            .ok_or_else(|| {
                DriveError::Remote(format!("Export to {} not supported for {}", mime_type, file_id))
            })
    }

    async fn about(&self) -> Result<About> {
        self.record("about", Call::About)?;
        Ok(self.state.lock().unwrap().about.clone())
    }

    async fn list_comments(
        &self,
        file_id: &str,
        page_size: Option<i32>,
        fields: &str,
    ) -> Result<CommentList> {
        self.record(
            "list_comments",
            Call::ListComments {
                file_id: file_id.to_string(),
                page_size,
                fields: fields.to_string(),
            },
        )?;
        let state = self.state.lock().unwrap();
        let limit = page_size.map(|n| n.max(0) as usize).unwrap_or(usize::MAX);
        Ok(CommentList {
            comments: Some(state.comments.iter().take(limit).cloned().collect()),
            kind: Some("drive#commentList".to_string()),
            ..Default::default()
        })
    }
}
