//! Read-only About and Comments reports

use crate::drive::error::Result;
use crate::drive::remote::{timestamp, DriveApi};
use google_drive3::api::{About, Comment, User};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

const COMMENT_LINE_FIELDS: &str = "comments(htmlContent, author, createdTime)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserBlock {
    pub display_name: String,
    pub email: String,
    pub permission_id: String,
    pub kind: String,
    pub photo_link: String,
}

impl From<User> for UserBlock {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name.unwrap_or_default(),
            email: user.email_address.unwrap_or_default(),
            permission_id: user.permission_id.unwrap_or_default(),
            kind: user.kind.unwrap_or_default(),
            photo_link: user.photo_link.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaBlock {
    /// `None` when the account has no storage limit.
    pub limit: Option<i64>,
    pub usage: Option<i64>,
    pub usage_in_drive: Option<i64>,
    pub usage_in_drive_trash: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveInfoReport {
    pub raw: String,
    pub user: UserBlock,
    pub quota: QuotaBlock,
    pub export_formats: BTreeMap<String, Vec<String>>,
    pub import_formats: BTreeMap<String, Vec<String>>,
}

fn sorted(formats: Option<HashMap<String, Vec<String>>>) -> BTreeMap<String, Vec<String>> {
    formats.unwrap_or_default().into_iter().collect()
}

fn amount(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_formats(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    formats: &BTreeMap<String, Vec<String>>,
) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    for (from, to) in formats {
        writeln!(f, "  {} : [{}]", from, to.join(" "))?;
    }
    Ok(())
}

impl fmt::Display for DriveInfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.raw)?;

        writeln!(f, "User:")?;
        writeln!(f, "  displayName: {}", self.user.display_name)?;
        writeln!(f, "  emailAddress: {}", self.user.email)?;
        writeln!(f, "  permissionId: {}", self.user.permission_id)?;
        writeln!(f, "  kind: {}", self.user.kind)?;
        writeln!(f, "  photoLink: {}", self.user.photo_link)?;

        writeln!(f, "Storage quota:")?;
        match self.quota.limit {
            Some(limit) => writeln!(f, "  limit: {}", limit)?,
            None => writeln!(f, "  limit: unlimited")?,
        }
        writeln!(f, "  usage: {}", amount(self.quota.usage))?;
        writeln!(f, "  usageInDrive: {}", amount(self.quota.usage_in_drive))?;
        writeln!(
            f,
            "  usageInDriveTrash: {}",
            amount(self.quota.usage_in_drive_trash)
        )?;

        write_formats(f, "Export formats", &self.export_formats)?;
        write_formats(f, "Import formats", &self.import_formats)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub content: String,
    pub author: String,
    pub time: String,
}

impl From<Comment> for CommentLine {
    fn from(comment: Comment) -> Self {
        Self {
            content: comment.html_content.unwrap_or_default(),
            author: comment
                .author
                .and_then(|a| a.display_name)
                .unwrap_or_default(),
            time: timestamp(comment.created_time),
        }
    }
}

impl fmt::Display for CommentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Content: {} Author: {} Time: {}",
            self.content, self.author, self.time
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsReport {
    pub file_name: String,
    pub file_id: String,
    pub raw: String,
    pub lines: Vec<CommentLine>,
}

impl fmt::Display for CommentsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Comments on {} ({}) ===", self.file_name, self.file_id)?;
        writeln!(f, "{}", self.raw)?;
        if self.lines.is_empty() {
            return write!(f, "No comments.");
        }
        let lines: Vec<String> = self.lines.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

pub struct InfoReader<'a> {
    drive: &'a dyn DriveApi,
}

impl<'a> InfoReader<'a> {
    pub fn new(drive: &'a dyn DriveApi) -> Self {
        Self { drive }
    }

    pub async fn drive_info(&self) -> Result<DriveInfoReport> {
        let about: About = self.drive.about().await?;
        let raw = serde_json::to_string_pretty(&about)?;

        let quota = about
            .storage_quota
            .map(|q| QuotaBlock {
                limit: q.limit,
                usage: q.usage,
                usage_in_drive: q.usage_in_drive,
                usage_in_drive_trash: q.usage_in_drive_trash,
            })
            .unwrap_or_default();

        Ok(DriveInfoReport {
            raw,
            user: about.user.map(UserBlock::from).unwrap_or_default(),
            quota,
            export_formats: sorted(about.export_formats),
            import_formats: sorted(about.import_formats),
        })
    }

    /// Lists up to `count` comments on `file_id`, after dumping the full
    /// comment resource.
    pub async fn list_comments(&self, count: i32, file_id: &str) -> Result<CommentsReport> {
        let file = self.drive.get_file(file_id, "id, name, mimeType").await?;

        let full = self.drive.list_comments(file_id, None, "*").await?;
        let raw = serde_json::to_string_pretty(&full)?;

        let page = self
            .drive
            .list_comments(file_id, Some(count), COMMENT_LINE_FIELDS)
            .await?;
        let lines: Vec<CommentLine> = page
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(CommentLine::from)
            .collect();
        debug!("{} comments on {}", lines.len(), file_id);

        Ok(CommentsReport {
            file_name: file.name.unwrap_or_default(),
            file_id: file_id.to_string(),
            raw,
            lines,
        })
    }
}
