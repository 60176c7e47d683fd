//! Extension to MIME mapping used by uploads and downloads

use crate::drive::error::DriveError;
use std::fmt;
use std::str::FromStr;

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

const GOOGLE_DOCUMENT: &str = "application/vnd.google-apps.document";
const GOOGLE_PRESENTATION: &str = "application/vnd.google-apps.presentation";
const GOOGLE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";

/// Upload and download MIME types for one local extension.
///
/// `upload` is what the remote stores (a service-native editor type when the
/// file is imported), `download` is the open format the bytes are exported
/// back to. Equal values mean no conversion happens in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeRow {
    pub upload: &'static str,
    pub download: &'static str,
}

impl MimeRow {
    pub fn converts(&self) -> bool {
        self.upload != self.download
    }
}

/// Local extension tokens accepted by the `up_` and `dw_` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Txt,
    Docx,
    Pptx,
    Xlsx,
    Jpeg,
}

impl FileFormat {
    pub const ALL: [FileFormat; 5] = [
        FileFormat::Txt,
        FileFormat::Docx,
        FileFormat::Pptx,
        FileFormat::Xlsx,
        FileFormat::Jpeg,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            FileFormat::Txt => "txt",
            FileFormat::Docx => "docx",
            FileFormat::Pptx => "pptx",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime(&self) -> MimeRow {
        match self {
            FileFormat::Txt => MimeRow {
                upload: GOOGLE_DOCUMENT,
                download: "text/plain",
            },
            FileFormat::Docx => MimeRow {
                upload: GOOGLE_DOCUMENT,
                download:
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            },
            FileFormat::Pptx => MimeRow {
                upload: GOOGLE_PRESENTATION,
                download:
                    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            },
            FileFormat::Xlsx => MimeRow {
                upload: GOOGLE_SPREADSHEET,
                download: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            },
            FileFormat::Jpeg => MimeRow {
                upload: "image/jpeg",
                download: "image/jpeg",
            },
        }
    }

    /// The settings slot that records the local file name and remote ID.
    pub fn kind(&self) -> DocumentKind {
        match self {
            FileFormat::Txt => DocumentKind::Text,
            FileFormat::Docx => DocumentKind::Doc,
            FileFormat::Pptx => DocumentKind::Pres,
            FileFormat::Xlsx => DocumentKind::Spread,
            FileFormat::Jpeg => DocumentKind::Image,
        }
    }

    /// Name and description given to the remote copy.
    pub fn upload_labels(&self) -> (&'static str, &'static str) {
        match self {
            FileFormat::Jpeg => ("towmater", "toy car"),
            _ => ("midsummereve", "poem"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileFormat::ALL
            .into_iter()
            .find(|f| f.token() == s)
            .ok_or_else(|| DriveError::InvalidInput(s.to_string()))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Document kinds that own a `source<K>File` / `source<K>FileID` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Text,
    Image,
    Doc,
    Spread,
    Pres,
}

impl DocumentKind {
    pub fn file_key(&self) -> &'static str {
        match self {
            DocumentKind::Text => "sourceTextFile",
            DocumentKind::Image => "sourceImageFile",
            DocumentKind::Doc => "sourceDocFile",
            DocumentKind::Spread => "sourceSpreadFile",
            DocumentKind::Pres => "sourcePresFile",
        }
    }

    pub fn id_key(&self) -> &'static str {
        match self {
            DocumentKind::Text => "sourceTextFileID",
            DocumentKind::Image => "sourceImageFileID",
            DocumentKind::Doc => "sourceDocFileID",
            DocumentKind::Spread => "sourceSpreadFileID",
            DocumentKind::Pres => "sourcePresFileID",
        }
    }
}
