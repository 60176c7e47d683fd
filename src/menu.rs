//! Interactive command loop

use crate::drive::{
    ClientConfig, DriveApi, DriveError, FileFormat, FileOperations, InfoReader, ResourceLocator,
    SettingsStore,
};
use std::io::{self, Write};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

const PROMPT: &str = ">>> ";
const MIME_PROMPT: &str = "Enter mimeType (enter, to use default): ";
const FILE_ID_PROMPT: &str = "File ID (enter, to use default): ";

const MENU: &str = "\
Commands:
  m        show this menu
  x        exit
  lf       list recent files
  lft      list recent files of one MIME type
  lfc      list comments on a file
  test     show drive and account info
  up_<k>   upload the bundled file, k is one of txt docx pptx xlsx jpeg
  dw_<k>   download a managed file into the download folder
  fp       show the folder a file is in";

/// Everything a command needs, handed to the menu by the caller.
pub struct DriveContext<'a> {
    pub config: &'a ClientConfig,
    pub drive: &'a dyn DriveApi,
    pub resources: &'a dyn ResourceLocator,
    pub settings: SettingsStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Menu,
    Exit,
    ListFiles,
    ListFilesOfType,
    ListComments,
    DriveInfo,
    Upload(FileFormat),
    Download(FileFormat),
    Parents,
}

impl FromStr for Command {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let not_allowed = || DriveError::InvalidInput(s.to_string());
        let command = match s {
            "m" => Command::Menu,
            "x" => Command::Exit,
            "lf" => Command::ListFiles,
            "lft" => Command::ListFilesOfType,
            "lfc" => Command::ListComments,
            "test" => Command::DriveInfo,
            "fp" => Command::Parents,
            _ => {
                if let Some(token) = s.strip_prefix("up_") {
                    Command::Upload(token.parse().map_err(|_| not_allowed())?)
                } else if let Some(token) = s.strip_prefix("dw_") {
                    Command::Download(token.parse().map_err(|_| not_allowed())?)
                } else {
                    return Err(not_allowed());
                }
            }
        };
        Ok(command)
    }
}

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Runs until `x` or end of input. Command failures are printed and the
    /// loop carries on; only I/O errors on the console end it early.
    pub async fn run(&mut self, ctx: &mut DriveContext<'_>) -> io::Result<()> {
        writeln!(self.output, "{}", MENU)?;

        loop {
            let Some(line) = self.prompt(PROMPT).await? else {
                break;
            };
            let token = line.trim().to_lowercase();

            let command = match token.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    continue;
                }
            };
            debug!("Command {:?}", command);

            match command {
                Command::Exit => break,
                Command::Menu => writeln!(self.output, "{}", MENU)?,
                _ => {
                    if let Err(e) = ctx.settings.reload() {
                        warn!(
                            "Keeping previous settings, {} unreadable: {}",
                            ctx.settings.path().display(),
                            e
                        );
                        writeln!(self.output, "{}", e)?;
                    }
                    self.dispatch(command, ctx).await?;
                }
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: Command, ctx: &mut DriveContext<'_>) -> io::Result<()> {
        let files = FileOperations::new(ctx.drive, ctx.resources);
        let info = InfoReader::new(ctx.drive);
        let page_size = ctx.config.list_page_size;

        let outcome = match command {
            Command::ListFiles => files.list_files(page_size).await.map(|l| lines(&l)),
            Command::ListFilesOfType => {
                let entered = self.prompt(MIME_PROMPT).await?.unwrap_or_default();
                let mime_type = or_default(&entered, &ctx.settings.settings().mime_type);
                files
                    .list_files_of_type(page_size, &mime_type)
                    .await
                    .map(|l| lines(&l))
            }
            Command::ListComments => {
                let entered = self.prompt(FILE_ID_PROMPT).await?.unwrap_or_default();
                let stored = &ctx.settings.settings().source_doc_file_id;
                match required_id(&entered, stored, "sourceDocFileID") {
                    Ok(id) => info
                        .list_comments(ctx.config.comments_page_size, &id)
                        .await
                        .map(|r| r.to_string()),
                    Err(e) => Err(e),
                }
            }
            Command::DriveInfo => info.drive_info().await.map(|r| r.to_string()),
            Command::Upload(format) => files
                .upload(&mut ctx.settings, format)
                .await
                .map(|o| o.to_string()),
            Command::Download(format) => {
                let entered = self.prompt(FILE_ID_PROMPT).await?.unwrap_or_default();
                files
                    .download(
                        ctx.settings.settings(),
                        format,
                        &entered,
                        &ctx.config.download_dir,
                    )
                    .await
                    .map(|o| o.to_string())
            }
            Command::Parents => {
                let entered = self.prompt(FILE_ID_PROMPT).await?.unwrap_or_default();
                let stored = &ctx.settings.settings().source_image_file_id;
                match required_id(&entered, stored, "sourceImageFileID") {
                    Ok(id) => files.get_parents(&id).await.map(|r| r.to_string()),
                    Err(e) => Err(e),
                }
            }
            Command::Menu | Command::Exit => return Ok(()),
        };

        match outcome {
            Ok(text) => writeln!(self.output, "{}", text),
            Err(e) => {
                warn!("{:?} failed: {}", command, e);
                writeln!(self.output, "{}", e)
            }
        }
    }

    /// Prints `text` and reads one line; `None` at end of input.
    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut buf = String::new();
        let n = self.input.read_line(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }
}

fn or_default(entered: &str, default: &str) -> String {
    if entered.is_empty() {
        default.to_string()
    } else {
        entered.to_string()
    }
}

fn required_id(entered: &str, stored: &str, key: &'static str) -> Result<String, DriveError> {
    let id = or_default(entered, stored);
    if id.is_empty() {
        return Err(DriveError::MissingFileId { key });
    }
    Ok(id)
}

fn lines<T: ToString>(items: &[T]) -> String {
    if items.is_empty() {
        return "No files found.".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::stub::{remote_file, Call, RecordingDrive};
    use crate::drive::{ResourceDirs, Workspace};
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    const GOOGLE_DOC: &str = "application/vnd.google-apps.document";

    struct Fixture {
        _dir: TempDir,
        config: ClientConfig,
        resources: ResourceDirs,
    }

    impl Fixture {
        fn new(overrides: serde_json::Value) -> Self {
            let dir = TempDir::new().unwrap();
            let services = dir.path().join("services");
            let bundled = dir.path().join("resources");
            std::fs::create_dir_all(&services).unwrap();
            std::fs::create_dir_all(&bundled).unwrap();
            std::fs::write(bundled.join("midsummereve.txt"), b"Ill met by moonlight").unwrap();
            std::fs::write(bundled.join("luigi.jpeg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();

            let mut document = json!({
                "project": "demo",
                "folder": "TestDriveApi",
                "folderID": "F",
                "mimeType": "image/jpeg",
                "sourceTextFile": "midsummereve.txt",
                "sourceTextFileID": "",
                "sourceImageFile": "luigi.jpeg",
                "sourceImageFileID": "",
                "sourceDocFile": "midsummereve.docx",
                "sourceDocFileID": "",
                "sourceSpreadFile": "midsummereve.xlsx",
                "sourceSpreadFileID": "",
                "sourcePresFile": "midsummereve.pptx",
                "sourcePresFileID": ""
            });
            for (key, value) in overrides.as_object().unwrap() {
                document[key] = value.clone();
            }
            std::fs::write(
                services.join("client_defaults.json"),
                serde_json::to_string_pretty(&document).unwrap(),
            )
            .unwrap();

            let config = ClientConfig::new("drive", dir.path())
                .with_services_dir(&services)
                .with_download_dir(dir.path().join("temp"))
                .with_resource_dirs(vec![bundled.clone()]);
            Self {
                resources: ResourceDirs::new(vec![bundled]),
                config,
                _dir: dir,
            }
        }

        fn settings(&self) -> SettingsStore {
            SettingsStore::load(self.config.settings_path()).unwrap()
        }

        fn download_dir(&self) -> &Path {
            &self.config.download_dir
        }

        async fn run(&self, drive: &RecordingDrive, input: &str) -> String {
            let mut ctx = DriveContext {
                config: &self.config,
                drive,
                resources: &self.resources,
                settings: self.settings(),
            };
            let mut output = Vec::new();
            Menu::new(input.as_bytes(), &mut output)
                .run(&mut ctx)
                .await
                .unwrap();
            String::from_utf8(output).unwrap()
        }
    }

    #[test]
    fn commands_parse_case_folded_tokens_only() {
        assert_eq!("lf".parse::<Command>().unwrap(), Command::ListFiles);
        assert_eq!(
            "up_jpeg".parse::<Command>().unwrap(),
            Command::Upload(FileFormat::Jpeg)
        );
        assert_eq!(
            "dw_xlsx".parse::<Command>().unwrap(),
            Command::Download(FileFormat::Xlsx)
        );
        assert_eq!(
            "up_pdf".parse::<Command>().unwrap_err().to_string(),
            "up_pdf is not allowed"
        );
        assert!("LF".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn cold_bootstrap_then_listing() {
        let fixture = Fixture::new(json!({ "folderID": "" }));
        let drive = RecordingDrive::new();

        let mut settings = fixture.settings();
        Workspace::new(&drive).init(&mut settings).await.unwrap();
        let output = fixture.run(&drive, "lf\nx\n").await;

        let calls = drive.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::CreateFolder { name } if name == "TestDriveApi"));
        match &calls[1] {
            Call::ListFiles(query) => {
                assert_eq!(query.page_size, 10);
                assert_eq!(query.order_by, "modifiedTime desc,name");
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(fixture.settings().settings().folder_id, "ID1");
        assert!(output.contains("No files found."));
    }

    #[tokio::test]
    async fn repeated_upload_creates_once() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new();

        let output = fixture.run(&drive, "up_txt\nUP_TXT\nx\n").await;

        assert_eq!(drive.count(|c| matches!(c, Call::CreateFile { .. })), 1);
        assert_eq!(drive.calls().len(), 1);
        assert!(matches!(
            &drive.calls()[0],
            Call::CreateFile { mime_type: Some(m), parents: Some(p), .. }
                if m == GOOGLE_DOC && p == &vec!["F".to_string()]
        ));
        assert_eq!(fixture.settings().settings().source_text_file_id, "ID1");
        assert!(output.contains("midsummereve uploaded (ID1)"));
        assert!(output.contains("already uploaded"));
    }

    #[tokio::test]
    async fn download_with_conversion_exports_to_temp() {
        let fixture = Fixture::new(json!({ "sourceDocFileID": "D" }));
        let drive = RecordingDrive::new()
            .with_file(remote_file("D", "midsummereve", GOOGLE_DOC, &["F"]))
            .with_export("D", b"exported docx");

        let output = fixture.run(&drive, "dw_docx\n\nx\n").await;

        assert_eq!(
            drive.count(|c| matches!(
                c,
                Call::ExportFile { mime_type, .. }
                    if mime_type == "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            )),
            1
        );
        assert_eq!(
            std::fs::read(fixture.download_dir().join("midsummereve.docx")).unwrap(),
            b"exported docx"
        );
        assert!(output.contains("midsummereve downloaded"));
    }

    #[tokio::test]
    async fn download_without_conversion_reads_media() {
        let fixture = Fixture::new(json!({ "sourceImageFileID": "I" }));
        let drive = RecordingDrive::new()
            .with_file(remote_file("I", "towmater", "image/jpeg", &["F"]))
            .with_media("I", &[7, 7, 7]);

        fixture.run(&drive, "dw_jpeg\n\nx\n").await;

        assert_eq!(drive.count(|c| matches!(c, Call::DownloadMedia { .. })), 1);
        assert_eq!(drive.count(|c| matches!(c, Call::ExportFile { .. })), 0);
    }

    #[tokio::test]
    async fn typed_mime_filters_the_listing() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new();

        fixture
            .run(&drive, "lft\napplication/vnd.google-apps.document\nx\n")
            .await;

        assert_eq!(drive.calls().len(), 1);
        assert!(matches!(
            &drive.calls()[0],
            Call::ListFiles(q) if q.filter.as_deref() == Some("mimeType='application/vnd.google-apps.document'")
        ));
    }

    #[tokio::test]
    async fn empty_mime_falls_back_to_settings() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new();

        fixture.run(&drive, "lft\n\nx\n").await;

        assert!(matches!(
            &drive.calls()[0],
            Call::ListFiles(q) if q.filter.as_deref() == Some("mimeType='image/jpeg'")
        ));
    }

    #[tokio::test]
    async fn unknown_input_is_reported_and_loop_continues() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new().failing("about");

        let output = fixture.run(&drive, "bogus\ntest\nm\nx\n").await;

        assert!(output.contains("bogus is not allowed"));
        assert!(output.contains("Drive API error: about failed (stub)"));
        assert_eq!(output.matches("Commands:").count(), 2);
        assert_eq!(drive.calls(), vec![Call::About]);
    }

    #[tokio::test]
    async fn blank_line_is_not_allowed() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new();

        let output = fixture.run(&drive, "\n   \nx\n").await;

        assert_eq!(output.matches(">>>  is not allowed\n").count(), 2);
        assert!(drive.calls().is_empty());
    }

    #[tokio::test]
    async fn parents_default_to_stored_image() {
        let fixture = Fixture::new(json!({ "sourceImageFileID": "I" }));
        let drive = RecordingDrive::new()
            .with_file(remote_file("I", "towmater", "image/jpeg", &["F"]))
            .with_file(remote_file("F", "TestDriveApi", "application/vnd.google-apps.folder", &[]));

        let output = fixture.run(&drive, "fp\n\nx\n").await;

        assert!(output.contains("towmater is in: TestDriveApi"));
    }

    #[tokio::test]
    async fn comments_without_any_id_make_no_remote_call() {
        let fixture = Fixture::new(json!({}));
        let drive = RecordingDrive::new();

        let output = fixture.run(&drive, "lfc\n\nx\n").await;

        assert!(output.contains("sourceDocFileID"));
        assert!(drive.calls().is_empty());
    }

    #[tokio::test]
    async fn hand_edits_between_commands_are_honored() {
        let fixture = Fixture::new(json!({ "sourceTextFileID": "OLD" }));
        let drive = RecordingDrive::new();
        let mut ctx = DriveContext {
            config: &fixture.config,
            drive: &drive,
            resources: &fixture.resources,
            settings: fixture.settings(),
        };

        let path = fixture.config.settings_path();
        let edited = std::fs::read_to_string(&path)
            .unwrap()
            .replace("\"OLD\"", "\"\"");
        std::fs::write(&path, edited).unwrap();

        let mut output = Vec::new();
        Menu::new("up_txt\n".as_bytes(), &mut output)
            .run(&mut ctx)
            .await
            .unwrap();

        assert_eq!(drive.count(|c| matches!(c, Call::CreateFile { .. })), 1);
        assert_eq!(ctx.settings.settings().source_text_file_id, "ID1");
    }
}
