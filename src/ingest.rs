//! Ingestion coordinator.
//!
//! Processes a batch of uploads one after another. Each upload is dispatched
//! on its extension:
//!
//! - `.json` → [`SimpleParser`]
//! - `.zip` → [`GraphParser`] on the archive's conversation graph, then
//!   [`ArchiveExtractor`] for the attachments
//!
//! A failing upload becomes a [`FileError`] in the report; the rest of the
//! batch carries on.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatvault::config::IngestConfig;
//! use chatvault::ingest::{Ingestor, Upload};
//!
//! let ingestor = Ingestor::new(IngestConfig::new().with_media_root("media"));
//! let uploads = vec![Upload::from_path("export.zip")?];
//! let report = ingestor.ingest_batch(&uploads);
//!
//! for failure in &report.errors {
//!     eprintln!("{failure}");
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::core::{MediaIndex, ParsedConversation};
use crate::error::{ChatvaultError, Result};
use crate::media::ArchiveExtractor;
use crate::media::extractor::upload_stem;
use crate::parsers::{GraphParser, SimpleParser};

/// Upload formats, identified by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// Flat JSON transcript (`.json`)
    Transcript,
    /// ZIP archive with a conversation graph and attachments (`.zip`)
    Archive,
}

impl ExportKind {
    /// Detects the kind from a file name, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(ExportKind::Transcript),
            Some("zip") => Ok(ExportKind::Archive),
            _ => Err(ChatvaultError::invalid_format(
                "upload",
                format!("{file_name}: only JSON and ZIP files are supported"),
            )),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportKind::Transcript => write!(f, "JSON transcript"),
            ExportKind::Archive => write!(f, "ZIP archive"),
        }
    }
}

/// Raw bytes of one uploaded file plus its declared name.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk; the upload is named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// The successfully parsed content of one upload.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    /// Declared name of the upload.
    pub source: String,
    pub kind: ExportKind,
    /// Conversations in input order.
    pub conversations: Vec<ParsedConversation>,
    /// Extracted attachments (always empty for transcripts).
    pub media: MediaIndex,
}

impl ParsedUpload {
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}

/// A failure attached to the upload that caused it.
#[derive(Debug)]
pub struct FileError {
    pub file_name: String,
    pub error: ChatvaultError,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse {}: {}", self.file_name, self.error)
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Outcome of a batch: successes in upload order, plus per-file failures.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub uploads: Vec<ParsedUpload>,
    pub errors: Vec<FileError>,
}

impl IngestReport {
    pub fn conversation_count(&self) -> usize {
        self.uploads.iter().map(|u| u.conversations.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs uploads through the parsing pipeline.
pub struct Ingestor {
    config: IngestConfig,
    simple: SimpleParser,
    graph: GraphParser,
    extractor: ArchiveExtractor,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            simple: SimpleParser::new(),
            graph: GraphParser::with_config(&config),
            extractor: ArchiveExtractor::with_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Processes every upload; one bad file never blocks the others.
    pub fn ingest_batch(&self, uploads: &[Upload]) -> IngestReport {
        let mut report = IngestReport::default();

        for upload in uploads {
            match self.ingest_file(upload) {
                Ok(parsed) => {
                    info!(
                        file = %parsed.source,
                        kind = %parsed.kind,
                        conversations = parsed.conversations.len(),
                        messages = parsed.message_count(),
                        attachments = parsed.media.len(),
                        "ingested upload"
                    );
                    report.uploads.push(parsed);
                }
                Err(error) => {
                    warn!(file = %upload.file_name, error = %error, "upload rejected");
                    report.errors.push(FileError {
                        file_name: upload.file_name.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Processes a single upload.
    pub fn ingest_file(&self, upload: &Upload) -> Result<ParsedUpload> {
        if upload.file_name.is_empty() {
            return Err(ChatvaultError::invalid_format(
                "upload",
                "uploaded file is missing a filename",
            ));
        }

        let kind = ExportKind::from_file_name(&upload.file_name)?;
        let (conversations, media) = match kind {
            ExportKind::Transcript => {
                let conversation = self.simple.parse_slice(
                    &upload.bytes,
                    &upload.file_name,
                    upload_stem(&upload.file_name),
                )?;
                (vec![conversation], MediaIndex::new())
            }
            ExportKind::Archive => self.ingest_archive(upload)?,
        };

        Ok(ParsedUpload {
            source: upload.file_name.clone(),
            kind,
            conversations,
            media,
        })
    }

    /// Parses the graph before writing any media, so a rejected archive
    /// leaves nothing behind in the media root.
    fn ingest_archive(&self, upload: &Upload) -> Result<(Vec<ParsedConversation>, MediaIndex)> {
        let (member, raw_graph) = self
            .extractor
            .read_graph_member(&upload.bytes, &upload.file_name)?;
        let conversations = self
            .graph
            .parse_slice(&raw_graph, &format!("{}:{}", upload.file_name, member))?;
        let media = self.extractor.extract(&upload.bytes, &upload.file_name)?;
        Ok((conversations, media))
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}
