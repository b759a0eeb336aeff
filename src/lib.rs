//! # Chatvault
//!
//! A Rust library for importing AI chat exports into a flat relational model:
//! conversations, ordered messages, and attachment records linked to
//! messages.
//!
//! ## Overview
//!
//! Two export shapes are understood:
//! - **JSON transcripts** - a flat list of `{role, content, timestamp}`
//!   messages, optionally wrapped in an object with a `title`
//! - **ZIP archives** - a `conversations.json` holding branching conversation
//!   graphs, plus binary attachments (images, PDFs, audio)
//!
//! For archives, each graph is reduced to the single path ending at its
//! current leaf, attachments are written to a media directory under names
//! that never collide, and the attachment declarations inside the graph are
//! matched against the stored files.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatvault::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let ingestor = Ingestor::new(IngestConfig::new().with_media_root("media"));
//!     let uploads = vec![Upload::from_path("export.zip")?];
//!     let report = ingestor.ingest_batch(&uploads);
//!
//!     let mut store = MemoryStore::new();
//!     for upload in &report.uploads {
//!         persist_upload(&mut store, upload)?;
//!     }
//!     for failure in &report.errors {
//!         eprintln!("{failure}");
//!     }
//!
//!     write_output(&store, "archive.json", OutputFormat::Json)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`ingest`] - batch coordinator ([`Ingestor`](ingest::Ingestor), [`Upload`](ingest::Upload))
//! - [`parsers`] - [`SimpleParser`](parsers::SimpleParser), [`GraphParser`](parsers::GraphParser)
//! - [`parsing`] - text extraction and timestamp coercion
//! - [`media`] - attachment extraction and resolution
//! - [`store`] - persistence seam and [`MemoryStore`](store::MemoryStore)
//! - [`core`] - data models and output rendering
//! - [`config`] - [`IngestConfig`](config::IngestConfig)
//! - [`error`] - [`ChatvaultError`], [`Result`]

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ingest;
pub mod media;
pub mod message;
pub mod parsers;
pub mod parsing;
pub mod store;

// Re-export the main types at the crate root for convenience
pub use error::{ChatvaultError, Result};
pub use message::{ParsedMessage, Role};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatvault::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ParsedMessage, Role};

    pub use crate::error::{ChatvaultError, Result};

    pub use crate::config::IngestConfig;

    pub use crate::core::{
        AttachmentInsert, ExtractedMediaRecord, MediaIndex, OutputFormat, ParsedAttachmentRef,
        ParsedConversation, to_json, to_jsonl, write_output,
    };

    pub use crate::ingest::{ExportKind, FileError, IngestReport, Ingestor, ParsedUpload, Upload};

    pub use crate::parsers::{GraphParser, SimpleParser};

    pub use crate::store::{ConversationStore, MemoryStore, persist_upload};
}
