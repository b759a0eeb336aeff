//! Ingestion configuration.
//!
//! [`IngestConfig`] carries everything the pipeline needs to know about its
//! surroundings: where extracted media is written, how stored paths are
//! spelled, and the few names and placeholders the export formats imply.
//!
//! # Example
//!
//! ```rust
//! use chatvault::config::IngestConfig;
//!
//! let config = IngestConfig::new()
//!     .with_media_root("/var/lib/chatvault/media")
//!     .with_default_title("Untitled");
//!
//! assert_eq!(config.media_prefix, "media");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for an ingestion batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Directory that extracted attachments are written to (default: `media`)
    pub media_root: PathBuf,

    /// Leading segment of every stored relative path (default: `media`)
    pub media_prefix: String,

    /// Base name of the conversation-graph member in archives
    /// (default: `conversations.json`)
    pub graph_member: String,

    /// Title given to graph conversations without one
    /// (default: `Untitled conversation`)
    pub default_title: String,

    /// Name for attachments whose archive path has no base name
    /// (default: `attachment.bin`)
    pub fallback_attachment_name: String,

    /// Bytes inspected by the binary sniffing heuristic (default: 1024)
    pub sniff_len: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            media_prefix: "media".to_string(),
            graph_member: "conversations.json".to_string(),
            default_title: "Untitled conversation".to_string(),
            fallback_attachment_name: "attachment.bin".to_string(),
            sniff_len: 1024,
        }
    }
}

impl IngestConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the media directory.
    #[must_use]
    pub fn with_media_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.media_root = root.into();
        self
    }

    /// Sets the stored-path prefix.
    #[must_use]
    pub fn with_media_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.media_prefix = prefix.into();
        self
    }

    /// Sets the archive member holding the conversation graph.
    #[must_use]
    pub fn with_graph_member(mut self, name: impl Into<String>) -> Self {
        self.graph_member = name.into();
        self
    }

    /// Sets the placeholder title.
    #[must_use]
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Sets the placeholder attachment name.
    #[must_use]
    pub fn with_fallback_attachment_name(mut self, name: impl Into<String>) -> Self {
        self.fallback_attachment_name = name.into();
        self
    }

    /// Sets how many leading bytes are sniffed for binary content.
    #[must_use]
    pub fn with_sniff_len(mut self, len: usize) -> Self {
        self.sniff_len = len;
        self
    }
}
