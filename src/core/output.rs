//! JSON and JSON Lines rendering of stored conversations.
//!
//! Each conversation is rendered with its messages and attachments nested:
//!
//! ```json
//! {
//!   "id": 1, "title": "Trip planning", "source": "export.zip",
//!   "created_at": "...", "updated_at": "...",
//!   "messages": [{"id": 1, "role": "user", "content": "...", "timestamp": "..."}],
//!   "attachments": [{"id": 1, "message_id": 1, "file_name": "map.png", ...}]
//! }
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChatvaultError, Result};
use crate::store::{MemoryStore, StoredAttachment, StoredConversation, StoredMessage};

/// Output format for rendered conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,

    /// One JSON object per line
    Jsonl,
}

impl OutputFormat {
    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson"]
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(ChatvaultError::invalid_format(
                "output",
                format!(
                    "Unknown file extension: '.{}'. Expected one of: {}",
                    ext,
                    OutputFormat::all_names().join(", ")
                ),
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

/// A conversation with its rows nested, borrowed from the store.
#[derive(Serialize)]
struct ConversationView<'a> {
    #[serde(flatten)]
    conversation: &'a StoredConversation,
    messages: Vec<&'a StoredMessage>,
    attachments: Vec<&'a StoredAttachment>,
}

fn views(store: &MemoryStore) -> impl Iterator<Item = ConversationView<'_>> {
    store.conversations.iter().map(|conversation| ConversationView {
        conversation,
        messages: store.messages_of(conversation.id).collect(),
        attachments: store.attachments_of(conversation.id).collect(),
    })
}

/// Renders every conversation as a pretty-printed JSON array.
pub fn to_json(store: &MemoryStore) -> Result<String> {
    let all: Vec<_> = views(store).collect();
    Ok(serde_json::to_string_pretty(&all)?)
}

/// Renders one conversation per line.
pub fn to_jsonl(store: &MemoryStore) -> Result<String> {
    let mut out = String::new();
    for view in views(store) {
        out.push_str(&serde_json::to_string(&view)?);
        out.push('\n');
    }
    Ok(out)
}

/// Renders `store` in `format`.
pub fn render(store: &MemoryStore, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(store),
        OutputFormat::Jsonl => to_jsonl(store),
    }
}

/// Writes the rendered store to a file.
pub fn write_output(store: &MemoryStore, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    let rendered = render(store, format)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    Ok(())
}
