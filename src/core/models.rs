//! Core data models produced by the ingestion pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ParsedMessage;

/// One normalized conversation, ready for persistence.
///
/// Message order is the chronological root-to-leaf order and must be kept
/// as-is by whatever stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedConversation {
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<ParsedMessage>,
    /// Attachment declarations found in the graph (archive imports only).
    #[serde(default)]
    pub attachment_refs: Vec<ParsedAttachmentRef>,
}

impl ParsedConversation {
    /// Creates a conversation with no attachment references.
    pub fn new(
        title: impl Into<String>,
        created_at: impl Into<String>,
        updated_at: impl Into<String>,
        messages: Vec<ParsedMessage>,
    ) -> Self {
        Self {
            title: title.into(),
            created_at: created_at.into(),
            updated_at: updated_at.into(),
            messages,
            attachment_refs: Vec::new(),
        }
    }
}

/// A message's declaration that a file belongs to it.
///
/// Only a hint: it is matched against extracted archive files and dropped if
/// nothing matches. Every field is optional because exports are sloppy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAttachmentRef {
    /// Graph node id of the declaring message.
    pub external_message_id: Option<String>,
    /// Opaque id assigned by the originating service.
    pub file_id: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// A binary archive entry that was written to media storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMediaRecord {
    /// Base name of the archive entry, before any collision renaming.
    pub display_name: String,
    /// Relative path of the stored file, e.g. `media/export_photo.png`.
    pub storage_path: String,
    /// Media type inferred from the stored file name.
    pub mime_type: Option<String>,
}

/// Lookup table of extracted media, keyed by lowercase name.
///
/// Each record is reachable under both its original display name and its
/// final stored file name, so references survive collision renaming. Keys
/// point into a single record list.
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    records: Vec<ExtractedMediaRecord>,
    keys: HashMap<String, usize>,
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record under the given names. Later records win on key clashes.
    pub fn insert(&mut self, record: ExtractedMediaRecord, names: &[&str]) {
        let slot = self.records.len();
        self.records.push(record);
        for name in names {
            self.keys.insert(name.to_lowercase(), slot);
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&ExtractedMediaRecord> {
        self.keys
            .get(&name.to_lowercase())
            .map(|&slot| &self.records[slot])
    }

    /// All stored records, in extraction order.
    pub fn records(&self) -> &[ExtractedMediaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A resolved attachment row, handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInsert {
    pub conversation_id: i64,
    /// Stored id of the declaring message, if it was persisted.
    pub message_id: Option<i64>,
    pub file_id: Option<String>,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub storage_path: String,
    pub created_at: String,
}
