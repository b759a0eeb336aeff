//! Persistence seam.
//!
//! The pipeline does not own a database. Whatever stores its output
//! implements [`ConversationStore`] and hands back the ids it assigns;
//! [`persist_upload`] uses those ids to link attachments to messages.
//! Transaction boundaries belong to the store.
//!
//! [`MemoryStore`] keeps everything in memory. The CLI renders it as JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ParsedMessage;
use crate::core::{AttachmentInsert, ParsedConversation};
use crate::error::Result;
use crate::ingest::ParsedUpload;
use crate::media::resolve_attachments;
use crate::parsing::now_timestamp;

/// Receives parsed conversations and assigns their ids.
pub trait ConversationStore {
    /// Stores a conversation header and returns its id.
    fn insert_conversation(&mut self, source: &str, conversation: &ParsedConversation)
    -> Result<i64>;

    /// Stores one message and returns its id.
    fn insert_message(&mut self, conversation_id: i64, message: &ParsedMessage) -> Result<i64>;

    /// Stores one resolved attachment and returns its id.
    fn insert_attachment(&mut self, attachment: &AttachmentInsert) -> Result<i64>;
}

/// Writes one parsed upload through `store`.
///
/// Messages are inserted in transcript order. Attachment references are
/// resolved only after every message of their conversation has an id.
/// Returns the ids of the created conversations.
pub fn persist_upload<S>(store: &mut S, upload: &ParsedUpload) -> Result<Vec<i64>>
where
    S: ConversationStore + ?Sized,
{
    let now = now_timestamp();
    let mut created = Vec::with_capacity(upload.conversations.len());

    for conversation in &upload.conversations {
        let conversation_id = store.insert_conversation(&upload.source, conversation)?;
        created.push(conversation_id);

        let mut message_ids = HashMap::new();
        for message in &conversation.messages {
            let message_id = store.insert_message(conversation_id, message)?;
            if let Some(external_id) = &message.external_id {
                message_ids.insert(external_id.clone(), message_id);
            }
        }

        let attachments = resolve_attachments(
            conversation_id,
            &conversation.attachment_refs,
            &upload.media,
            &message_ids,
            &now,
        );
        debug!(
            conversation_id,
            declared = conversation.attachment_refs.len(),
            resolved = attachments.len(),
            "resolved attachments"
        );
        for attachment in &attachments {
            store.insert_attachment(attachment)?;
        }
    }

    Ok(created)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConversation {
    pub id: i64,
    pub title: String,
    pub source: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    pub id: i64,
    #[serde(flatten)]
    pub row: AttachmentInsert,
}

/// In-memory [`ConversationStore`] with sequential ids starting at 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    pub conversations: Vec<StoredConversation>,
    pub messages: Vec<StoredMessage>,
    pub attachments: Vec<StoredAttachment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of a conversation, in insertion order.
    pub fn messages_of(&self, conversation_id: i64) -> impl Iterator<Item = &StoredMessage> {
        self.messages
            .iter()
            .filter(move |m| m.conversation_id == conversation_id)
    }

    /// Attachments of a conversation, in insertion order.
    pub fn attachments_of(&self, conversation_id: i64) -> impl Iterator<Item = &StoredAttachment> {
        self.attachments
            .iter()
            .filter(move |a| a.row.conversation_id == conversation_id)
    }
}

impl ConversationStore for MemoryStore {
    fn insert_conversation(
        &mut self,
        source: &str,
        conversation: &ParsedConversation,
    ) -> Result<i64> {
        let id = self.conversations.len() as i64 + 1;
        self.conversations.push(StoredConversation {
            id,
            title: conversation.title.clone(),
            source: source.to_string(),
            created_at: conversation.created_at.clone(),
            updated_at: conversation.updated_at.clone(),
        });
        Ok(id)
    }

    fn insert_message(&mut self, conversation_id: i64, message: &ParsedMessage) -> Result<i64> {
        let id = self.messages.len() as i64 + 1;
        self.messages.push(StoredMessage {
            id,
            conversation_id,
            role: message.role.clone(),
            content: message.content.clone(),
            timestamp: message.timestamp.clone(),
        });
        Ok(id)
    }

    fn insert_attachment(&mut self, attachment: &AttachmentInsert) -> Result<i64> {
        let id = self.attachments.len() as i64 + 1;
        self.attachments.push(StoredAttachment {
            id,
            row: attachment.clone(),
        });
        Ok(id)
    }
}
