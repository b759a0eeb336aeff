//! Normalized message type shared by every import path.
//!
//! Both the flat transcript parser and the conversation-graph linearizer
//! produce [`ParsedMessage`] values. The content of a parsed message is never
//! empty: parsers drop empty messages before returning.
//!
//! # Example
//!
//! ```
//! use chatvault::ParsedMessage;
//!
//! let msg = ParsedMessage::new("user", "Hello!", "2024-01-15T10:30:00Z")
//!     .with_external_id("node-1");
//! assert_eq!(msg.role, "user");
//! assert_eq!(msg.external_id.as_deref(), Some("node-1"));
//! ```

use serde::{Deserialize, Serialize};

/// A single normalized chat message.
///
/// | Field | Description |
/// |-------|-------------|
/// | `role` | Author role (`user`, `assistant`, `system`; anything in flat transcripts) |
/// | `content` | Trimmed, non-empty text |
/// | `timestamp` | ISO-8601 string |
/// | `external_id` | Graph node id, only set for archive imports |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Author role.
    pub role: String,

    /// Text content of the message.
    pub content: String,

    /// When the message was written.
    ///
    /// Either derived from an epoch, passed through from the export verbatim,
    /// or the ingestion time.
    pub timestamp: String,

    /// Id of the graph node this message came from.
    ///
    /// Used to link attachment references back to the stored message.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub external_id: Option<String>,
}

impl ParsedMessage {
    /// Creates a message without an external id.
    pub fn new(
        role: impl Into<String>,
        content: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            timestamp: timestamp.into(),
            external_id: None,
        }
    }

    /// Builder method to set the external (graph node) id.
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// Author roles accepted from conversation graphs.
///
/// Graph nodes authored by any other role (tools, plugins) are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Returns the lowercase role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Parses a role name, returning `None` for roles outside the fixed set.
    ///
    /// Matching is exact: exports always use lowercase names.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
