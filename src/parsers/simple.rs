//! Flat JSON transcript parser.

use serde_json::Value;
use tracing::debug;

use crate::ParsedMessage;
use crate::core::ParsedConversation;
use crate::error::{ChatvaultError, Result};
use crate::parsing::{now_timestamp, string_timestamp};

const FORMAT: &str = "JSON transcript";

/// Parser for flat (non-branching) JSON transcripts.
///
/// Two top-level shapes are accepted:
/// ```json
/// {"title": "Optional Title", "messages": [{"role": "user", "content": "...", "timestamp": "..."}]}
/// ```
/// or a bare list of the same message objects, in which case the title comes
/// from the caller.
///
/// Roles are passed through verbatim (`"unknown"` when missing). Timestamps
/// are taken only from non-empty strings; anything else becomes the
/// ingestion time.
pub struct SimpleParser;

impl SimpleParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses raw upload bytes.
    ///
    /// `file_name` only labels decode errors.
    pub fn parse_slice(
        &self,
        raw: &[u8],
        file_name: &str,
        fallback_title: &str,
    ) -> Result<ParsedConversation> {
        let text = std::str::from_utf8(raw).map_err(|e| ChatvaultError::decode(file_name, e))?;
        let payload: Value =
            serde_json::from_str(text).map_err(|e| ChatvaultError::decode(file_name, e))?;
        self.parse_value(&payload, fallback_title)
    }

    /// Parses an already-decoded JSON document.
    pub fn parse_value(&self, payload: &Value, fallback_title: &str) -> Result<ParsedConversation> {
        let (title, entries) = match payload {
            Value::Object(obj) => (
                obj.get("title").and_then(title_string),
                obj.get("messages"),
            ),
            Value::Array(_) => (None, Some(payload)),
            _ => {
                return Err(ChatvaultError::invalid_format(
                    FORMAT,
                    "expected an object with \"messages\" or a list of messages",
                ));
            }
        };
        let title = title.unwrap_or_else(|| fallback_title.to_string());

        let messages: Vec<ParsedMessage> = entries
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(parse_entry).collect())
            .unwrap_or_default();

        if messages.is_empty() {
            return Err(ChatvaultError::no_messages(FORMAT));
        }
        debug!(title = %title, count = messages.len(), "parsed flat transcript");

        let now = now_timestamp();
        Ok(ParsedConversation::new(title, now.clone(), now, messages))
    }
}

impl Default for SimpleParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes one message entry. Non-objects and empty content yield `None`.
fn parse_entry(entry: &Value) -> Option<ParsedMessage> {
    let obj = entry.as_object()?;

    let content = obj.get("content").map(coerce_string).unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    let role = match obj.get("role") {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(value) => coerce_string(value),
    };
    let timestamp = obj
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(string_timestamp)
        .unwrap_or_else(now_timestamp);

    Some(ParsedMessage::new(role, content, timestamp))
}

/// Renders any JSON value as text. `null` is empty, composites are compact JSON.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A usable title: any value that is not null, `false`, zero or empty,
/// rendered as text.
fn title_string(value: &Value) -> Option<String> {
    let blank = match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    };
    (!blank).then(|| coerce_string(value))
}
