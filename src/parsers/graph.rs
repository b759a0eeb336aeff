//! Conversation-graph parser for archive exports.
//!
//! An archive's `conversations.json` is a list of conversations. Each one
//! records its full branching edit history as a mapping of node ids to
//! nodes, plus the id of the node the user was last looking at:
//!
//! ```json
//! [{
//!   "title": "Trip planning",
//!   "create_time": 1705314600.0,
//!   "current_node": "leaf",
//!   "mapping": {
//!     "root": {"message": null, "parent": null},
//!     "q":    {"parent": "root", "message": {"author": {"role": "user"},
//!              "content": {"parts": ["Where to?"]}, "create_time": 1705314601.0}},
//!     "leaf": {"parent": "q", "message": {"author": {"role": "assistant"},
//!              "content": {"parts": ["Lisbon."]}}}
//!   }
//! }]
//! ```
//!
//! Only the ancestor chain of `current_node` is kept; sibling branches are
//! discarded.

use std::collections::{HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::IngestConfig;
use crate::core::{ParsedAttachmentRef, ParsedConversation};
use crate::error::{ChatvaultError, Result};
use crate::message::{ParsedMessage, Role};
use crate::parsing::{coerce_timestamp, extract_content_text, timestamp_or_now};

const FORMAT: &str = "conversation graph";

/// One conversation as stored in the export.
///
/// Every field is read leniently: a value of the wrong type counts as
/// absent, and mapping entries that are not objects are left out, so a
/// walk that reaches one stops there.
#[derive(Debug, Default, Deserialize)]
pub struct GraphConversation {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub create_time: Option<Value>,
    #[serde(default)]
    pub update_time: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_node: Option<String>,
    #[serde(default, deserialize_with = "lenient_mapping")]
    pub mapping: HashMap<String, GraphNode>,
}

/// A node in the conversation graph.
#[derive(Debug, Default, Deserialize)]
pub struct GraphNode {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<GraphMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub parent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<GraphAuthor>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub create_time: Option<Value>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
}

/// Reads a field as `T`, or `None` when it has some other shape.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps only the mapping entries that are objects.
fn lenient_mapping<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, GraphNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };

    Ok(entries
        .into_iter()
        .filter(|(_, node)| node.is_object())
        .filter_map(|(id, node)| serde_json::from_value(node).ok().map(|node| (id, node)))
        .collect())
}

/// Parser for conversation-graph documents.
pub struct GraphParser {
    default_title: String,
}

impl GraphParser {
    pub fn new() -> Self {
        Self::with_config(&IngestConfig::default())
    }

    pub fn with_config(config: &IngestConfig) -> Self {
        Self {
            default_title: config.default_title.clone(),
        }
    }

    /// Parses the raw graph document.
    ///
    /// Conversations without a single usable message are dropped. If every
    /// conversation drops out the whole document is rejected.
    pub fn parse_slice(&self, raw: &[u8], file_name: &str) -> Result<Vec<ParsedConversation>> {
        let text = std::str::from_utf8(raw).map_err(|e| ChatvaultError::decode(file_name, e))?;
        let payload: Value =
            serde_json::from_str(text).map_err(|e| ChatvaultError::decode(file_name, e))?;

        let Value::Array(items) = payload else {
            return Err(ChatvaultError::invalid_format(
                FORMAT,
                "expected a list of conversations",
            ));
        };

        let mut conversations = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            if !item.is_object() {
                continue;
            }
            let conversation: GraphConversation = match serde_json::from_value(item) {
                Ok(conversation) => conversation,
                Err(e) => {
                    warn!(position, error = %e, "skipping malformed conversation");
                    continue;
                }
            };
            match self.linearize(&conversation) {
                Some(parsed) => conversations.push(parsed),
                None => debug!(position, "dropping conversation without messages"),
            }
        }

        if conversations.is_empty() {
            return Err(ChatvaultError::no_messages(FORMAT));
        }
        Ok(conversations)
    }

    /// Turns one graph conversation into an ordered transcript.
    ///
    /// Returns `None` when no message survives.
    pub fn linearize(&self, raw: &GraphConversation) -> Option<ParsedConversation> {
        let created_at = timestamp_or_now(raw.create_time.as_ref());
        let updated_at =
            coerce_timestamp(raw.update_time.as_ref()).unwrap_or_else(|| created_at.clone());

        let path = match raw.current_node.as_deref() {
            Some(current) => ancestor_path(&raw.mapping, current),
            None => Vec::new(),
        };

        let mut messages = Vec::new();
        let mut attachment_refs = Vec::new();
        for node_id in path {
            let Some(message) = raw.mapping[node_id].message.as_ref() else {
                continue;
            };
            let Some(parsed) = node_message(node_id, message, &created_at) else {
                continue;
            };
            attachment_refs.extend(attachment_refs_for(node_id, message));
            messages.push(parsed);
        }

        if messages.is_empty() {
            return None;
        }

        let title = match &raw.title {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            _ => self.default_title.clone(),
        };
        debug!(title = %title, messages = messages.len(), attachments = attachment_refs.len(), "linearized conversation");

        Some(ParsedConversation {
            title,
            created_at,
            updated_at,
            messages,
            attachment_refs,
        })
    }
}

impl Default for GraphParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Walks parent pointers from `current_node` back to the root.
///
/// Returns node ids in root-to-leaf order. The walk stops at a node with no
/// parent, at a parent id missing from the mapping, or when an id repeats.
pub fn ancestor_path<'a>(mapping: &'a HashMap<String, GraphNode>, current_node: &str) -> Vec<&'a str> {
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = mapping.get_key_value(current_node);

    while let Some((id, node)) = cursor {
        if !seen.insert(id.as_str()) {
            break;
        }
        path.push(id.as_str());
        cursor = node
            .parent
            .as_deref()
            .and_then(|parent| mapping.get_key_value(parent));
    }

    path.reverse();
    path
}

fn node_message(node_id: &str, message: &GraphMessage, fallback_ts: &str) -> Option<ParsedMessage> {
    let role = message
        .author
        .as_ref()
        .and_then(|author| author.role.as_deref())
        .and_then(Role::parse)?;

    let content = message
        .content
        .as_ref()
        .map(extract_content_text)
        .unwrap_or_default();
    if content.is_empty() {
        return None;
    }

    let timestamp =
        coerce_timestamp(message.create_time.as_ref()).unwrap_or_else(|| fallback_ts.to_string());

    Some(ParsedMessage::new(role.as_str(), content, timestamp).with_external_id(node_id))
}

/// Collects `metadata.attachments` declarations of one message.
///
/// Entries that are not objects still produce a reference with every field
/// unset.
fn attachment_refs_for(node_id: &str, message: &GraphMessage) -> Vec<ParsedAttachmentRef> {
    let Some(entries) = message
        .metadata
        .as_ref()
        .and_then(|meta| meta.get("attachments"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let empty = Map::new();
    entries
        .iter()
        .map(|entry| {
            let obj = entry.as_object().unwrap_or(&empty);
            ParsedAttachmentRef {
                external_message_id: Some(node_id.to_string()),
                file_id: first_string(obj, &["file_id", "id"]),
                file_name: first_string(obj, &["name", "file_name"]),
                mime_type: first_string(obj, &["mime_type", "content_type"]),
            }
        })
        .collect()
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversation(value: Value) -> GraphConversation {
        serde_json::from_value(value).unwrap()
    }

    fn node(parent: Option<&str>, role: &str, text: &str) -> Value {
        json!({
            "parent": parent,
            "message": {
                "author": {"role": role},
                "content": {"content_type": "text", "parts": [text]},
            }
        })
    }

    #[test]
    fn test_ancestor_path_root_to_leaf() {
        let raw = conversation(json!({
            "current_node": "leaf",
            "mapping": {
                "leaf": node(Some("mid"), "assistant", "c"),
                "root": node(None, "user", "a"),
                "mid": node(Some("root"), "user", "b"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "leaf"), ["root", "mid", "leaf"]);
    }

    #[test]
    fn test_ancestor_path_missing_parent_stops() {
        let raw = conversation(json!({
            "mapping": {
                "leaf": node(Some("mid"), "assistant", "c"),
                "mid": node(Some("ghost"), "user", "b"),
                "root": node(None, "user", "a"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "leaf"), ["mid", "leaf"]);
    }

    #[test]
    fn test_ancestor_path_cycle_terminates() {
        let raw = conversation(json!({
            "mapping": {
                "a": node(Some("b"), "user", "a"),
                "b": node(Some("a"), "assistant", "b"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "a"), ["b", "a"]);

        let raw = conversation(json!({"mapping": {"self": node(Some("self"), "user", "x")}}));
        assert_eq!(ancestor_path(&raw.mapping, "self"), ["self"]);
    }

    #[test]
    fn test_ancestor_path_unknown_current_node() {
        let raw = conversation(json!({"mapping": {"a": node(None, "user", "a")}}));
        assert!(ancestor_path(&raw.mapping, "missing").is_empty());
    }

    #[test]
    fn test_linearize_discards_sibling_branches() {
        let raw = conversation(json!({
            "title": "Branches",
            "current_node": "b2",
            "mapping": {
                "root": {"message": null, "parent": null},
                "q": node(Some("root"), "user", "question"),
                "b1": node(Some("q"), "assistant", "first draft"),
                "b2": node(Some("q"), "assistant", "second draft"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();

        let contents: Vec<_> = conv.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["question", "second draft"]);
        assert_eq!(conv.messages[0].external_id.as_deref(), Some("q"));
        assert_eq!(conv.messages[1].external_id.as_deref(), Some("b2"));
    }

    #[test]
    fn test_unknown_role_skipped_without_breaking_walk() {
        let raw = conversation(json!({
            "current_node": "c",
            "mapping": {
                "a": node(None, "user", "ask"),
                "b": node(Some("a"), "tool", "tool output"),
                "c": node(Some("b"), "assistant", "answer"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();

        let roles: Vec<_> = conv.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant"]);
    }

    #[test]
    fn test_empty_content_and_missing_author_skipped() {
        let raw = conversation(json!({
            "current_node": "c",
            "mapping": {
                "a": node(None, "user", "   "),
                "b": {"parent": "a", "message": {"content": {"parts": ["no author"]}}},
                "c": node(Some("b"), "assistant", "kept"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].content, "kept");
    }

    #[test]
    fn test_no_surviving_messages_drops_conversation() {
        let raw = conversation(json!({
            "current_node": "a",
            "mapping": {"a": {"message": null, "parent": null}}
        }));
        assert!(GraphParser::new().linearize(&raw).is_none());

        let raw = conversation(json!({"mapping": {"a": node(None, "user", "hi")}}));
        assert!(GraphParser::new().linearize(&raw).is_none());
    }

    #[test]
    fn test_timestamps() {
        let raw = conversation(json!({
            "create_time": 0,
            "current_node": "b",
            "mapping": {
                "a": {"parent": null, "message": {
                    "author": {"role": "user"},
                    "content": {"parts": ["hi"]},
                    "create_time": 1705314600
                }},
                "b": node(Some("a"), "assistant", "hello"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();

        assert_eq!(conv.created_at, "1970-01-01T00:00:00Z");
        assert_eq!(conv.updated_at, "1970-01-01T00:00:00Z");
        assert_eq!(conv.messages[0].timestamp, "2024-01-15T10:30:00Z");
        assert_eq!(conv.messages[1].timestamp, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_title_default() {
        let config = IngestConfig::new().with_default_title("Untitled");
        let parser = GraphParser::with_config(&config);

        for title in [json!(null), json!(""), json!("  "), json!(5)] {
            let raw = conversation(json!({
                "title": title,
                "current_node": "a",
                "mapping": {"a": node(None, "user", "hi")}
            }));
            assert_eq!(parser.linearize(&raw).unwrap().title, "Untitled");
        }
    }

    #[test]
    fn test_attachment_refs() {
        let raw = conversation(json!({
            "current_node": "b",
            "mapping": {
                "a": {"parent": null, "message": {
                    "author": {"role": "user"},
                    "content": {"parts": ["see file"]},
                    "metadata": {"attachments": [
                        {"id": "file-1", "name": "Photo.PNG", "mime_type": "image/png"},
                        {"file_id": "file-2", "file_name": "notes.pdf", "content_type": "application/pdf"},
                        {"name": "partial.bin"},
                        "garbage"
                    ]}
                }},
                "b": node(Some("a"), "assistant", "ok"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();

        assert_eq!(conv.attachment_refs.len(), 4);
        let first = &conv.attachment_refs[0];
        assert_eq!(first.external_message_id.as_deref(), Some("a"));
        assert_eq!(first.file_id.as_deref(), Some("file-1"));
        assert_eq!(first.file_name.as_deref(), Some("Photo.PNG"));
        assert_eq!(first.mime_type.as_deref(), Some("image/png"));

        let second = &conv.attachment_refs[1];
        assert_eq!(second.file_id.as_deref(), Some("file-2"));
        assert_eq!(second.file_name.as_deref(), Some("notes.pdf"));
        assert_eq!(second.mime_type.as_deref(), Some("application/pdf"));

        assert!(conv.attachment_refs[2].file_id.is_none());
        assert_eq!(
            conv.attachment_refs[3],
            ParsedAttachmentRef {
                external_message_id: Some("a".to_string()),
                ..ParsedAttachmentRef::default()
            }
        );
    }

    #[test]
    fn test_attachments_on_dropped_node_ignored() {
        let raw = conversation(json!({
            "current_node": "b",
            "mapping": {
                "a": {"parent": null, "message": {
                    "author": {"role": "tool"},
                    "content": {"parts": ["x"]},
                    "metadata": {"attachments": [{"name": "a.png"}]}
                }},
                "b": node(Some("a"), "user", "hi"),
            }
        }));
        let conv = GraphParser::new().linearize(&raw).unwrap();
        assert!(conv.attachment_refs.is_empty());
    }

    #[test]
    fn test_malformed_sibling_nodes_do_not_break_path() {
        let doc = json!([{
            "current_node": "b",
            "mapping": {
                "a": node(None, "user", "question"),
                "b": node(Some("a"), "assistant", "answer"),
                "junk": null,
                "odd": {"parent": 7, "message": {"author": {"role": null, "name": 3}}},
                "stray": {"parent": "a", "message": "not an object"}
            }
        }]);
        let convs = GraphParser::new()
            .parse_slice(doc.to_string().as_bytes(), "conversations.json")
            .unwrap();

        let contents: Vec<_> = convs[0].messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["question", "answer"]);
    }

    #[test]
    fn test_numeric_role_on_path_drops_only_that_node() {
        let raw = conversation(json!({
            "current_node": "c",
            "mapping": {
                "a": node(None, "user", "first"),
                "b": {"parent": "a", "message": {"author": {"role": 5}, "content": {"parts": ["lost"]}}},
                "c": node(Some("b"), "assistant", "last"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "c"), ["a", "b", "c"]);

        let conv = GraphParser::new().linearize(&raw).unwrap();
        let contents: Vec<_> = conv.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "last"]);
    }

    #[test]
    fn test_numeric_parent_on_path_ends_walk() {
        let raw = conversation(json!({
            "current_node": "c",
            "mapping": {
                "a": node(None, "user", "unreachable"),
                "b": {"parent": 1, "message": {"author": {"role": "user"}, "content": {"parts": ["kept"]}}},
                "c": node(Some("b"), "assistant", "last"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "c"), ["b", "c"]);
    }

    #[test]
    fn test_non_object_node_on_path_ends_walk() {
        let raw = conversation(json!({
            "current_node": "c",
            "mapping": {
                "a": node(None, "user", "unreachable"),
                "b": [1, 2],
                "c": node(Some("b"), "assistant", "last"),
            }
        }));
        assert_eq!(ancestor_path(&raw.mapping, "c"), ["c"]);

        let raw = conversation(json!({"current_node": 3, "mapping": {"a": node(None, "user", "x")}}));
        assert!(raw.current_node.is_none());
        assert!(GraphParser::new().linearize(&raw).is_none());
    }

    #[test]
    fn test_parse_slice() {
        let doc = json!([
            {"title": "Kept", "current_node": "a", "mapping": {"a": node(None, "user", "hi")}},
            {"title": "Dropped", "current_node": "a", "mapping": {}},
            "not a conversation",
            {"title": "Bad mapping", "mapping": 12}
        ]);
        let convs = GraphParser::new()
            .parse_slice(doc.to_string().as_bytes(), "conversations.json")
            .unwrap();

        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].title, "Kept");
    }

    #[test]
    fn test_parse_slice_errors() {
        let parser = GraphParser::new();

        let err = parser.parse_slice(br#"{"mapping": {}}"#, "c.json").unwrap_err();
        assert!(err.is_invalid_format());

        let err = parser.parse_slice(b"[]", "c.json").unwrap_err();
        assert!(err.is_no_messages());

        let err = parser.parse_slice(b"[", "export.zip/conversations.json").unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("export.zip/conversations.json"));
    }
}
