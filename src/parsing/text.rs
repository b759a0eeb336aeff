//! Plain-text extraction from structured message content.

use serde_json::Value;

/// Extracts plain text from a message `content` object.
///
/// The content carries an ordered `parts` list. Each part is either a raw
/// string or an object with a `text` field:
///
/// ```json
/// {"content_type": "text", "parts": ["Hello", {"text": "world"}]}
/// ```
///
/// Textual parts are trimmed, empty ones dropped, and the rest joined with a
/// single newline in their original order. Anything else (images, nulls,
/// numbers) is ignored. Returns an empty string when no text is present.
///
/// # Example
///
/// ```
/// use chatvault::parsing::extract_content_text;
/// use serde_json::json;
///
/// let content = json!({"parts": ["Hello", {"text": "world"}]});
/// assert_eq!(extract_content_text(&content), "Hello\nworld");
/// ```
pub fn extract_content_text(content: &Value) -> String {
    let Some(parts) = content.get("parts").and_then(Value::as_array) else {
        return String::new();
    };

    parts
        .iter()
        .filter_map(|part| match part {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
