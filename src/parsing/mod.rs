//! Shared parsing utilities.
//!
//! Text extraction and timestamp coercion used by both the flat transcript
//! parser and the conversation-graph parser.

pub mod text;
pub mod timestamp;

pub use text::extract_content_text;
pub use timestamp::{
    coerce_timestamp, epoch_to_timestamp, format_timestamp, now_timestamp, string_timestamp,
    timestamp_or_now,
};
