//! Core data types and output rendering.
//!
//! This module contains:
//! - [`models`] - Conversations, attachment references, media records
//! - [`output`] - JSON / JSONL rendering of stored snapshots

pub mod models;
pub mod output;

pub use models::{
    AttachmentInsert, ExtractedMediaRecord, MediaIndex, ParsedAttachmentRef, ParsedConversation,
};
pub use output::{OutputFormat, render, to_json, to_jsonl, write_output};

pub use crate::ParsedMessage;
