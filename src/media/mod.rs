//! Attachment handling for archive exports.
//!
//! - [`mime`] - media type guessing and binary classification
//! - [`extractor`] - storing archive entries under collision-safe names
//! - [`resolver`] - linking attachment references to stored files

pub mod extractor;
pub mod mime;
pub mod resolver;

pub use extractor::ArchiveExtractor;
pub use mime::{guess_mime, is_binary_entry, is_textual_mime};
pub use resolver::{resolve_attachments, resolve_ref};
