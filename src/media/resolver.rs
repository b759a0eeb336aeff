//! Matching attachment references against extracted media.

use std::collections::HashMap;

use crate::core::{AttachmentInsert, ExtractedMediaRecord, MediaIndex, ParsedAttachmentRef};

/// Looks up the media record a reference points at.
///
/// The declared file name is tried first, then the file id. A reference
/// without a declared name never matches.
pub fn resolve_ref<'a>(
    attachment: &ParsedAttachmentRef,
    index: &'a MediaIndex,
) -> Option<&'a ExtractedMediaRecord> {
    let file_name = attachment.file_name.as_deref()?;
    index.get(file_name).or_else(|| {
        attachment
            .file_id
            .as_deref()
            .and_then(|file_id| index.get(file_id))
    })
}

/// Turns a conversation's attachment references into insert rows.
///
/// `message_ids` maps graph node ids to stored message ids. References that
/// match no extracted file are dropped; many declared attachments (hosted
/// images, for one) never appear in the archive.
pub fn resolve_attachments(
    conversation_id: i64,
    refs: &[ParsedAttachmentRef],
    index: &MediaIndex,
    message_ids: &HashMap<String, i64>,
    created_at: &str,
) -> Vec<AttachmentInsert> {
    refs.iter()
        .filter_map(|attachment| {
            let media = resolve_ref(attachment, index)?;
            Some(AttachmentInsert {
                conversation_id,
                message_id: attachment
                    .external_message_id
                    .as_deref()
                    .and_then(|id| message_ids.get(id).copied()),
                file_id: attachment.file_id.clone(),
                file_name: media.display_name.clone(),
                mime_type: attachment
                    .mime_type
                    .clone()
                    .or_else(|| media.mime_type.clone()),
                storage_path: media.storage_path.clone(),
                created_at: created_at.to_string(),
            })
        })
        .collect()
}
