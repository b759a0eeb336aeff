//! Archive attachment extraction.
//!
//! Walks a ZIP export, stores every binary entry under the media root, and
//! builds the [`MediaIndex`] used to resolve attachment references.
//!
//! Stored names are `{upload stem}_{base name}`. When that name is taken the
//! counter form `{upload stem}_{n}_{base name}` is tried for n = 1, 2, ...
//! Files are created with create-exclusive semantics, so extractors running
//! concurrently against one media root never overwrite each other.

use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use super::mime::{guess_mime, is_binary_entry};
use crate::config::IngestConfig;
use crate::core::{ExtractedMediaRecord, MediaIndex};
use crate::error::{ChatvaultError, Result};

/// Extracts binary attachments from archive exports.
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    media_root: PathBuf,
    media_prefix: String,
    graph_member: String,
    fallback_name: String,
    sniff_len: usize,
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self::with_config(&IngestConfig::default())
    }

    pub fn with_config(config: &IngestConfig) -> Self {
        Self {
            media_root: config.media_root.clone(),
            media_prefix: config.media_prefix.clone(),
            graph_member: config.graph_member.clone(),
            fallback_name: config.fallback_attachment_name.clone(),
            sniff_len: config.sniff_len,
        }
    }

    /// Reads the conversation-graph member, wherever it sits in the archive.
    pub fn read_graph_member(&self, raw: &[u8], upload_name: &str) -> Result<(String, Vec<u8>)> {
        let mut archive = open_archive(raw, upload_name)?;

        let member = archive
            .file_names()
            .find(|name| base_name(name) == self.graph_member)
            .map(ToString::to_string)
            .ok_or_else(|| {
                ChatvaultError::invalid_format(
                    "ZIP export",
                    format!("archive is missing {}", self.graph_member),
                )
            })?;

        let mut entry = archive
            .by_name(&member)
            .map_err(|e| ChatvaultError::decode(upload_name, e))?;
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| ChatvaultError::decode(upload_name, ZipError::from(e)))?;

        Ok((member, data))
    }

    /// Stores every binary entry of the archive and indexes it.
    pub fn extract(&self, raw: &[u8], upload_name: &str) -> Result<MediaIndex> {
        let mut archive = open_archive(raw, upload_name)?;
        let stem = upload_stem(upload_name);
        let mut index = MediaIndex::new();

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ChatvaultError::decode(upload_name, e))?;
            if entry.is_dir() {
                continue;
            }

            let path = entry.name().to_string();
            if base_name(&path) == self.graph_member {
                continue;
            }

            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| ChatvaultError::decode(upload_name, ZipError::from(e)))?;

            if !is_binary_entry(&path, &data, self.sniff_len) {
                debug!(entry = %path, "skipping textual archive entry");
                continue;
            }

            let safe_name = self.safe_name(&path);
            let stored_name = self.store(stem, &safe_name, &data)?;
            let record = ExtractedMediaRecord {
                display_name: safe_name.clone(),
                storage_path: self.storage_path(&stored_name),
                mime_type: guess_mime(&stored_name).map(ToString::to_string),
            };
            info!(entry = %path, stored = %record.storage_path, bytes = data.len(), "stored attachment");

            index.insert(record, &[&safe_name, &stored_name]);
        }

        Ok(index)
    }

    /// Base name of an archive path, or the placeholder when there is none.
    fn safe_name(&self, path: &str) -> String {
        let name = base_name(path);
        if name.is_empty() {
            self.fallback_name.clone()
        } else {
            name.to_string()
        }
    }

    /// Writes `data` under the first free collision-safe name and returns it.
    fn store(&self, stem: &str, safe_name: &str, data: &[u8]) -> io::Result<String> {
        fs::create_dir_all(&self.media_root)?;

        let mut counter: u32 = 0;
        loop {
            let candidate = if counter == 0 {
                format!("{stem}_{safe_name}")
            } else {
                format!("{stem}_{counter}_{safe_name}")
            };
            let target = self.media_root.join(&candidate);

            match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(data) {
                        let _ = fs::remove_file(&target);
                        return Err(e);
                    }
                    return Ok(candidate);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(e),
            }
        }
    }

    fn storage_path(&self, stored_name: &str) -> String {
        let prefix = self.media_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            stored_name.to_string()
        } else {
            format!("{prefix}/{stored_name}")
        }
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn open_archive<'a>(raw: &'a [u8], upload_name: &str) -> Result<ZipArchive<Cursor<&'a [u8]>>> {
    ZipArchive::new(Cursor::new(raw)).map_err(|e| ChatvaultError::decode(upload_name, e))
}

/// Last path component; both separators count.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or_default()
}

/// File name of the upload without its extension.
pub(crate) fn upload_stem(upload_name: &str) -> &str {
    Path::new(upload_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload")
}
