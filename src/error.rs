//! Unified error types for chatvault.
//!
//! This module provides a single [`ChatvaultError`] enum that covers every
//! way a single upload can fail. The ingestion coordinator never lets one of
//! these escape a batch: each failure is attached to the file that caused it
//! (see [`FileError`](crate::ingest::FileError)).
//!
//! # Error Kinds
//!
//! - **Format** ([`ChatvaultError::InvalidFormat`]) - the input is well-formed
//!   but not a shape we accept (unknown extension, wrong top-level JSON,
//!   archive without a conversation graph).
//! - **Content** ([`ChatvaultError::NoMessages`]) - the input parsed, but
//!   nothing usable survived normalization.
//! - **Decode** ([`ChatvaultError::Decode`]) - the bytes are not UTF-8, not
//!   JSON, or not a readable archive.

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for chatvault operations.
pub type Result<T> = std::result::Result<T, ChatvaultError>;

/// The error type for all chatvault operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatvaultError {
    /// An I/O error occurred while storing extracted media.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input does not have the structure expected for its format.
    ///
    /// This occurs when:
    /// - A transcript is neither an object nor a list
    /// - The file extension is not `.json` or `.zip`
    /// - An archive has no conversation-graph member
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// The format that was expected (e.g. "JSON transcript")
        format: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// Well-formed input yielded zero usable messages.
    #[error("No valid messages found in {format} export")]
    NoMessages {
        /// The format that was parsed
        format: &'static str,
    },

    /// The raw bytes could not be decoded.
    #[error("Failed to decode {file}: {source}")]
    Decode {
        /// Name of the offending file (the upload, or the archive member)
        file: String,
        /// The underlying decode error
        #[source]
        source: DecodeErrorKind,
    },

    /// JSON serialization error while rendering output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinds of decode errors that can occur.
#[derive(Debug, Error)]
pub enum DecodeErrorKind {
    /// Bytes are not valid UTF-8
    #[error("{0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Bytes are not valid JSON
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Bytes are not a readable ZIP archive
    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatvaultError {
    /// Creates an invalid format error.
    pub fn invalid_format(format: &'static str, message: impl Into<String>) -> Self {
        ChatvaultError::InvalidFormat {
            format,
            message: message.into(),
        }
    }

    /// Creates a "nothing usable" content error.
    pub fn no_messages(format: &'static str) -> Self {
        ChatvaultError::NoMessages { format }
    }

    /// Creates a decode error for the named file.
    pub fn decode(file: impl Into<String>, source: impl Into<DecodeErrorKind>) -> Self {
        ChatvaultError::Decode {
            file: file.into(),
            source: source.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatvaultError::Io(_))
    }

    /// Returns `true` if this is an invalid format error.
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, ChatvaultError::InvalidFormat { .. })
    }

    /// Returns `true` if the input yielded no usable messages.
    pub fn is_no_messages(&self) -> bool {
        matches!(self, ChatvaultError::NoMessages { .. })
    }

    /// Returns `true` if this is a decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, ChatvaultError::Decode { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
