//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - Output format options

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::IngestConfig;
use crate::error::Result;

/// Import AI chat exports (JSON transcripts and ZIP archives) into one
/// normalized set of conversations, messages and attachments.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatvault")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    chatvault chat.json
    chatvault export.zip --media-dir ./media -o archive.json
    chatvault a.json b.json export.zip -f jsonl
    RUST_LOG=chatvault=debug chatvault export.zip")]
pub struct Args {
    /// Export files to import (.json or .zip)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Directory extracted attachments are written to
    #[arg(long, value_name = "DIR", default_value = "media")]
    pub media_dir: PathBuf,

    /// Leading segment of stored attachment paths
    #[arg(long, value_name = "PREFIX", default_value = "media")]
    pub media_prefix: String,

    /// Title for archive conversations that have none
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Path to output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format [default: from the --output extension, else json]
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the ingestion configuration these arguments describe.
    pub fn ingest_config(&self) -> IngestConfig {
        let config = IngestConfig::new()
            .with_media_root(&self.media_dir)
            .with_media_prefix(&self.media_prefix);
        match &self.title {
            Some(title) => config.with_default_title(title),
            None => config,
        }
    }

    /// Resolves the output format.
    ///
    /// An explicit `--format` wins. Otherwise it is inferred from the
    /// `--output` extension, and stdout gets JSON.
    pub fn output_format(&self) -> Result<crate::core::OutputFormat> {
        match (self.format, &self.output) {
            (Some(format), _) => Ok(format.into()),
            (None, Some(path)) => crate::core::OutputFormat::from_path(path),
            (None, None) => Ok(crate::core::OutputFormat::default()),
        }
    }

    /// Default log filter for the verbosity level.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Output format options.
///
/// - [`Json`](OutputFormat::Json) - Pretty JSON array
/// - [`Jsonl`](OutputFormat::Jsonl) - One conversation per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON array (default)
    #[default]
    Json,

    /// JSON Lines
    #[value(alias = "ndjson")]
    Jsonl,
}

impl From<OutputFormat> for crate::core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => crate::core::OutputFormat::Json,
            OutputFormat::Jsonl => crate::core::OutputFormat::Jsonl,
        }
    }
}
