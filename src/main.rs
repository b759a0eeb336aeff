//! # chatvault CLI
//!
//! Command-line interface for the chatvault library.

use std::io::Write;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatvault::ChatvaultError;
use chatvault::cli::Args;
use chatvault::core::{OutputFormat, render, write_output};
use chatvault::ingest::{FileError, Ingestor, Upload};
use chatvault::store::{MemoryStore, persist_upload};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(&args);

    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `Ok(false)` when no file could be imported.
fn run(args: &Args) -> Result<bool, ChatvaultError> {
    let start = Instant::now();
    let format = args.output_format()?;

    eprintln!("📦 chatvault v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!("📂 Files:   {}", args.files.len());
    eprintln!("🖼  Media:   {}", args.media_dir.display());
    eprintln!();

    let mut uploads = Vec::with_capacity(args.files.len());
    let mut unreadable = Vec::new();
    for path in &args.files {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => unreadable.push(FileError {
                file_name: path.display().to_string(),
                error: e.into(),
            }),
        }
    }

    let ingestor = Ingestor::new(args.ingest_config());
    let report = ingestor.ingest_batch(&uploads);

    let mut store = MemoryStore::new();
    let mut failures = unreadable;
    failures.extend(report.errors);
    let mut imported = 0;
    for upload in &report.uploads {
        match persist_upload(&mut store, upload) {
            Ok(ids) => {
                imported += 1;
                eprintln!(
                    "✅ {}: {} conversation(s), {} message(s), {} attachment file(s)",
                    upload.source,
                    ids.len(),
                    upload.message_count(),
                    upload.media.len()
                );
            }
            Err(error) => failures.push(FileError {
                file_name: upload.source.clone(),
                error,
            }),
        }
    }
    for failure in &failures {
        eprintln!("❌ {}", failure);
    }

    match &args.output {
        Some(path) => {
            write_output(&store, path, format)?;
            eprintln!("💾 Output saved to {} ({})", path.display(), format);
        }
        None => {
            let rendered = render(&store, format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            if format == OutputFormat::Json {
                writeln!(stdout)?;
            }
        }
    }

    eprintln!();
    eprintln!("📊 Summary:");
    eprintln!("   Imported:      {} file(s)", imported);
    eprintln!("   Failed:        {} file(s)", failures.len());
    eprintln!("   Conversations: {}", store.conversations.len());
    eprintln!("   Messages:      {}", store.messages.len());
    eprintln!("   Attachments:   {}", store.attachments.len());
    eprintln!("   Total time:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(imported > 0)
}
