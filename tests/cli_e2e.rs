//! End-to-end CLI tests for chatvault.
//!
//! These tests run the actual binary against fixture uploads and check the
//! rendered output, the media directory and the exit status.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Creates a temporary directory holding one upload of each kind plus a
/// couple of broken ones.
fn setup_fixtures() -> TempDir {
    let dir = tempdir().expect("Failed to create temp dir");

    let transcript = r#"{
  "title": "Quick question",
  "messages": [
    {"role": "user", "content": "Is Rust fast?", "timestamp": "2024-01-15T10:30:00"},
    {"role": "assistant", "content": "Yes."},
    {"role": "user", "content": "   "}
  ]
}"#;
    fs::write(dir.path().join("chat.json"), transcript).unwrap();

    let graph = r#"[{
  "title": "Holiday photo",
  "create_time": 1705314600,
  "current_node": "b",
  "mapping": {
    "a": {"parent": null, "message": {
      "author": {"role": "user"},
      "content": {"parts": ["Where was this taken?"]},
      "metadata": {"attachments": [{"id": "file-1", "name": "beach.jpg"}]}
    }},
    "b": {"parent": "a", "message": {
      "author": {"role": "assistant"},
      "content": {"parts": ["Looks like a beach."]}
    }}
  }
}]"#;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in [
        ("conversations.json", graph.as_bytes()),
        ("beach.jpg", b"\xff\xd8\xff\xe0".as_slice()),
        ("chat.html", b"<html></html>".as_slice()),
    ] {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    let archive = writer.finish().unwrap().into_inner();
    fs::write(dir.path().join("export.zip"), archive).unwrap();

    fs::write(dir.path().join("broken.json"), "this is not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "plain text").unwrap();

    dir
}

fn chatvault_cmd() -> Command {
    let cmd = std::process::Command::new(env!("CARGO_BIN_EXE_chatvault"));
    Command::from_std(cmd)
}

fn fixture(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_str().unwrap().to_string()
}

fn media_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("media")
}

// ============================================================================
// Imports
// ============================================================================

mod imports {
    use super::*;

    #[test]
    fn test_transcript_to_stdout() {
        let fixtures = setup_fixtures();
        let output = chatvault_cmd()
            .args([fixture(&fixtures, "chat.json")])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .assert()
            .success()
            .stderr(predicate::str::contains("chat.json"))
            .get_output()
            .stdout
            .clone();

        let rendered: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(rendered[0]["title"], "Quick question");
        assert_eq!(rendered[0]["messages"].as_array().unwrap().len(), 2);
        assert_eq!(rendered[0]["messages"][0]["timestamp"], "2024-01-15T10:30:00");
    }

    #[test]
    fn test_archive_writes_media() {
        let fixtures = setup_fixtures();
        let out = fixtures.path().join("archive.json");

        chatvault_cmd()
            .arg(fixture(&fixtures, "export.zip"))
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .arg("-o")
            .arg(&out)
            .assert()
            .success()
            .stderr(predicate::str::contains("Output saved"));

        assert!(media_dir(&fixtures).join("export_beach.jpg").exists());
        assert!(!media_dir(&fixtures).join("export_chat.html").exists());

        let rendered: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let attachment = &rendered[0]["attachments"][0];
        assert_eq!(attachment["storage_path"], "media/export_beach.jpg");
        assert_eq!(attachment["mime_type"], "image/jpeg");
        assert_eq!(attachment["message_id"], 1);
    }

    #[test]
    fn test_media_prefix_flag() {
        let fixtures = setup_fixtures();
        let output = chatvault_cmd()
            .arg(fixture(&fixtures, "export.zip"))
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .args(["--media-prefix", "uploads"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let rendered: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            rendered[0]["attachments"][0]["storage_path"],
            "uploads/export_beach.jpg"
        );
    }

    #[test]
    fn test_jsonl_format() {
        let fixtures = setup_fixtures();
        let output = chatvault_cmd()
            .args([fixture(&fixtures, "chat.json"), fixture(&fixtures, "export.zip")])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .args(["-f", "jsonl"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let _: Value = serde_json::from_str(line).unwrap();
        }
    }

    #[test]
    fn test_format_inferred_from_output_extension() {
        let fixtures = setup_fixtures();
        let out = fixtures.path().join("out.jsonl");

        chatvault_cmd()
            .args([fixture(&fixtures, "chat.json"), fixture(&fixtures, "export.zip")])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .arg("-o")
            .arg(&out)
            .assert()
            .success()
            .stderr(predicate::str::contains("JSONL"));

        let written = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["title"], "Quick question");
    }

    #[test]
    fn test_unknown_output_extension_rejected() {
        let fixtures = setup_fixtures();
        let out = fixtures.path().join("out.txt");

        chatvault_cmd()
            .arg(fixture(&fixtures, "chat.json"))
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .arg("-o")
            .arg(&out)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown file extension"));

        assert!(!out.exists());
    }
}

// ============================================================================
// Partial failure
// ============================================================================

mod partial_failure {
    use super::*;

    #[test]
    fn test_bad_file_does_not_abort_batch() {
        let fixtures = setup_fixtures();
        chatvault_cmd()
            .args([
                fixture(&fixtures, "broken.json"),
                fixture(&fixtures, "chat.json"),
                fixture(&fixtures, "notes.txt"),
            ])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .assert()
            .success()
            .stderr(predicate::str::contains("Failed to parse broken.json"))
            .stderr(predicate::str::contains("notes.txt"))
            .stdout(predicate::str::contains("Quick question"));
    }

    #[test]
    fn test_all_files_failing_exits_nonzero() {
        let fixtures = setup_fixtures();
        chatvault_cmd()
            .args([fixture(&fixtures, "broken.json"), fixture(&fixtures, "notes.txt")])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to parse"));
    }

    #[test]
    fn test_missing_file_reported() {
        let fixtures = setup_fixtures();
        chatvault_cmd()
            .args([fixture(&fixtures, "missing.json")])
            .arg("--media-dir")
            .arg(media_dir(&fixtures))
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing.json"));
    }
}

// ============================================================================
// Argument handling
// ============================================================================

mod arguments {
    use super::*;

    #[test]
    fn test_missing_input_argument() {
        chatvault_cmd().assert().failure();
    }

    #[test]
    fn test_invalid_format_option() {
        let fixtures = setup_fixtures();
        chatvault_cmd()
            .args([fixture(&fixtures, "chat.json")])
            .args(["-f", "csv"])
            .assert()
            .failure();
    }

    #[test]
    fn test_help_flag() {
        chatvault_cmd()
            .args(["--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chatvault"))
            .stdout(predicate::str::contains("--media-dir"));
    }

    #[test]
    fn test_version_flag() {
        chatvault_cmd()
            .args(["--version"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chatvault"));
    }
}
