//! Media type inference and binary/text classification of archive entries.

use std::path::Path;

/// Non-`text/*` types that still hold text.
const STRUCTURED_TEXT: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-subrip",
];

/// Guesses a media type from the extension of a path.
///
/// Matching is case-insensitive. Returns `None` for unknown or missing
/// extensions.
pub fn guess_mime(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        // Text
        "txt" | "text" | "log" => "text/plain",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "md" | "markdown" => "text/markdown",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "sh" => "text/x-sh",
        "yaml" | "yml" => "text/yaml",
        "ics" => "text/calendar",
        "vcf" => "text/vcard",
        "srt" => "application/x-subrip",
        "vtt" => "text/vtt",
        // Structured text
        "json" => "application/json",
        "xml" => "application/xml",
        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/vnd.microsoft.icon",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "jxl" => "image/jxl",
        "psd" => "image/vnd.adobe.photoshop",
        // Audio / video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "opus" => "audio/opus",
        "oga" => "audio/ogg",
        "aif" | "aiff" => "audio/aiff",
        "mid" | "midi" => "audio/midi",
        "weba" => "audio/webm",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "m4v" => "video/x-m4v",
        "mkv" => "video/x-matroska",
        "mpeg" | "mpg" => "video/mpeg",
        "ogv" => "video/ogg",
        "3gp" => "video/3gpp",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        // Documents and containers
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rtf" => "application/rtf",
        "epub" => "application/epub+zip",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        "pages" => "application/vnd.apple.pages",
        "key" => "application/vnd.apple.keynote",
        "numbers" => "application/vnd.apple.numbers",
        "sqlite" | "db" => "application/vnd.sqlite3",
        "zip" => "application/zip",
        "rar" => "application/vnd.rar",
        "bz2" => "application/x-bzip2",
        "xz" => "application/x-xz",
        "jar" => "application/java-archive",
        "exe" => "application/vnd.microsoft.portable-executable",
        "dmg" => "application/x-apple-diskimage",
        "iso" => "application/x-iso9660-image",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "bin" => "application/octet-stream",
        _ => return None,
    };
    Some(mime)
}

/// Returns `true` for media types that hold text.
pub fn is_textual_mime(mime: &str) -> bool {
    mime.starts_with("text/") || STRUCTURED_TEXT.contains(&mime)
}

/// Decides whether an archive entry should be stored as an attachment.
///
/// A known extension decides on its own. Otherwise the first `sniff_len`
/// bytes are searched for a NUL byte.
pub fn is_binary_entry(path: &str, data: &[u8], sniff_len: usize) -> bool {
    if let Some(mime) = guess_mime(path) {
        return !is_textual_mime(mime);
    }
    let head = &data[..data.len().min(sniff_len)];
    head.contains(&0)
}
