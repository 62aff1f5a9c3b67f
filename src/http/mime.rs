//! MIME type detection based on file extensions.

use std::path::Path;

/// Content type for files whose extension is not in the table.
pub const FALLBACK: &str = "application/octet-stream";

/// Guesses a content type from the extension of `path` (case-insensitive).
pub fn guess(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let mime = match ext.as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "xml" => "application/xml",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/vnd.microsoft.icon",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",
        _ => return None,
    };

    Some(mime)
}

/// Like [`guess`], falling back to `application/octet-stream`.
pub fn guess_or_default(path: &Path) -> &'static str {
    guess(path).unwrap_or(FALLBACK)
}
