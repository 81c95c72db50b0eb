//! MIME type detection module
//!
//! Guesses the Content-Type from the file extension, falling back to the leading
//! bytes of the content when the extension says nothing.

use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

/// Leading-byte signatures checked when the extension is unknown
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
];

/// Best-guess Content-Type for a file
///
/// # Examples
/// ```ignore
/// assert_eq!(probe(Path::new("a.css"), b""), "text/css; charset=utf-8");
/// assert_eq!(probe(Path::new("README"), b"hello"), "text/plain; charset=utf-8");
/// ```
pub fn probe(path: &Path, content: &[u8]) -> String {
    let guessed = mime_guess::from_path(path)
        .first_raw()
        .map_or_else(|| sniff(content), ToString::to_string);

    with_charset(guessed)
}

/// Content-based guess for files without a recognised extension
fn sniff(content: &[u8]) -> String {
    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| content.starts_with(magic)) {
        return (*mime).to_string();
    }

    let head = &content[..content.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let lower = text.trim_start().to_ascii_lowercase();
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        return "text/html".to_string();
    }

    if looks_like_text(head) {
        "text/plain".to_string()
    } else {
        OCTET_STREAM.to_string()
    }
}

/// UTF-8 without NUL bytes; a multibyte sequence cut at the sniff window is tolerated
fn looks_like_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

fn with_charset(mime: String) -> String {
    if mime.starts_with("text/") && !mime.contains("charset") {
        format!("{mime}; charset=utf-8")
    } else {
        mime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(probe(Path::new("index.html"), b""), "text/html; charset=utf-8");
        assert_eq!(probe(Path::new("a.txt"), b"hello"), "text/plain; charset=utf-8");
        assert_eq!(probe(Path::new("style.css"), b""), "text/css; charset=utf-8");
        assert_eq!(probe(Path::new("logo.png"), b""), "image/png");
        assert_eq!(probe(Path::new("data.json"), b"{}"), "application/json");
    }

    #[test]
    fn test_sniffs_extensionless_files() {
        assert_eq!(probe(Path::new("README"), b"hello"), "text/plain; charset=utf-8");
        assert_eq!(
            probe(Path::new("page"), b"  <!DOCTYPE html><html></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(probe(Path::new("blob"), b"\x89PNG\r\n\x1a\n...."), "image/png");
        assert_eq!(probe(Path::new("blob"), b"\x00\x01\x02"), OCTET_STREAM);
    }

    #[test]
    fn test_truncated_utf8_is_text() {
        let mut content = vec![b'a'; 511];
        content.extend_from_slice("é".as_bytes());
        assert_eq!(probe(Path::new("notes"), &content), "text/plain; charset=utf-8");
    }
}
