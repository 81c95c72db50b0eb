//! Request path resolution
//!
//! Maps a raw URL path onto the served directory.

use super::error::ServeError;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Per-request data shared by every case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Percent-decoded URL path as requested, for display
    pub url_path: String,
    /// Percent-decoded URL path bytes; may not be UTF-8
    pub url_bytes: Vec<u8>,
    /// Filesystem path the URL maps to
    pub resolved_path: PathBuf,
}

impl RequestContext {
    pub fn new(url_bytes: Vec<u8>, resolved_path: PathBuf) -> Self {
        Self {
            url_path: String::from_utf8_lossy(&url_bytes).into_owned(),
            url_bytes,
            resolved_path,
        }
    }
}

/// Decode `raw_url_path` and join it onto `root`.
///
/// With `contain` set, `.` and empty segments are dropped and `..` segments are
/// applied lexically; a `..` that would climb above `root` is rejected. A trailing
/// `/` is kept, so `/a.txt/` does not name the file `a.txt`. Without `contain` the
/// decoded path is joined as-is.
pub fn resolve(root: &Path, raw_url_path: &str, contain: bool) -> Result<RequestContext, ServeError> {
    let url_bytes: Vec<u8> = percent_decode_str(raw_url_path).collect();

    let resolved_path = if contain {
        root.join(contained_relative(&url_bytes)?)
    } else {
        let start = url_bytes.iter().position(|b| *b != b'/').unwrap_or(url_bytes.len());
        root.join(bytes_to_path(&url_bytes[start..]))
    };

    Ok(RequestContext::new(url_bytes, resolved_path))
}

fn contained_relative(url_bytes: &[u8]) -> Result<PathBuf, ServeError> {
    let mut relative = PathBuf::new();
    for segment in url_bytes.split(|b| *b == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                if !relative.pop() {
                    return Err(ServeError::OutsideRoot {
                        path: String::from_utf8_lossy(url_bytes).into_owned(),
                    });
                }
            }
            name => relative.push(bytes_to_path(name)),
        }
    }
    if url_bytes.ends_with(b"/") && relative.file_name().is_some() {
        relative.push("");
    }
    Ok(relative)
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
