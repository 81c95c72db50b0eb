//! File content responder

use super::error::ServeError;
use super::outcome::Outcome;
use crate::http::mime;
use std::path::Path;
use tokio::fs;

/// Read the whole file and answer with its bytes and probed content type
pub async fn serve(path: &Path) -> Outcome {
    match fs::read(path).await {
        Ok(content) => {
            let content_type = mime::probe(path, &content);
            Outcome::ok(content_type, content)
        }
        Err(source) => ServeError::Read {
            path: path.display().to_string(),
            source,
        }
        .into(),
    }
}
