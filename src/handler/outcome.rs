//! Result of serving one request

use super::error::ServeError;
use hyper::body::Bytes;

/// Content type used for listings, script output and error pages
pub const HTML_CONTENT_TYPE: &str = "text/html";

#[derive(Debug)]
pub enum Outcome {
    Success {
        status: u16,
        content_type: String,
        body: Bytes,
    },
    Failure(ServeError),
}

impl Outcome {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self::Success {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<Bytes>) -> Self {
        Self::ok(HTML_CONTENT_TYPE, body)
    }
}

#[cfg(test)]
impl Outcome {
    /// Failure reason, if this outcome is a failure
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(err) => Some(err.to_string()),
        }
    }
}

impl From<ServeError> for Outcome {
    fn from(err: ServeError) -> Self {
        Self::Failure(err)
    }
}
