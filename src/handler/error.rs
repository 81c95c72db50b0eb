//! Request failure types
//!
//! Every condition a case can hit while serving a path. The `Display` text is the
//! human-readable reason shown on the error page.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("'{path}' not found")]
    NotFound { path: String },

    #[error("'{path}' cannot be read: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' cannot be listed: {source}")]
    List {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' cannot be run: {source}")]
    ScriptSpawn {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' failed while running: {source}")]
    ScriptIo {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("'{path}' exited unsuccessfully ({status})")]
    ScriptExit { path: String, status: ExitStatus },

    #[error("'{path}' did not finish within {}s", .timeout.as_secs_f32())]
    ScriptTimeout { path: String, timeout: Duration },

    #[error("'{path}' is outside the served directory")]
    OutsideRoot { path: String },

    #[error("Unknown object: '{path}'")]
    UnknownObject { path: String },

    #[error("Internal error while serving '{path}': {message}")]
    Internal { path: String, message: String },
}

impl ServeError {
    /// Short machine-friendly name used in logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Read { .. } => "read",
            Self::List { .. } => "list",
            Self::ScriptSpawn { .. } | Self::ScriptIo { .. } => "script",
            Self::ScriptExit { .. } => "script_exit",
            Self::ScriptTimeout { .. } => "script_timeout",
            Self::OutsideRoot { .. } => "outside_root",
            Self::UnknownObject { .. } => "unknown_object",
            Self::Internal { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = ServeError::NotFound {
            path: "/missing.txt".to_string(),
        };
        assert_eq!(err.to_string(), "'/missing.txt' not found");
        assert_eq!(err.kind(), "not_found");

        let err = ServeError::Read {
            path: "/srv/a.txt".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };
        assert_eq!(err.to_string(), "'/srv/a.txt' cannot be read: Permission denied");

        let err = ServeError::UnknownObject {
            path: "/dev/null".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown object: '/dev/null'");
    }

    #[test]
    fn test_timeout_message() {
        let err = ServeError::ScriptTimeout {
            path: "/slow.py".to_string(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "'/slow.py' did not finish within 1.5s");
    }
}
