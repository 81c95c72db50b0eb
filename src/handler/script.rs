//! Script execution
//!
//! Runs a script as a child process and answers with whatever it writes to stdout.
//! The child gets no arguments and an empty stdin. It is killed if the wait is
//! abandoned (timeout, or the request task going away) and is always reaped.

use super::error::ServeError;
use super::outcome::Outcome;
use crate::logger;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Longest stderr excerpt copied into the error log
const STDERR_LOG_LIMIT: usize = 2048;

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: Option<String>,
    /// Upper bound on a single run; `None` waits indefinitely
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(interpreter: Option<&str>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.map(ToString::to_string),
            timeout: (!timeout.is_zero()).then_some(timeout),
        }
    }

    fn command(&self, script: &Path) -> Command {
        let mut command = match &self.interpreter {
            Some(program) => {
                let mut command = Command::new(program);
                command.arg(script);
                command
            }
            None => Command::new(script),
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Run `script`, reporting failures against `url_path`
    pub async fn run(&self, script: &Path, url_path: &str) -> Outcome {
        let child = match self.command(script).spawn() {
            Ok(child) => child,
            Err(source) => {
                return ServeError::ScriptSpawn {
                    path: url_path.to_string(),
                    source,
                }
                .into();
            }
        };

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    return ServeError::ScriptTimeout {
                        path: url_path.to_string(),
                        timeout: limit,
                    }
                    .into();
                }
            },
            None => child.wait_with_output().await,
        };

        let output = match output {
            Ok(output) => output,
            Err(source) => {
                return ServeError::ScriptIo {
                    path: url_path.to_string(),
                    source,
                }
                .into();
            }
        };

        if !output.status.success() {
            log_stderr(url_path, &output.stderr);
            return ServeError::ScriptExit {
                path: url_path.to_string(),
                status: output.status,
            }
            .into();
        }

        logger::log_script_finished(url_path, output.stdout.len());
        Outcome::html(output.stdout)
    }
}

fn log_stderr(url_path: &str, stderr: &[u8]) {
    if stderr.is_empty() {
        return;
    }
    let excerpt = String::from_utf8_lossy(&stderr[..stderr.len().min(STDERR_LOG_LIMIT)]);
    logger::log_warning(&format!("[Script] {url_path} stderr: {}", excerpt.trim_end()));
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_script(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn sh_runner(timeout: Duration) -> ScriptRunner {
        ScriptRunner::new(Some("sh"), timeout)
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "hello.sh", "printf '<p>hi</p>'\n");

        match sh_runner(Duration::from_secs(10)).run(&script, "/hello.sh").await {
            Outcome::Success {
                status,
                content_type,
                body,
            } => {
                assert_eq!(status, 200);
                assert_eq!(content_type, "text/html");
                assert_eq!(&body[..], b"<p>hi</p>");
            }
            Outcome::Failure(err) => panic!("unexpected failure: {err}"),
        }
    }

    #[tokio::test]
    async fn test_stdin_is_empty() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "stdin.sh", "cat; printf done\n");

        match sh_runner(Duration::from_secs(10)).run(&script, "/stdin.sh").await {
            Outcome::Success { body, .. } => assert_eq!(&body[..], b"done"),
            Outcome::Failure(err) => panic!("unexpected failure: {err}"),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_discards_output() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fail.sh", "printf partial; echo oops >&2; exit 3\n");

        let outcome = sh_runner(Duration::from_secs(10)).run(&script, "/fail.sh").await;
        assert!(matches!(outcome, Outcome::Failure(ServeError::ScriptExit { .. })));
        let reason = outcome.reason().unwrap();
        assert!(reason.contains("/fail.sh"));
        assert!(!reason.contains("partial"));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "a.sh", "true\n");
        let runner = ScriptRunner::new(Some("casefile-no-such-interpreter"), Duration::from_secs(10));

        let outcome = runner.run(&script, "/a.sh").await;
        assert!(matches!(outcome, Outcome::Failure(ServeError::ScriptSpawn { .. })));
    }

    #[tokio::test]
    async fn test_timeout_kills_script() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "slow.sh", "exec sleep 10\n");

        let started = std::time::Instant::now();
        let outcome = sh_runner(Duration::from_millis(200)).run(&script, "/slow.sh").await;
        assert!(matches!(outcome, Outcome::Failure(ServeError::ScriptTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_runs_file_directly_without_interpreter() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "direct.sh", "#!/bin/sh\nprintf direct\n");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let runner = ScriptRunner::new(None, Duration::from_secs(10));
        match runner.run(&script, "/direct.sh").await {
            Outcome::Success { body, .. } => assert_eq!(&body[..], b"direct"),
            Outcome::Failure(err) => panic!("unexpected failure: {err}"),
        }
    }
}
