//! Request entry point
//!
//! Validates the method, resolves the path, runs the case chain and turns the
//! outcome into a response. Every request gets a response: failures of any kind
//! become the 500 error page.

use super::cases::{CaseChain, Rule};
use super::error::ServeError;
use super::error_page;
use super::outcome::{Outcome, HTML_CONTENT_TYPE};
use super::resolve::{self, RequestContext};
use crate::config::{AppState, SiteConfig};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let server_name = state.config.http.server_name.as_str();

    let (rule, response) = match method {
        Method::GET | Method::HEAD => {
            let is_head = method == Method::HEAD;
            serve_path(&state.chain, &state.config.site, server_name, &path, is_head).await
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            (None, http::build_405_response(server_name))
        }
    };

    if state.access_log_enabled() {
        let mut entry = AccessLogEntry::new(peer_addr.to_string(), method.to_string(), path);
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = content_length(&response);
        entry.case = rule.map(Rule::name);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Serve a GET/HEAD for `raw_path`, returning the rule that decided it.
/// Paths rejected before reaching the chain report no rule.
pub async fn serve_path(
    chain: &Arc<CaseChain>,
    site: &SiteConfig,
    server_name: &str,
    raw_path: &str,
    is_head: bool,
) -> (Option<Rule>, Response<Full<Bytes>>) {
    let ctx = match resolve::resolve(&site.root, raw_path, site.contain_paths) {
        Ok(ctx) => ctx,
        Err(err) => {
            logger::log_warning(&format!("Rejected request path {raw_path}: {err}"));
            let response = outcome_response(raw_path, Outcome::Failure(err), server_name, is_head);
            return (None, response);
        }
    };

    let url_path = ctx.url_path.clone();
    let (rule, outcome) = dispatch_isolated(chain, ctx).await;
    (Some(rule), outcome_response(&url_path, outcome, server_name, is_head))
}

/// Aborts the task when dropped, so work for an abandoned request stops with it
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Run the chain on its own task so a panicking rule still yields a response.
///
/// If the connection goes away first, the task is aborted and a running
/// script child is killed along with it.
async fn dispatch_isolated(chain: &Arc<CaseChain>, ctx: RequestContext) -> (Rule, Outcome) {
    let chain = Arc::clone(chain);
    let url_path = ctx.url_path.clone();

    let mut task = AbortOnDrop(tokio::spawn(async move { chain.dispatch(&ctx).await }));
    match (&mut task.0).await {
        Ok(result) => result,
        Err(e) => (
            Rule::Fallback,
            ServeError::Internal {
                path: url_path,
                message: e.to_string(),
            }
            .into(),
        ),
    }
}

fn outcome_response(
    url_path: &str,
    outcome: Outcome,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match outcome {
        Outcome::Success {
            status,
            content_type,
            body,
        } => http::build_response(status, &content_type, body, server_name, is_head),
        Outcome::Failure(err) => {
            logger::log_outcome_failure(url_path, &err);
            let (status, page) = error_page::render(url_path, &err.to_string());
            http::build_response(status, HTML_CONTENT_TYPE, Bytes::from(page), server_name, is_head)
        }
    }
}

fn content_length(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        let mut cfg = Config::load_from("casefile-test-missing-config").unwrap();
        cfg.site.root = root.to_path_buf();
        cfg.script.extension = ".sh".to_string();
        cfg.script.interpreter = "sh".to_string();
        cfg.script.timeout_secs = 10;
        cfg.logging.access_log = false;
        cfg.http.server_name = "casefile/test".to_string();
        cfg
    }

    async fn get(root: &Path, path: &str) -> (u16, String, Vec<u8>) {
        let state = Arc::new(AppState::new(&test_config(root)));
        let req = Request::get(path).body(()).unwrap();
        let resp = handle_request(req, state, "127.0.0.1:4000".parse().unwrap())
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let content_type = resp.headers()["Content-Type"].to_str().unwrap().to_string();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn test_plain_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let state = Arc::new(AppState::new(&test_config(dir.path())));
        let req = Request::get("/a.txt").body(()).unwrap();
        let resp = handle_request(req, state, "127.0.0.1:4000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "5");
        assert_eq!(resp.headers()["Server"], "casefile/test");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_missing_file_error_page() {
        let dir = TempDir::new().unwrap();
        let (status, content_type, body) = get(dir.path(), "/missing.txt").await;
        assert_eq!(status, 500);
        assert_eq!(content_type, "text/html");
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("missing.txt"));
        assert!(page.contains("not found"));
    }

    #[tokio::test]
    async fn test_directory_index_matches_direct_request() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("site")).unwrap();
        std::fs::write(dir.path().join("site/index.html"), "<h1>home</h1>").unwrap();

        let via_dir = get(dir.path(), "/site/").await;
        let direct = get(dir.path(), "/site/index.html").await;
        assert_eq!(via_dir, direct);
        assert_eq!(via_dir.0, 200);
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/x.txt"), "x").unwrap();
        std::fs::write(dir.path().join("docs/.hidden"), "h").unwrap();

        let (status, content_type, body) = get(dir.path(), "/docs/").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "text/html");
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains(r#"href="/docs/x.txt""#));
        assert!(!page.contains(".hidden"));
    }

    #[tokio::test]
    async fn test_listing_is_repeatable() {
        let dir = TempDir::new().unwrap();
        for name in ["b", "a", "c"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }

        let first = get(dir.path(), "/").await;
        let second = get(dir.path(), "/").await;
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_output_and_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.sh"), "printf '<b>dynamic</b>'").unwrap();
        std::fs::write(dir.path().join("bad.sh"), "printf half; exit 1").unwrap();

        let (status, content_type, body) = get(dir.path(), "/ok.sh").await;
        assert_eq!(status, 200);
        assert_eq!(content_type, "text/html");
        assert_eq!(body, b"<b>dynamic</b>");

        let (status, _, body) = get(dir.path(), "/bad.sh").await;
        assert_eq!(status, 500);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("Error Accessing /bad.sh"));
        assert!(!page.contains("half"));
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let (status, _, body) = get(dir.path(), "/../../etc/passwd").await;
        assert_eq!(status, 500);
        let page = String::from_utf8(body).unwrap();
        assert!(page.contains("outside the served directory"));
    }

    #[tokio::test]
    async fn test_percent_encoded_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("my file.txt"), "spaced").unwrap();

        let (status, _, body) = get(dir.path(), "/my%20file.txt").await;
        assert_eq!(status, 200);
        assert_eq!(body, b"spaced");
    }

    #[tokio::test]
    async fn test_head_and_other_methods() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let state = Arc::new(AppState::new(&test_config(dir.path())));
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        let req = Request::head("/a.txt").body(()).unwrap();
        let resp = handle_request(req, Arc::clone(&state), peer).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Length"], "5");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());

        let req = Request::post("/a.txt").body(()).unwrap();
        let resp = handle_request(req, state, peer).await.unwrap();
        assert_eq!(resp.status(), 405);
    }

    #[tokio::test]
    async fn test_trailing_slash_after_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();

        let (status, _, body) = get(dir.path(), "/a.txt/").await;
        assert_eq!(status, 500);
        assert!(String::from_utf8(body).unwrap().contains("not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_listing_link_is_servable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), "bytes").unwrap();

        let (_, _, listing) = get(dir.path(), "/").await;
        assert!(String::from_utf8(listing).unwrap().contains(r#"href="/caf%E9.txt""#));

        let (status, _, body) = get(dir.path(), "/caf%E9.txt").await;
        assert_eq!(status, 200);
        assert_eq!(body, b"bytes");
    }
}
