//! HTTP response building module
//!
//! Turns status, content type and body into hyper responses. Every response carries
//! `Content-Type`, `Content-Length` and `Server`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

/// Build a complete response; with `is_head` the body is dropped but the length kept
pub fn build_response(
    status: u16,
    content_type: &str,
    body: Bytes,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Server", server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(server_name: &str) -> Response<Full<Bytes>> {
    const BODY: &str = "405 Method Not Allowed";

    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Content-Length", BODY.len())
        .header("Server", server_name)
        .header("Allow", "GET, HEAD")
        .body(Full::new(Bytes::from(BODY)))
        .unwrap_or_else(|e| {
            log_build_error(405, &e);
            Response::new(Full::new(Bytes::from(BODY)))
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_present() {
        let resp = build_response(200, "text/plain", Bytes::from("hello"), "casefile/test", false);
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "text/plain");
        assert_eq!(resp.headers()["Content-Length"], "5");
        assert_eq!(resp.headers()["Server"], "casefile/test");
    }

    #[test]
    fn test_head_keeps_length() {
        use hyper::body::Body;

        let resp = build_response(200, "text/plain", Bytes::from("hello"), "casefile/test", true);
        assert_eq!(resp.headers()["Content-Length"], "5");
        assert_eq!(resp.body().size_hint().exact(), Some(0));
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response("casefile/test");
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers()["Allow"], "GET, HEAD");
    }
}
