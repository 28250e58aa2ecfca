//! HTTP response building module
//!
//! JSON responses with CORS headers, shared by both service modes.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Header naming the target file of the catch-all lookup
pub const FILENAME_HEADER: &str = "x-filename";

/// CORS header set of a service mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cors {
    /// File API: also allows the `X-FILENAME` header
    FileApi,
    /// Static responder
    Static,
}

impl Cors {
    pub const fn allow_headers(self) -> &'static str {
        match self {
            Self::FileApi => "Content-Type, Authorization, X-FILENAME",
            Self::Static => "Content-Type, Authorization",
        }
    }

    fn apply(self, builder: Builder) -> Builder {
        builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOW_METHODS)
            .header("Access-Control-Allow-Headers", self.allow_headers())
    }
}

/// Build JSON response from a serializable body
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
    cors: Cors,
) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => raw_json_response(status, Bytes::from(json), cors),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            raw_json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(r#"{"success":false,"error":"服务器内部错误"}"#.as_bytes()),
                cors,
            )
        }
    }
}

/// Build JSON response from an already serialized body
pub fn raw_json_response(status: StatusCode, body: Bytes, cors: Cors) -> Response<Full<Bytes>> {
    let content_length = body.len();
    cors.apply(Response::builder().status(status))
        .header("Content-Type", JSON_CONTENT_TYPE)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(cors: Cors) -> Response<Full<Bytes>> {
    cors.apply(Response::builder().status(StatusCode::OK))
        .header("Content-Type", JSON_CONTENT_TYPE)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
