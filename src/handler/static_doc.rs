//! Static responder
//!
//! Every request, whatever its method or path, gets the cached document.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};

use crate::config::AppState;
use crate::http::{build_options_response, raw_json_response, Cors};

pub fn handle_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    // Loaded before the preflight check, so any first request triggers the load
    let body = state.document.get();
    if req.method() == Method::OPTIONS {
        return build_options_response(Cors::Static);
    }
    raw_json_response(StatusCode::OK, body, Cors::Static)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ServiceMode};
    use http_body_util::BodyExt;

    fn static_state(document: &std::path::Path) -> AppState {
        let mut cfg = Config::load_with_port("does-not-exist/config", None).unwrap();
        cfg.server.mode = ServiceMode::Static;
        cfg.document.path = document.to_string_lossy().into_owned();
        AppState::new(&cfg)
    }

    fn request(method: Method, path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_absent_document_served_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let state = static_state(&dir.path().join("missing.json"));

        for (method, path) in [
            (Method::GET, "/"),
            (Method::POST, "/api/login"),
            (Method::DELETE, "/files/a.json"),
        ] {
            let resp = handle_request(&request(method, path), &state);
            assert_eq!(resp.status(), StatusCode::OK);
            let body = resp.into_body().collect().await.unwrap().to_bytes();
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(value, serde_json::json!({ "error": "JSON文件不存在" }));
        }
    }

    #[tokio::test]
    async fn test_document_body_and_cors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reply.json");
        std::fs::write(&path, r#"{"status":"ok","list":[1]}"#).unwrap();
        let state = static_state(&path);

        let resp = handle_request(&request(Method::PUT, "/anything?x=1"), &state);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            resp.headers()["content-type"],
            "application/json; charset=utf-8"
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({"status": "ok", "list": [1]}));
    }

    #[tokio::test]
    async fn test_options_short_circuit_after_load() {
        let dir = tempfile::tempdir().unwrap();
        let state = static_state(&dir.path().join("reply.json"));

        let resp = handle_request(&request(Method::OPTIONS, "/x"), &state);
        assert_eq!(resp.status(), StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
        assert!(state.document.is_loaded());
    }
}
