//! Cached response document (static mode)
//!
//! The document is read at most once per process. A missing or broken file is
//! cached as an error payload and served until restart.

use hyper::body::Bytes;
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::logger;

/// Load-once JSON document
pub struct CachedDocument {
    path: PathBuf,
    body: OnceLock<Bytes>,
}

impl CachedDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            body: OnceLock::new(),
        }
    }

    /// Serialized document, loading it on first use
    pub fn get(&self) -> Bytes {
        self.body
            .get_or_init(|| {
                let value = load_document(&self.path);
                Bytes::from(serde_json::to_vec(&value).unwrap_or_default())
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.body.get().is_some()
    }
}

/// Read and parse the document, substituting an error payload on failure
fn load_document(path: &Path) -> Value {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logger::log_error(&format!("[Document] JSON file not found: {}", path.display()));
            return json!({ "error": "JSON文件不存在" });
        }
        Err(e) => {
            logger::log_error(&format!("[Document] Failed to read {}: {e}", path.display()));
            return json!({ "error": "无法解析JSON文件" });
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => {
            logger::log_info(&format!("[Document] JSON file loaded: {}", path.display()));
            value
        }
        Err(e) => {
            logger::log_error(&format!("[Document] Failed to parse {}: {e}", path.display()));
            json!({ "error": "无法解析JSON文件" })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &Bytes) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = CachedDocument::new(dir.path().join("absent.json"));
        assert!(!doc.is_loaded());
        assert_eq!(parse(&doc.get()), json!({ "error": "JSON文件不存在" }));
        assert!(doc.is_loaded());
    }

    #[test]
    fn test_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"a\": ").unwrap();
        let doc = CachedDocument::new(&path);
        assert_eq!(parse(&doc.get()), json!({ "error": "无法解析JSON文件" }));
    }

    #[test]
    fn test_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reply.json");
        std::fs::write(&path, r#"{"code":0,"items":[1,2]}"#).unwrap();

        let doc = CachedDocument::new(&path);
        assert_eq!(parse(&doc.get()), json!({"code": 0, "items": [1, 2]}));

        std::fs::write(&path, r#"{"code":1}"#).unwrap();
        assert_eq!(parse(&doc.get()), json!({"code": 0, "items": [1, 2]}));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(parse(&doc.get()), json!({"code": 0, "items": [1, 2]}));
    }

    #[test]
    fn test_concurrent_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reply.json");
        std::fs::write(&path, r#"{"ok":true}"#).unwrap();
        let doc = std::sync::Arc::new(CachedDocument::new(&path));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let doc = std::sync::Arc::clone(&doc);
                std::thread::spawn(move || doc.get())
            })
            .collect();
        for handle in handles {
            assert_eq!(parse(&handle.join().unwrap()), json!({"ok": true}));
        }
    }
}
