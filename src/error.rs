use hyper::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::store::NameRejection;

/// Failures of a single store operation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub const fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error envelope sent to the client
    ///
    /// `io_error` names the operation for infrastructure failures
    /// ("读取文件失败", "删除文件失败", ...).
    pub fn envelope(&self, io_error: &str) -> Value {
        match self {
            Self::NotFound(_) => json!({ "success": false, "error": "文件不存在" }),
            Self::InvalidJson(e) => json!({
                "success": false,
                "error": "JSON格式无效",
                "message": e.to_string(),
            }),
            Self::Io { source, .. } => json!({
                "success": false,
                "error": io_error,
                "message": source.to_string(),
            }),
        }
    }
}

/// Envelope for a rejected file name
pub fn name_rejection_envelope(rejection: NameRejection) -> Value {
    json!({
        "success": false,
        "error": "只支持JSON文件",
        "message": rejection.reason(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StoreError::NotFound("a.json".into()).status(),
            StatusCode::NOT_FOUND
        );
        let parse = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(StoreError::from(parse).status(), StatusCode::BAD_REQUEST);
        let io = StoreError::io("read", std::io::Error::other("disk"));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_envelopes() {
        let body = StoreError::NotFound("a.json".into()).envelope("读取文件失败");
        assert_eq!(body, json!({ "success": false, "error": "文件不存在" }));

        let io = StoreError::io("delete", std::io::Error::other("busy"));
        let body = io.envelope("删除文件失败");
        assert_eq!(body["error"], "删除文件失败");
        assert_eq!(body["message"], "busy");
    }
}
