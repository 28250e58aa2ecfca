//! File API handlers
//!
//! List, read and delete by path parameter, the `X-FILENAME` catch-all, the
//! root info route and the 404 fallback.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Response, StatusCode};
use serde_json::json;

use crate::error::{name_rejection_envelope, StoreError};
use crate::http::{json_response, Cors, FILENAME_HEADER};
use crate::logger;
use crate::store::{validate_json_name, FileStore, JsonFileName};

const CORS: Cors = Cors::FileApi;

/// `GET /` - endpoint directory
pub fn root_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &json!({
            "message": "JSON文件服务",
            "endpoints": {
                "GET /files": "获取所有JSON文件列表",
                "GET /files/:filename": "获取指定JSON文件内容",
                "POST /upload": "上传JSON文件 (multipart/form-data, 最大10MB)",
                "DELETE /files/:filename": "删除指定JSON文件",
                "ANY /* + X-FILENAME": "通过X-FILENAME请求头获取JSON文件内容",
            }
        }),
        CORS,
    )
}

/// `GET /files`
pub async fn list_files(store: &FileStore) -> Response<Full<Bytes>> {
    match store.list().await {
        Ok(files) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "count": files.len(),
                "files": files,
            }),
            CORS,
        ),
        Err(e) => {
            logger::log_error(&format!("Failed to list {}: {e}", store.root().display()));
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.envelope("读取文件列表失败"),
                CORS,
            )
        }
    }
}

/// `GET /files/:filename`
pub async fn read_file(store: &FileStore, raw_name: &str) -> Response<Full<Bytes>> {
    let name = match validate_json_name(raw_name) {
        Ok(name) => name,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &name_rejection_envelope(rejection),
                CORS,
            )
        }
    };

    match store.read_json(&name).await {
        Ok(data) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "filename": name.as_str(),
                "data": data,
            }),
            CORS,
        ),
        Err(e) => store_error_response(&name, &e, "读取文件失败"),
    }
}

/// `DELETE /files/:filename`
pub async fn delete_file(store: &FileStore, raw_name: &str) -> Response<Full<Bytes>> {
    let name = match validate_json_name(raw_name) {
        Ok(name) => name,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &name_rejection_envelope(rejection),
                CORS,
            )
        }
    };

    match store.remove(&name).await {
        Ok(()) => {
            logger::log_info(&format!("[Files] Deleted {name}"));
            json_response(
                StatusCode::OK,
                &json!({
                    "success": true,
                    "message": "文件删除成功",
                    "filename": name.as_str(),
                }),
                CORS,
            )
        }
        Err(e) => store_error_response(&name, &e, "删除文件失败"),
    }
}

/// Catch-all: serve the file named by `X-FILENAME` as raw JSON
///
/// Unlike `GET /files/:filename` the content is not wrapped in an envelope.
pub async fn lookup_by_header(store: &FileStore, headers: &HeaderMap) -> Response<Full<Bytes>> {
    let Some(value) = headers.get(FILENAME_HEADER) else {
        return json_response(
            StatusCode::BAD_REQUEST,
            &json!({
                "success": false,
                "error": "缺少X-FILENAME请求头",
                "message": "请在请求头中通过X-FILENAME指定要获取的JSON文件",
            }),
            CORS,
        );
    };
    let Ok(raw_name) = value.to_str() else {
        return json_response(
            StatusCode::BAD_REQUEST,
            &json!({
                "success": false,
                "error": "只支持JSON文件",
                "message": "X-FILENAME只能包含ASCII字符",
            }),
            CORS,
        );
    };

    let name = match validate_json_name(raw_name) {
        Ok(name) => name,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &name_rejection_envelope(rejection),
                CORS,
            )
        }
    };

    match store.read_json(&name).await {
        Ok(data) => json_response(StatusCode::OK, &data, CORS),
        Err(StoreError::NotFound(_)) => {
            let available = store.available_names().await;
            json_response(
                StatusCode::NOT_FOUND,
                &json!({
                    "success": false,
                    "error": "文件不存在",
                    "filename": name.as_str(),
                    "availableFiles": available,
                }),
                CORS,
            )
        }
        Err(e) => store_error_response(&name, &e, "读取文件失败"),
    }
}

/// Fallback for requests no route claimed
pub fn not_found(path: &str) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({
            "success": false,
            "error": "接口不存在",
            "path": path,
        }),
        CORS,
    )
}

/// Convert a store error into its HTTP response, logging server-side failures
pub fn store_error_response(
    name: &JsonFileName,
    error: &StoreError,
    io_error: &str,
) -> Response<Full<Bytes>> {
    match error {
        StoreError::Io { .. } => logger::log_error(&format!("{name}: {error}")),
        StoreError::InvalidJson(_) => logger::log_warning(&format!("{name}: {error}")),
        StoreError::NotFound(_) => logger::log_debug(&format!("{name}: {error}")),
    }
    json_response(error.status(), &error.envelope(io_error), CORS)
}
