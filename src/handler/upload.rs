//! Multipart upload handler
//!
//! `POST /upload` takes exactly one file from any form field, filters it by
//! declared type at intake, stores it under a sanitized name and then re-reads
//! it from disk to confirm it parses as JSON.

use chrono::Utc;
use futures_util::stream;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;

use super::files::store_error_response;
use crate::config::AppState;
use crate::error::{name_rejection_envelope, StoreError};
use crate::http::{json_response, Cors};
use crate::logger;
use crate::store::{sanitize_file_name, validate_json_name, FileStore, JSON_EXTENSION};

const CORS: Cors = Cors::FileApi;
const JSON_MIME: &str = "application/json";

/// `fileInfo` of a successful upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInfo {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub path: String,
    pub upload_time: String,
}

/// A file taken from the form, not yet written
struct PendingUpload {
    original_name: String,
    content: Bytes,
}

/// Reasons to refuse a multipart body before anything is written
enum UploadRejection {
    NotJson(String),
    TooManyFiles,
    Malformed(multer::Error),
}

impl UploadRejection {
    fn into_response(self) -> Response<Full<Bytes>> {
        let body = match self {
            Self::NotJson(original) => {
                logger::log_warning(&format!("[Upload] Rejected non-JSON file: {original}"));
                json!({
                    "success": false,
                    "error": "只允许上传JSON文件",
                    "message": format!("{original} 不是JSON文件"),
                })
            }
            Self::TooManyFiles => json!({
                "success": false,
                "error": "一次只能上传一个文件",
            }),
            Self::Malformed(e) => {
                logger::log_warning(&format!("[Upload] Malformed multipart body: {e}"));
                json!({
                    "success": false,
                    "error": "上传内容格式错误",
                    "message": e.to_string(),
                })
            }
        };
        json_response(StatusCode::BAD_REQUEST, &body, CORS)
    }
}

/// `POST /upload`
pub async fn handle_upload<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    let boundary = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok());
    let Some(boundary) = boundary else {
        return no_file_response();
    };

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_warning(&format!(
                "[Upload] Request body exceeded {max_body_size} bytes"
            ));
            return too_large_response(max_body_size);
        }
        Err(e) => {
            logger::log_warning(&format!("[Upload] Failed to read request body: {e}"));
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({
                    "success": false,
                    "error": "读取上传内容失败",
                    "message": e.to_string(),
                }),
                CORS,
            );
        }
    };

    match take_single_file(body, boundary).await {
        Ok(Some(upload)) => store_upload(&state.store, upload).await,
        Ok(None) => no_file_response(),
        Err(rejection) => rejection.into_response(),
    }
}

/// Pull the one file out of the form, rejecting non-JSON and extra files
async fn take_single_file(
    body: Bytes,
    boundary: String,
) -> Result<Option<PendingUpload>, UploadRejection> {
    let stream = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(UploadRejection::Malformed)?
    {
        // Plain form fields and empty file inputs carry no file
        let Some(original_name) = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(ToString::to_string)
        else {
            continue;
        };
        if upload.is_some() {
            return Err(UploadRejection::TooManyFiles);
        }

        let declared_json = field
            .content_type()
            .is_some_and(|mime| mime.essence_str() == JSON_MIME);
        if !declared_json && !original_name.ends_with(JSON_EXTENSION) {
            return Err(UploadRejection::NotJson(original_name));
        }

        let content = field.bytes().await.map_err(UploadRejection::Malformed)?;
        upload = Some(PendingUpload {
            original_name,
            content,
        });
    }

    Ok(upload)
}

/// Write the file, then confirm the stored copy parses
async fn store_upload(store: &FileStore, upload: PendingUpload) -> Response<Full<Bytes>> {
    let sanitized = sanitize_file_name(&upload.original_name);
    let name = match validate_json_name(&sanitized) {
        Ok(name) => name,
        Err(rejection) => {
            return json_response(
                StatusCode::BAD_REQUEST,
                &name_rejection_envelope(rejection),
                CORS,
            )
        }
    };

    let size = match store.write(&name, &upload.content).await {
        Ok(size) => size,
        Err(e) => return store_error_response(&name, &e, "保存文件失败"),
    };

    if let Err(e) = store.read_json(&name).await {
        if let Err(remove_err) = store.remove(&name).await {
            if !matches!(remove_err, StoreError::NotFound(_)) {
                logger::log_error(&format!(
                    "[Upload] Failed to remove unverified file {name}: {remove_err}"
                ));
            }
        }
        return store_error_response(&name, &e, "保存文件失败");
    }

    logger::log_info(&format!(
        "[Upload] Stored {name} ({size} bytes, original name: {})",
        upload.original_name
    ));

    let info = UploadInfo {
        path: format!("/files/{name}"),
        filename: name.into_string(),
        original_name: upload.original_name,
        size,
        upload_time: crate::store::format_timestamp(Utc::now()),
    };
    json_response(
        StatusCode::CREATED,
        &json!({
            "success": true,
            "message": "文件上传成功",
            "fileInfo": info,
        }),
        CORS,
    )
}

/// Refuse a request whose declared Content-Length is already over the limit
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "[Upload] Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(too_large_response(max_body_size))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn too_large_response(max_body_size: u64) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::BAD_REQUEST,
        &json!({
            "success": false,
            "error": "文件大小超出限制",
            "message": format!("最大允许 {} MB", max_body_size / 1024 / 1024),
        }),
        CORS,
    )
}

fn no_file_response() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::BAD_REQUEST,
        &json!({
            "success": false,
            "error": "请选择要上传的文件",
        }),
        CORS,
    )
}
