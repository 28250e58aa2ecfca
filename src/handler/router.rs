//! Request routing dispatch module
//!
//! Entry point for file API requests: CORS preflight, route resolution and dispatch.

use crate::config::AppState;
use crate::handler::{files, upload};
use crate::http::{self, Cors};
use crate::routing::{Resolved, RouteKind};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Main entry point for file API requests
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. CORS preflight, any path
    if req.method() == Method::OPTIONS {
        return Ok(http::build_options_response(Cors::FileApi));
    }

    // 2. Resolve against the ordered route table
    let path = req.uri().path().to_string();
    let response = match state.routes.resolve(req.method(), &path) {
        Resolved::Route { kind, param } => {
            let param = param.unwrap_or_default();
            match kind {
                RouteKind::Root => files::root_info(),
                RouteKind::ListFiles => files::list_files(&state.store).await,
                RouteKind::ReadFile => files::read_file(&state.store, param).await,
                RouteKind::Upload => upload::handle_upload(req, &state).await,
                RouteKind::DeleteFile => files::delete_file(&state.store, param).await,
            }
        }
        // 3. Header-driven catch-all
        Resolved::HeaderLookup => files::lookup_by_header(&state.store, req.headers()).await,
        // 4. Nothing left
        Resolved::NotFound => files::not_found(&path),
    };

    Ok(response)
}
