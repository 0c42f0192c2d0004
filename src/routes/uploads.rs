//! Static serving of stored blobs under /uploads.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage;

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads/{*path}", get(serve))
}

async fn serve(State(state): State<AppState>, Path(path): Path<String>) -> AppResult<Response> {
    let file_path = storage::resolve_upload(state.config.uploads_path(), &path)?;

    let bytes = tokio::fs::read(&file_path)
        .await
        .map_err(|_| AppError::NotFound)?;

    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        bytes,
    )
        .into_response())
}
