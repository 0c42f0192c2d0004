//! Unauthenticated front-end listings of published content.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::{Category, Gallery, Service};
use crate::error::AppResult;
use crate::routes::{categories, galleries, photos, services};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/photos/all", get(list_photos))
        .route("/photos/count", get(count_photos))
        .route("/photos/{photo_id}", get(get_photo))
        .route("/category/all", get(list_categories))
        .route("/gallery/all", get(list_galleries))
        .route("/services/all", get(list_services))
}

async fn list_photos(State(state): State<AppState>) -> AppResult<Json<Vec<photos::PhotoResponse>>> {
    let conn = state.db.get()?;
    Ok(Json(photos::list_photos(&conn)?))
}

async fn count_photos(State(state): State<AppState>) -> AppResult<Json<i64>> {
    let conn = state.db.get()?;
    Ok(Json(photos::count_photos(&conn)?))
}

async fn get_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
) -> AppResult<Json<photos::PhotoResponse>> {
    let conn = state.db.get()?;
    Ok(Json(photos::fetch_photo(&conn, photo_id)?))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let conn = state.db.get()?;
    Ok(Json(categories::list_categories(&conn)?))
}

async fn list_galleries(State(state): State<AppState>) -> AppResult<Json<Vec<Gallery>>> {
    let conn = state.db.get()?;
    Ok(Json(galleries::list_galleries(&conn)?))
}

async fn list_services(State(state): State<AppState>) -> AppResult<Json<Vec<Service>>> {
    let conn = state.db.get()?;
    Ok(Json(services::list_services(&conn)?))
}
