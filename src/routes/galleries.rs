//! Admin gallery CRUD, plus the combined galleries-with-photos listing.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::models::{Gallery, Photo};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/gallery/all", get(list_all))
        .route("/admin/gallery/count", get(count))
        .route("/admin/gallery/all-photos-and-gallery", get(list_with_photos))
        .route("/admin/gallery/{gallery_id}", get(get_by_id))
        .route("/admin/gallery/add", post(add))
        .route("/admin/gallery/update/{gallery_id}", put(update))
        .route("/admin/gallery/delete/{gallery_id}", delete(delete_gallery))
}

#[derive(Deserialize)]
pub struct GalleryUpload {
    pub gallery_name: String,
}

#[derive(Debug, Serialize)]
pub struct GalleryWithPhotos {
    #[serde(flatten)]
    pub gallery: Gallery,
    pub photos: Vec<Photo>,
}

async fn list_all(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Vec<Gallery>>> {
    let conn = state.db.get()?;
    Ok(Json(list_galleries(&conn)?))
}

async fn count(State(state): State<AppState>, _admin: CurrentAdmin) -> AppResult<Json<i64>> {
    let conn = state.db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM gallery", [], |row| row.get(0))?;
    Ok(Json(count))
}

async fn list_with_photos(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Vec<GalleryWithPhotos>>> {
    let conn = state.db.get()?;
    let galleries = list_galleries(&conn)?;

    let mut stmt = conn.prepare(
        "SELECT p.id_photo, p.photo_path, p.title, p.description, p.location, p.date \
         FROM photos p \
         JOIN gallery_and_photos gp ON gp.id_photo = p.id_photo \
         WHERE gp.id_gallery = ?1 ORDER BY p.date ASC",
    )?;

    let mut result = Vec::with_capacity(galleries.len());
    for gallery in galleries {
        let photos = stmt
            .query_map(params![gallery.id_gallery], Photo::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        result.push(GalleryWithPhotos { gallery, photos });
    }

    Ok(Json(result))
}

async fn get_by_id(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(gallery_id): Path<i64>,
) -> AppResult<Json<Gallery>> {
    let conn = state.db.get()?;
    Ok(Json(fetch_gallery(&conn, gallery_id)?))
}

async fn add(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(req): Json<GalleryUpload>,
) -> AppResult<Json<Gallery>> {
    if req.gallery_name.trim().is_empty() {
        return Err(AppError::BadRequest("Gallery name is required".into()));
    }

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO gallery (gallery_name) VALUES (?1)",
        params![req.gallery_name.trim()],
    )?;

    Ok(Json(fetch_gallery(&conn, conn.last_insert_rowid())?))
}

async fn update(
    State(state): State<AppState>,
    Path(gallery_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<GalleryUpload>,
) -> AppResult<Json<Gallery>> {
    let conn = state.db.get()?;
    fetch_gallery(&conn, gallery_id)?;

    conn.execute(
        "UPDATE gallery SET gallery_name = ?1 WHERE id_gallery = ?2",
        params![req.gallery_name, gallery_id],
    )?;

    Ok(Json(fetch_gallery(&conn, gallery_id)?))
}

async fn delete_gallery(
    State(state): State<AppState>,
    Path(gallery_id): Path<i64>,
    _admin: CurrentAdmin,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    fetch_gallery(&conn, gallery_id)?;

    conn.execute(
        "DELETE FROM gallery WHERE id_gallery = ?1",
        params![gallery_id],
    )?;

    Ok(Json(json!({ "message": "Gallery deleted successfully" })))
}

pub(crate) fn list_galleries(conn: &Connection) -> AppResult<Vec<Gallery>> {
    let mut stmt =
        conn.prepare("SELECT id_gallery, gallery_name FROM gallery ORDER BY id_gallery")?;
    let galleries = stmt
        .query_map([], Gallery::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(galleries)
}

fn fetch_gallery(conn: &Connection, gallery_id: i64) -> AppResult<Gallery> {
    conn.query_row(
        "SELECT id_gallery, gallery_name FROM gallery WHERE id_gallery = ?1",
        params![gallery_id],
        Gallery::from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}
