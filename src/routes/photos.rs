//! Admin photo endpoints: upload, metadata updates, taxonomy sync, delete.
//!
//! Upload writes the blob first, then runs the photo row insert plus both
//! association syncs as one transaction; if the transaction fails the blob
//! is removed again so store and filesystem stay consistent.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::db::associations::{self, PhotoLink};
use crate::db::models::{Category, Gallery, Photo, PHOTO_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentAdmin;
use crate::state::AppState;
use crate::storage;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/photos/upload", post(upload))
        .route("/admin/photos/all", get(list_all))
        .route("/admin/photos/count", get(count))
        .route("/admin/photos/{photo_id}", get(get_by_id))
        .route("/admin/photos/update-details/{photo_id}", put(update_details))
        .route("/admin/photos/update-category/{photo_id}", put(update_categories))
        .route("/admin/photos/update-gallery/{photo_id}", put(update_galleries))
        .route("/admin/photos/delete/{photo_id}", delete(delete_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Photo plus its eager-loaded taxonomy, the shape both admin and public
/// listings return.
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    #[serde(flatten)]
    pub photo: Photo,
    pub categories: Vec<Category>,
    pub galleries: Vec<Gallery>,
}

#[derive(Deserialize)]
pub struct PhotoDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CategoryIds {
    pub category_ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct GalleryIds {
    pub gallery_ids: Vec<i64>,
}

/// Fields accumulated while draining the upload's multipart stream.
#[derive(Default)]
struct UploadForm {
    file: Option<axum::body::Bytes>,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    date: Option<NaiveDate>,
    category_ids: Vec<i64>,
    gallery_ids: Vec<i64>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                form.file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?,
                );
            }
            "title" => form.title = Some(text(field).await?),
            "description" => form.description = Some(text(field).await?),
            "location" => form.location = Some(text(field).await?),
            "date" => {
                let raw = text(field).await?;
                let date = raw
                    .parse::<NaiveDate>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", raw)))?;
                form.date = Some(date);
            }
            // Id lists arrive as repeated integer fields, one id per field.
            "category_ids" => form.category_ids.push(parse_id(&text(field).await?)?),
            "gallery_ids" => form.gallery_ids.push(parse_id(&text(field).await?)?),
            _ => {}
        }
    }

    Ok(form)
}

async fn text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid field value: {}", e)))
}

fn parse_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid id: {}", raw)))
}

async fn upload(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let form = read_upload_form(multipart).await?;
    let bytes = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;

    let format = storage::detect_image(bytes).ok_or(AppError::UnsupportedMediaType)?;
    let file_name = format!("{}.{}", Uuid::now_v7(), format.extension());
    let stored = storage::save_upload(state.config.uploads_path(), &file_name, bytes)?;
    let photo_path = format!("/uploads/{}", file_name);

    let insert = || -> AppResult<i64> {
        let mut conn = state.db.get()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO photos (photo_path, title, description, location, date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![photo_path, form.title, form.description, form.location, form.date],
        )?;
        let photo_id = tx.last_insert_rowid();
        associations::replace_links_tx(&tx, photo_id, &form.category_ids, PhotoLink::Categories)?;
        associations::replace_links_tx(&tx, photo_id, &form.gallery_ids, PhotoLink::Galleries)?;
        tx.commit()?;
        Ok(photo_id)
    };

    match insert() {
        Ok(photo_id) => {
            tracing::info!("Stored photo {} at {}", photo_id, photo_path);
            Ok(Json(json!({ "id_photo": photo_id })))
        }
        Err(e) => {
            // The row never landed; don't leave an orphan blob behind.
            storage::remove_upload(&stored);
            Err(e)
        }
    }
}

async fn list_all(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Vec<PhotoResponse>>> {
    let conn = state.db.get()?;
    Ok(Json(list_photos(&conn)?))
}

async fn count(State(state): State<AppState>, _admin: CurrentAdmin) -> AppResult<Json<i64>> {
    let conn = state.db.get()?;
    Ok(Json(count_photos(&conn)?))
}

async fn get_by_id(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(photo_id): Path<i64>,
) -> AppResult<Json<PhotoResponse>> {
    let conn = state.db.get()?;
    Ok(Json(fetch_photo(&conn, photo_id)?))
}

async fn update_details(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<PhotoDetails>,
) -> AppResult<Json<PhotoResponse>> {
    let conn = state.db.get()?;
    ensure_photo_exists(&conn, photo_id)?;

    conn.execute(
        "UPDATE photos SET title = ?1, description = ?2, location = ?3, date = ?4 \
         WHERE id_photo = ?5",
        params![req.title, req.description, req.location, req.date, photo_id],
    )?;

    Ok(Json(fetch_photo(&conn, photo_id)?))
}

async fn update_categories(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<CategoryIds>,
) -> AppResult<Json<PhotoResponse>> {
    let mut conn = state.db.get()?;
    ensure_photo_exists(&conn, photo_id)?;

    associations::replace_links(&mut conn, photo_id, &req.category_ids, PhotoLink::Categories)?;
    Ok(Json(fetch_photo(&conn, photo_id)?))
}

async fn update_galleries(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<GalleryIds>,
) -> AppResult<Json<PhotoResponse>> {
    let mut conn = state.db.get()?;
    ensure_photo_exists(&conn, photo_id)?;

    associations::replace_links(&mut conn, photo_id, &req.gallery_ids, PhotoLink::Galleries)?;
    Ok(Json(fetch_photo(&conn, photo_id)?))
}

async fn delete_photo(
    State(state): State<AppState>,
    Path(photo_id): Path<i64>,
    _admin: CurrentAdmin,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let photo = fetch_photo(&conn, photo_id)?.photo;

    // Join rows go with the photo via ON DELETE CASCADE.
    conn.execute("DELETE FROM photos WHERE id_photo = ?1", params![photo_id])?;

    if let Some(name) = photo.photo_path.strip_prefix("/uploads/") {
        if let Ok(path) = storage::resolve_upload(state.config.uploads_path(), name) {
            storage::remove_upload(&path);
        }
    }

    Ok(Json(json!({ "message": "Photo deleted successfully" })))
}

// -- Shared loaders (also used by the public router) --

pub(crate) fn fetch_photo(conn: &Connection, photo_id: i64) -> AppResult<PhotoResponse> {
    let photo = conn
        .query_row(
            &format!("SELECT {} FROM photos WHERE id_photo = ?1", PHOTO_COLUMNS),
            params![photo_id],
            Photo::from_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
            other => other.into(),
        })?;
    with_associations(conn, photo)
}

pub(crate) fn list_photos(conn: &Connection) -> AppResult<Vec<PhotoResponse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM photos ORDER BY date ASC",
        PHOTO_COLUMNS
    ))?;
    let photos = stmt
        .query_map([], Photo::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    photos
        .into_iter()
        .map(|photo| with_associations(conn, photo))
        .collect()
}

pub(crate) fn count_photos(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?)
}

fn with_associations(conn: &Connection, photo: Photo) -> AppResult<PhotoResponse> {
    let mut stmt = conn.prepare(
        "SELECT c.id_category, c.category_name FROM categories c \
         JOIN categories_and_photos cp ON cp.id_category = c.id_category \
         WHERE cp.id_photo = ?1 ORDER BY c.id_category",
    )?;
    let categories = stmt
        .query_map(params![photo.id_photo], Category::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT g.id_gallery, g.gallery_name FROM gallery g \
         JOIN gallery_and_photos gp ON gp.id_gallery = g.id_gallery \
         WHERE gp.id_photo = ?1 ORDER BY g.id_gallery",
    )?;
    let galleries = stmt
        .query_map(params![photo.id_photo], Gallery::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PhotoResponse {
        photo,
        categories,
        galleries,
    })
}

fn ensure_photo_exists(conn: &Connection, photo_id: i64) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM photos WHERE id_photo = ?1",
        params![photo_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}
