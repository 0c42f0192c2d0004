//! Admin category CRUD.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rusqlite::{params, Connection};
use serde::Deserialize;
use serde_json::json;

use crate::db::models::Category;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/category/all", get(list_all))
        .route("/admin/category/count", get(count))
        .route("/admin/category/{category_id}", get(get_by_id))
        .route("/admin/category/add", post(add))
        .route("/admin/category/update/{category_id}", put(update))
        .route("/admin/category/delete/{category_id}", delete(delete_category))
}

#[derive(Deserialize)]
pub struct CategoryUpload {
    pub category_name: String,
}

async fn list_all(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Vec<Category>>> {
    let conn = state.db.get()?;
    Ok(Json(list_categories(&conn)?))
}

async fn count(State(state): State<AppState>, _admin: CurrentAdmin) -> AppResult<Json<i64>> {
    let conn = state.db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    Ok(Json(count))
}

async fn get_by_id(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(category_id): Path<i64>,
) -> AppResult<Json<Category>> {
    let conn = state.db.get()?;
    Ok(Json(fetch_category(&conn, category_id)?))
}

async fn add(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(req): Json<CategoryUpload>,
) -> AppResult<Json<serde_json::Value>> {
    if req.category_name.trim().is_empty() {
        return Err(AppError::BadRequest("Category name is required".into()));
    }

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO categories (category_name) VALUES (?1)",
        params![req.category_name.trim()],
    )?;

    Ok(Json(json!({ "id_category": conn.last_insert_rowid() })))
}

async fn update(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<CategoryUpload>,
) -> AppResult<Json<Category>> {
    let conn = state.db.get()?;
    fetch_category(&conn, category_id)?;

    conn.execute(
        "UPDATE categories SET category_name = ?1 WHERE id_category = ?2",
        params![req.category_name, category_id],
    )?;

    Ok(Json(fetch_category(&conn, category_id)?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
    _admin: CurrentAdmin,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    fetch_category(&conn, category_id)?;

    // Join rows cascade; photos themselves are untouched.
    conn.execute(
        "DELETE FROM categories WHERE id_category = ?1",
        params![category_id],
    )?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

pub(crate) fn list_categories(conn: &Connection) -> AppResult<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id_category, category_name FROM categories ORDER BY id_category")?;
    let categories = stmt
        .query_map([], Category::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

fn fetch_category(conn: &Connection, category_id: i64) -> AppResult<Category> {
    conn.query_row(
        "SELECT id_category, category_name FROM categories WHERE id_category = ?1",
        params![category_id],
        Category::from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}
