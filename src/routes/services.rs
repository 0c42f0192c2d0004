//! Admin service CRUD. Services are standalone (name, description, icon)
//! with no relationships.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::db::models::Service;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/services/all", get(list_all))
        .route("/admin/services/count", get(count))
        .route("/admin/services/{service_id}", get(get_by_id))
        .route("/admin/services/create", post(create))
        .route("/admin/services/update/{service_id}", put(update))
        .route("/admin/services/delete/{service_id}", delete(delete_service))
}

#[derive(Deserialize)]
pub struct ServiceRequest {
    pub service_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

async fn list_all(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Vec<Service>>> {
    let conn = state.db.get()?;
    Ok(Json(list_services(&conn)?))
}

async fn count(State(state): State<AppState>, _admin: CurrentAdmin) -> AppResult<Json<i64>> {
    let conn = state.db.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
    Ok(Json(count))
}

async fn get_by_id(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Path(service_id): Path<i64>,
) -> AppResult<Json<Service>> {
    let conn = state.db.get()?;
    Ok(Json(fetch_service(&conn, service_id)?))
}

async fn create(
    State(state): State<AppState>,
    _admin: CurrentAdmin,
    Json(req): Json<ServiceRequest>,
) -> AppResult<Json<Service>> {
    if req.service_name.trim().is_empty() {
        return Err(AppError::BadRequest("Service name is required".into()));
    }

    let conn = state.db.get()?;
    conn.execute(
        "INSERT INTO services (service_name, description, icon) VALUES (?1, ?2, ?3)",
        params![req.service_name.trim(), req.description, req.icon],
    )?;

    Ok(Json(fetch_service(&conn, conn.last_insert_rowid())?))
}

async fn update(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<ServiceRequest>,
) -> AppResult<Json<Service>> {
    let conn = state.db.get()?;
    fetch_service(&conn, service_id)?;

    conn.execute(
        "UPDATE services SET service_name = ?1, description = ?2, icon = ?3 \
         WHERE id_service = ?4",
        params![req.service_name, req.description, req.icon, service_id],
    )?;

    Ok(Json(fetch_service(&conn, service_id)?))
}

async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    _admin: CurrentAdmin,
) -> AppResult<Json<Service>> {
    let conn = state.db.get()?;
    let service = fetch_service(&conn, service_id)?;

    conn.execute(
        "DELETE FROM services WHERE id_service = ?1",
        params![service_id],
    )?;

    Ok(Json(service))
}

pub(crate) fn list_services(conn: &Connection) -> AppResult<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id_service, service_name, description, icon FROM services ORDER BY id_service",
    )?;
    let services = stmt
        .query_map([], Service::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(services)
}

fn fetch_service(conn: &Connection, service_id: i64) -> AppResult<Service> {
    conn.query_row(
        "SELECT id_service, service_name, description, icon FROM services WHERE id_service = ?1",
        params![service_id],
        Service::from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}
