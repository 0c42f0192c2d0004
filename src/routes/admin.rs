//! Admin account endpoints: registration, login, profile management.

use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use rusqlite::params;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{password, token};
use crate::db::models::{AdminDetails, User, USER_COLUMNS};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentAdmin;
use crate::state::AppState;
use crate::storage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/register", post(register))
        .route("/admin/login", post(login))
        .route("/admin/me", get(me))
        .route("/admin/update/{user_id}", put(update_profile))
        .route("/admin/update/password/{user_id}", put(update_password))
        .route("/admin/update/photo/{user_id}", put(update_photo))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ProfileEdit {
    pub username: String,
    pub email: String,
    pub description: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<AdminDetails>> {
    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".into()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }

    let conn = state.db.get()?;
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1 OR email = ?2",
        params![username, req.email],
        |row| row.get(0),
    )?;
    if taken {
        return Err(AppError::Conflict("Username already in use".into()));
    }

    let password_hash = password::hash(&req.password)?;
    conn.execute(
        "INSERT INTO users (username, email, password_hash, description, photo_path, \
         instagram_url, facebook_url, linkedin_url) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            username,
            req.email,
            password_hash,
            req.description,
            req.photo_path,
            req.instagram_url,
            req.facebook_url,
            req.linkedin_url
        ],
    )?;

    let user = fetch_user(&conn, conn.last_insert_rowid())?;
    tracing::info!("Registered admin {}", user.username);
    Ok(Json(user.into()))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<token::TokenResponse>> {
    let conn = state.db.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
            params![form.username],
            User::from_row,
        )
        .map_err(|_| AppError::Unauthorized("Invalid Admin Credentials".to_string()))?;

    if !password::verify(&form.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid Admin Credentials".to_string()));
    }

    let response = token::issue(
        &user,
        &state.config.auth.jwt_secret,
        state.config.auth.token_minutes,
    )?;
    Ok(Json(response))
}

async fn me(admin: CurrentAdmin) -> Json<AdminDetails> {
    Json(admin.0)
}

async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<ProfileEdit>,
) -> AppResult<Json<AdminDetails>> {
    let conn = state.db.get()?;
    ensure_user_exists(&conn, user_id)?;

    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE (username = ?1 OR email = ?2) AND id_user != ?3",
        params![req.username, req.email, user_id],
        |row| row.get(0),
    )?;
    if taken {
        return Err(AppError::Conflict("Username already in use".into()));
    }

    conn.execute(
        "UPDATE users SET username = ?1, email = ?2, description = ?3, \
         instagram_url = ?4, facebook_url = ?5, linkedin_url = ?6 WHERE id_user = ?7",
        params![
            req.username,
            req.email,
            req.description,
            req.instagram_url,
            req.facebook_url,
            req.linkedin_url,
            user_id
        ],
    )?;

    Ok(Json(fetch_user(&conn, user_id)?.into()))
}

async fn update_password(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    _admin: CurrentAdmin,
    Json(req): Json<PasswordChange>,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let user = fetch_user(&conn, user_id)?;

    if !password::verify(&req.current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let new_hash = password::hash(&req.new_password)?;
    conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE id_user = ?2",
        params![new_hash, user_id],
    )?;

    Ok(Json(json!({ "msg": "Password updated successfully" })))
}

async fn update_photo(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    _admin: CurrentAdmin,
    mut multipart: Multipart,
) -> AppResult<Json<AdminDetails>> {
    let conn = state.db.get()?;
    ensure_user_exists(&conn, user_id)?;

    let mut file_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?,
            );
        }
    }
    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;

    let format = storage::detect_image(&bytes).ok_or(AppError::UnsupportedMediaType)?;
    let file_name = format!("admin{}.{}", user_id, format.extension());
    let stored = storage::save_upload(state.config.uploads_path(), &file_name, &bytes)?;

    let photo_path = format!("/uploads/{}", file_name);
    if let Err(e) = conn.execute(
        "UPDATE users SET photo_path = ?1 WHERE id_user = ?2",
        params![photo_path, user_id],
    ) {
        storage::remove_upload(&stored);
        return Err(e.into());
    }

    Ok(Json(fetch_user(&conn, user_id)?.into()))
}

fn fetch_user(conn: &rusqlite::Connection, user_id: i64) -> AppResult<User> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id_user = ?1", USER_COLUMNS),
        params![user_id],
        User::from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}

fn ensure_user_exists(conn: &rusqlite::Connection, user_id: i64) -> AppResult<()> {
    fetch_user(conn, user_id).map(|_| ())
}
