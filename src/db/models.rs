use chrono::NaiveDate;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Admin account row. The password hash never leaves the db layer; response
/// shaping goes through `AdminDetails`.
#[derive(Debug, Clone)]
pub struct User {
    pub id_user: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
}

pub const USER_COLUMNS: &str = "id_user, username, email, password_hash, description, \
     photo_path, instagram_url, facebook_url, linkedin_url";

impl User {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_user: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            description: row.get(4)?,
            photo_path: row.get(5)?,
            instagram_url: row.get(6)?,
            facebook_url: row.get(7)?,
            linkedin_url: row.get(8)?,
        })
    }
}

/// Non-secret view of a `User`, safe to serialize into responses.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDetails {
    pub id_user: i64,
    pub username: String,
    pub email: String,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl From<User> for AdminDetails {
    fn from(user: User) -> Self {
        Self {
            id_user: user.id_user,
            username: user.username,
            email: user.email,
            description: user.description,
            photo_path: user.photo_path,
            instagram_url: user.instagram_url,
            facebook_url: user.facebook_url,
            linkedin_url: user.linkedin_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Photo {
    pub id_photo: i64,
    pub photo_path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
}

impl Photo {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_photo: row.get(0)?,
            photo_path: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            location: row.get(4)?,
            date: row.get(5)?,
        })
    }
}

pub const PHOTO_COLUMNS: &str = "id_photo, photo_path, title, description, location, date";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id_category: i64,
    pub category_name: String,
}

impl Category {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_category: row.get(0)?,
            category_name: row.get(1)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub id_gallery: i64,
    pub gallery_name: Option<String>,
}

impl Gallery {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_gallery: row.get(0)?,
            gallery_name: row.get(1)?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id_service: i64,
    pub service_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl Service {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id_service: row.get(0)?,
            service_name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
        })
    }
}
