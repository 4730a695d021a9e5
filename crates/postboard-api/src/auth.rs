use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use postboard_db::Database;
use postboard_db::models::{NewUser, UserRow};
use postboard_types::api::{Envelope, LoginRequest, RegisterRequest};
use postboard_types::models::User;
use postboard_types::time;

use crate::error::ApiError;
use crate::with_db;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_string();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Please provide all fields"));
    }
    if !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest("Password must be at least 8 characters"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4().simple().to_string();
    let now = time::now();

    let row = with_db(&state, move |db| {
        let created = db.create_user(&NewUser {
            id: &user_id,
            username: &username,
            email: &email,
            password_hash: &password_hash,
            created_at: &now,
        })?;
        if !created {
            return Ok(None);
        }
        db.get_user_by_id(&user_id)
    })
    .await?
    .ok_or(ApiError::Conflict("Username or email already exists"))?;

    info!("Registered user {} ({})", row.username, row.id);
    Ok((StatusCode::CREATED, Json(Envelope::ok(user_from_row(row)))))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let identifier = req.username.trim().to_string();

    let user = with_db(&state, move |db| match db.get_user_by_username(&identifier)? {
        Some(user) => Ok(Some(user)),
        None => db.get_user_by_email(&identifier),
    })
    .await?
    .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| anyhow::anyhow!("Stored hash for {} is unreadable: {}", user.id, e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized("Invalid credentials"))?;

    Ok(Json(Envelope::ok(user_from_row(user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = with_db(&state, move |db| db.get_user_by_id(&user_id))
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(Envelope::ok(user_from_row(user))))
}

pub(crate) fn user_from_row(row: UserRow) -> User {
    let created_at = time::parse_timestamp(&row.created_at).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on user '{}'", row.created_at, row.id);
        chrono::DateTime::default()
    });
    let updated_at = time::parse_timestamp(&row.updated_at);

    User {
        id: row.id,
        username: row.username,
        email: row.email,
        bio: row.bio,
        profile_image: row.profile_image,
        created_at,
        updated_at,
    }
}
