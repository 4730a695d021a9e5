use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use postboard_db::models::{DeleteResult, NewPost, PostRow};
use postboard_types::api::{CreatePostRequest, Envelope, LikeRequest, OwnerQuery};
use postboard_types::models::Post;
use postboard_types::time;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::with_db;

/// GET /api/posts: every post, newest first.
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, |db| db.list_posts()).await?;
    let posts: Vec<Post> = rows.into_iter().map(post_from_row).collect();
    Ok(Json(Envelope::ok(posts)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = with_db(&state, move |db| db.get_post(&post_id))
        .await?
        .ok_or(ApiError::NotFound("Post not found"))?;

    Ok(Json(Envelope::ok(post_from_row(row))))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let user_id = req.user_id.trim().to_string();
    let title = req.title.trim().to_string();
    let image = req.image.trim().to_string();
    let caption = req.caption.trim().to_string();

    if user_id.is_empty() || title.is_empty() || image.is_empty() {
        return Err(ApiError::BadRequest("Please provide all fields"));
    }

    let post_id = Uuid::new_v4().simple().to_string();
    let now = time::now();

    let row = with_db(&state, move |db| {
        if db.get_user_by_id(&user_id)?.is_none() {
            return Ok(None);
        }
        db.insert_post(&NewPost {
            id: &post_id,
            user_id: &user_id,
            title: &title,
            caption: &caption,
            image: &image,
            created_at: &now,
        })?;
        db.get_post(&post_id)
    })
    .await?
    .ok_or(ApiError::NotFound("User not found"))?;

    info!("Post {} created by {}", row.id, row.user_id);
    Ok((StatusCode::CREATED, Json(Envelope::ok(post_from_row(row)))))
}

/// PUT /api/posts/{id}/like: add the user to the post's likes, or remove
/// them if already present. Responds with the post as stored afterwards.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    payload: Result<Json<LikeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let user_id = req
        .user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::BadRequest("User ID is required"))?;

    let now = time::now();
    let toggled = with_db(&state, move |db| {
        if db.get_user_by_id(&user_id)?.is_none() {
            return Ok(Err(ApiError::NotFound("User not found")));
        }
        match db.toggle_like(&post_id, &user_id, &now)? {
            Some(toggle) => Ok(Ok(toggle)),
            None => Ok(Err(ApiError::NotFound("Post not found"))),
        }
    })
    .await??;

    let message = if toggled.liked { "Post liked" } else { "Post unliked" };
    Ok(Json(Envelope::ok_with_message(post_from_row(toggled.post), message)))
}

/// DELETE /api/posts/{id}?userId=: hard delete, owner only.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<OwnerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::BadRequest("User ID is required"))?;

    let id = post_id.clone();
    let owner = user_id.clone();
    match with_db(&state, move |db| db.delete_post(&id, &owner)).await? {
        DeleteResult::Deleted => {
            info!("Post {} deleted by {}", post_id, user_id);
            Ok(Json(Envelope::done("Post deleted")))
        }
        DeleteResult::NotFound => Err(ApiError::NotFound("Post not found")),
        DeleteResult::NotOwner => Err(ApiError::Forbidden("You can only delete your own posts")),
    }
}

/// The server is the only place `likesCount` is derived.
pub(crate) fn post_from_row(row: PostRow) -> Post {
    let created_at = time::parse_timestamp(&row.created_at).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on post '{}'", row.created_at, row.id);
        chrono::DateTime::default()
    });
    let updated_at = time::parse_timestamp(&row.updated_at);

    Post {
        likes_count: row.likes.len() as u64,
        likes: row.likes,
        id: row.id,
        user_id: row.user_id,
        title: row.title,
        caption: row.caption,
        image: row.image,
        created_at,
        updated_at,
    }
}
