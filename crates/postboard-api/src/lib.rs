pub mod auth;
pub mod error;
pub mod posts;

use axum::{
    Router,
    routing::{get, post, put},
};

use postboard_db::Database;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

/// All API routes. Middleware (CORS, tracing) is layered on by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/{id}", get(posts::get_post).delete(posts::delete_post))
        .route("/api/posts/{id}/like", put(posts::toggle_like))
        .route("/api/users/register", post(auth::register))
        .route("/api/users/login", post(auth::login))
        .route("/api/users/{id}", get(auth::get_user))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run blocking DB work off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    Ok(tokio::task::spawn_blocking(move || f(&state.db)).await??)
}
