use serde::Serialize;

/// Requests from a controller to whatever UI layer hosts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum UiEvent {
    /// Show a transient notification
    Notify(Notice),

    /// Leave the current view
    Navigate(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStatus {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: NoticeStatus,
    pub duration_ms: u64,
}

impl Notice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: Some(description.to_string()),
            status: NoticeStatus::Info,
            duration_ms: 3000,
        }
    }

    pub fn success(title: &str, description: Option<&str>, duration_ms: u64) -> Self {
        Self {
            title: title.to_string(),
            description: description.map(str::to_string),
            status: NoticeStatus::Success,
            duration_ms,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: Some(description.to_string()),
            status: NoticeStatus::Error,
            duration_ms: 5000,
        }
    }
}

/// Client-side routes the account page links or redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "id", rename_all = "snake_case")]
pub enum Route {
    Login,
    CreatePost,
    Post(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::CreatePost => "/post".to_string(),
            Route::Post(id) => format!("/post/{}", id),
        }
    }
}
