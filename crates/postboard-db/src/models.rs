/// Database row types: these map directly to SQLite rows.
/// Distinct from postboard-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub profile_image: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewUser<'a> {
    pub id: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: &'a str,
}

/// A post together with its liking user ids, oldest like first.
pub struct PostRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub caption: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
    pub likes: Vec<String>,
}

pub struct NewPost<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub caption: &'a str,
    pub image: &'a str,
    pub created_at: &'a str,
}

/// Result of a like toggle: whether the user now likes the post, and the post
/// as stored after the change.
pub struct LikeToggle {
    pub liked: bool,
    pub post: PostRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    NotFound,
    NotOwner,
}
