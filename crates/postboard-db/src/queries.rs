use std::collections::HashMap;

use crate::Database;
use crate::models::{DeleteResult, LikeToggle, NewPost, NewUser, PostRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, bio, profile_image, created_at, updated_at";

const POST_COLUMNS: &str = "id, user_id, title, caption, image, created_at, updated_at";

impl Database {
    // -- Users --

    /// Insert a user unless the username or email is taken. The check and the
    /// insert share one transaction; returns false on a conflict.
    pub fn create_user(&self, user: &NewUser<'_>) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let taken: i64 = tx.query_row(
                "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
                [user.username, user.email],
                |row| row.get(0),
            )?;
            if taken > 0 {
                return Ok(false);
            }

            let inserted = tx.execute(
                "INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![
                    user.id,
                    user.username,
                    user.email,
                    user.password_hash,
                    user.created_at
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e.into()),
            }

            tx.commit()?;
            Ok(true)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    // -- Posts --

    pub fn insert_post(&self, post: &NewPost<'_>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, user_id, title, caption, image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                rusqlite::params![
                    post.id,
                    post.user_id,
                    post.title,
                    post.caption,
                    post.image,
                    post.created_at
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// All posts, newest first, each with its likes.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id"
            ))?;
            let mut posts = stmt
                .query_map([], map_post)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut likes = query_all_likes(conn)?;
            for post in &mut posts {
                post.likes = likes.remove(&post.id).unwrap_or_default();
            }

            Ok(posts)
        })
    }

    /// Toggle `user_id`'s like on a post: removes it if present, adds it if
    /// not. Runs in one transaction. Returns `None` if the post does not exist.
    pub fn toggle_like(&self, post_id: &str, user_id: &str, now: &str) -> Result<Option<LikeToggle>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if query_post(&tx, post_id)?.is_none() {
                return Ok(None);
            }

            let removed = tx.execute(
                "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
                [post_id, user_id],
            )?;

            let liked = removed == 0;
            if liked {
                tx.execute(
                    "INSERT INTO post_likes (post_id, user_id, created_at) VALUES (?1, ?2, ?3)",
                    [post_id, user_id, now],
                )?;
            }

            tx.execute(
                "UPDATE posts SET updated_at = ?2 WHERE id = ?1",
                [post_id, now],
            )?;

            let post = query_post(&tx, post_id)?
                .ok_or_else(|| anyhow::anyhow!("Post vanished mid-toggle: {}", post_id))?;

            tx.commit()?;
            Ok(Some(LikeToggle { liked, post }))
        })
    }

    /// Hard-delete a post if `user_id` owns it. Likes go with it.
    pub fn delete_post(&self, post_id: &str, user_id: &str) -> Result<DeleteResult> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner: Option<String> = tx
                .query_row("SELECT user_id FROM posts WHERE id = ?1", [post_id], |row| {
                    row.get(0)
                })
                .optional()?;

            let result = match owner {
                None => DeleteResult::NotFound,
                Some(owner) if owner != user_id => DeleteResult::NotOwner,
                Some(_) => {
                    tx.execute("DELETE FROM posts WHERE id = ?1", [post_id])?;
                    DeleteResult::Deleted
                }
            };

            tx.commit()?;
            Ok(result)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                bio: row.get(4)?,
                profile_image: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_post(conn: &Connection, id: &str) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"))?;

    let Some(mut post) = stmt.query_row([id], map_post).optional()? else {
        return Ok(None);
    };

    post.likes = query_likes_for_post(conn, &post.id)?;
    Ok(Some(post))
}

fn map_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        caption: row.get(3)?,
        image: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        likes: Vec::new(),
    })
}

/// Liking user ids for every post, grouped by post id, oldest like first.
/// Binds no variables; SQLite caps them at 32766 per statement.
fn query_all_likes(conn: &Connection) -> Result<HashMap<String, Vec<String>>> {
    let mut stmt = conn.prepare("SELECT post_id, user_id FROM post_likes ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        let (post_id, user_id) = row?;
        grouped.entry(post_id).or_default().push(user_id);
    }

    Ok(grouped)
}

fn query_likes_for_post(conn: &Connection, post_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT user_id FROM post_likes WHERE post_id = ?1 ORDER BY rowid")?;
    let likes = stmt
        .query_map([post_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(likes)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
