//! Render-ready snapshot of the account page.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::account::AccountState;
use crate::events::Route;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    /// `None` when nobody is signed in; the page renders nothing.
    pub account: Option<AccountCard>,
    pub posts: PostsPane,
    pub delete_dialog: Option<DeleteDialog>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountCard {
    pub username: String,
    pub email: String,
    pub member_since: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "posts", rename_all = "snake_case")]
pub enum PostsPane {
    Loading,
    /// No posts yet; offers a link to create one.
    Empty { create_link: Route },
    Posts(Vec<PostCard>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub posted_at: String,
    pub image: String,
    pub caption: String,
    pub liked: bool,
    pub like_count: u64,
    /// A like request for this post is outstanding; the button is disabled.
    pub like_busy: bool,
    pub link: Route,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteDialog {
    pub post_id: String,
    pub title: String,
    pub body: String,
}

pub(crate) fn render(state: &AccountState) -> AccountView {
    let user = state.session.user();

    let account = user.map(|u| AccountCard {
        username: u.username.clone(),
        email: u.email.clone(),
        member_since: member_since(u.created_at),
    });

    let posts = if state.loading {
        PostsPane::Loading
    } else if state.posts.is_empty() {
        PostsPane::Empty {
            create_link: Route::CreatePost,
        }
    } else {
        let user_id = user.map(|u| u.id.as_str());
        PostsPane::Posts(
            state
                .posts
                .iter()
                .map(|p| PostCard {
                    id: p.id.clone(),
                    title: p.title.clone(),
                    posted_at: posted_at(p.created_at),
                    image: p.image.clone(),
                    caption: p.caption.clone(),
                    liked: user_id.is_some_and(|id| p.is_liked_by(id)),
                    like_count: p.likes_count,
                    like_busy: state.liking.contains(&p.id),
                    link: Route::Post(p.id.clone()),
                })
                .collect(),
        )
    };

    let delete_dialog = match (&state.staged_delete, state.dialog_open) {
        (Some(post), true) => Some(DeleteDialog {
            post_id: post.id.clone(),
            title: "Delete Post".to_string(),
            body: "Are you sure you want to delete this post? This action cannot be undone."
                .to_string(),
        }),
        _ => None,
    };

    AccountView {
        account,
        posts,
        delete_dialog,
    }
}

fn member_since(at: DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y").to_string()
}

fn posted_at(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %H:%M").to_string()
}
