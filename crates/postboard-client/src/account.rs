//! Account page controller.
//!
//! Holds the signed-in user's own posts and exposes the page's commands:
//! load, like/unlike, staged delete with confirmation, and logout. Every
//! command waits for the server before changing what is displayed; nothing
//! is applied optimistically.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use postboard_types::models::{Post, User};

use crate::error::{AccountError, ClientError};
use crate::events::{Notice, Route, UiEvent};
use crate::http::PostApi;
use crate::session::Session;
use crate::view::{self, AccountView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked { likes_count: u64 },
    Unliked { likes_count: u64 },
    /// A like request for this post was already outstanding.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { post_id: String },
    NothingStaged,
}

#[derive(Debug, Default)]
pub(crate) struct AccountState {
    pub(crate) session: Session,
    pub(crate) posts: Vec<Post>,
    pub(crate) loading: bool,
    /// Post ids with a like request in flight.
    pub(crate) liking: HashSet<String>,
    pub(crate) staged_delete: Option<Post>,
    pub(crate) dialog_open: bool,
}

pub struct AccountController<A> {
    api: A,
    events: mpsc::UnboundedSender<UiEvent>,
    state: Mutex<AccountState>,
}

impl<A: PostApi> AccountController<A> {
    /// Returns the controller and the stream of UI events it emits.
    pub fn new(api: A, session: Session) -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let state = AccountState {
            session,
            loading: true,
            ..AccountState::default()
        };

        let controller = Self {
            api,
            events,
            state: Mutex::new(state),
        };
        (controller, rx)
    }

    /// Fetch every post and keep the current user's, newest first.
    ///
    /// Without a signed-in user this only requests navigation to login, as
    /// every command does. Fetch failures are logged and returned; the list is not touched.
    pub async fn load_posts(&self) -> Result<usize, AccountError> {
        let _loading = LoadingFlag::raise(&self.state);

        let user_id = self.require_user()?;

        match self.api.list_posts().await {
            Ok(all) => {
                let mine = own_posts(all, &user_id);
                let count = mine.len();
                self.lock().posts = mine;
                debug!("Loaded {} posts for {}", count, user_id);
                Ok(count)
            }
            Err(e) => {
                error!("Error fetching user posts: {}", e);
                Err(e.into())
            }
        }
    }

    /// Like or unlike a post as the current user.
    ///
    /// While a request for `post_id` is outstanding, further calls for the
    /// same post return [`LikeOutcome::Ignored`] without touching the network.
    pub async fn toggle_like(&self, post_id: &str) -> Result<LikeOutcome, AccountError> {
        let user_id = self.require_user()?;

        let Some(_in_flight) = InFlight::acquire(&self.state, post_id) else {
            debug!("Like already in flight for post {}, ignoring", post_id);
            return Ok(LikeOutcome::Ignored);
        };

        match self.api.toggle_like(post_id, &user_id).await {
            Ok(updated) => {
                let liked = updated.is_liked_by(&user_id);
                let likes_count = updated.likes_count;

                if let Some(post) = self.lock().posts.iter_mut().find(|p| p.id == post_id) {
                    post.likes = updated.likes;
                    post.likes_count = updated.likes_count;
                }

                let title = if liked { "Post liked" } else { "Post unliked" };
                self.emit(UiEvent::Notify(Notice::success(title, None, 2000)));

                Ok(if liked {
                    LikeOutcome::Liked { likes_count }
                } else {
                    LikeOutcome::Unliked { likes_count }
                })
            }
            Err(e) => {
                let description = match &e {
                    ClientError::Rejected { message } => {
                        warn!("Like on post {} rejected: {}", post_id, e);
                        message.as_deref().unwrap_or("Failed to update like")
                    }
                    _ => {
                        error!("Error liking post {}: {}", post_id, e);
                        "Failed to update like. Please try again."
                    }
                };
                self.emit(UiEvent::Notify(Notice::error("Error", description)));
                Err(e.into())
            }
        }
    }

    /// Stage a post for deletion and open the confirmation dialog.
    pub fn request_delete(&self, post: &Post) {
        let mut state = self.lock();
        state.staged_delete = Some(post.clone());
        state.dialog_open = true;
    }

    pub fn cancel_delete(&self) {
        let mut state = self.lock();
        state.staged_delete = None;
        state.dialog_open = false;
    }

    /// Delete the staged post. The server checks ownership.
    ///
    /// The dialog is closed and the staged post cleared whatever the result.
    pub async fn confirm_delete(&self) -> Result<DeleteOutcome, AccountError> {
        let staged = self.lock().staged_delete.clone();
        let Some(post) = staged else {
            return Ok(DeleteOutcome::NothingStaged);
        };

        let _dialog = DialogClose(&self.state);
        let user_id = self.require_user()?;

        match self.api.delete_post(&post.id, &user_id).await {
            Ok(()) => {
                self.lock().posts.retain(|p| p.id != post.id);
                info!("Deleted post {}", post.id);
                self.emit(UiEvent::Notify(Notice::success(
                    "Post deleted",
                    Some("Your post has been successfully deleted"),
                    3000,
                )));
                Ok(DeleteOutcome::Deleted { post_id: post.id })
            }
            Err(e) => {
                let notice = match &e {
                    ClientError::Rejected { message } => {
                        warn!("Delete of post {} rejected: {}", post.id, e);
                        Notice::error(
                            "Delete failed",
                            message.as_deref().unwrap_or("Failed to delete post"),
                        )
                    }
                    _ => {
                        error!("Error deleting post {}: {}", post.id, e);
                        Notice::error(
                            "Error",
                            "An error occurred while deleting the post. Please try again.",
                        )
                    }
                };
                self.emit(UiEvent::Notify(notice));
                Err(e.into())
            }
        }
    }

    pub fn logout(&self) {
        self.lock().session.clear();
        self.emit(UiEvent::Notify(Notice::info(
            "Logged out",
            "You have been successfully logged out",
        )));
        self.emit(UiEvent::Navigate(Route::Login));
    }

    // -- Read side --

    pub fn view(&self) -> AccountView {
        view::render(&self.lock())
    }

    pub fn posts(&self) -> Vec<Post> {
        self.lock().posts.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_liking(&self, post_id: &str) -> bool {
        self.lock().liking.contains(post_id)
    }

    /// Whether the current user is among the post's likes.
    pub fn is_liked(&self, post: &Post) -> bool {
        self.current_user_id()
            .is_some_and(|user_id| post.is_liked_by(&user_id))
    }

    pub fn staged_delete(&self) -> Option<Post> {
        self.lock().staged_delete.clone()
    }

    pub fn is_delete_dialog_open(&self) -> bool {
        self.lock().dialog_open
    }

    pub fn current_user(&self) -> Option<User> {
        self.lock().session.user().cloned()
    }

    fn current_user_id(&self) -> Option<String> {
        self.lock().session.user_id().map(str::to_string)
    }

    /// The signed-in user's id, or a redirect to login.
    fn require_user(&self) -> Result<String, AccountError> {
        self.current_user_id().ok_or_else(|| {
            self.emit(UiEvent::Navigate(Route::Login));
            AccountError::NotAuthenticated
        })
    }

    fn lock(&self) -> MutexGuard<'_, AccountState> {
        lock(&self.state)
    }

    fn emit(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }
}

/// Keep only `user_id`'s posts, newest first. Ties keep server order.
pub fn own_posts(posts: Vec<Post>, user_id: &str) -> Vec<Post> {
    let mut mine: Vec<Post> = posts.into_iter().filter(|p| p.user_id == user_id).collect();
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    mine
}

fn lock(state: &Mutex<AccountState>) -> MutexGuard<'_, AccountState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loading flag, lowered on every exit path including a dropped future.
struct LoadingFlag<'a>(&'a Mutex<AccountState>);

impl<'a> LoadingFlag<'a> {
    fn raise(state: &'a Mutex<AccountState>) -> Self {
        lock(state).loading = true;
        Self(state)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        lock(self.0).loading = false;
    }
}

/// Per-post in-flight marker for like requests.
struct InFlight<'a> {
    state: &'a Mutex<AccountState>,
    post_id: String,
}

impl<'a> InFlight<'a> {
    /// `None` if a request for this post is already outstanding.
    fn acquire(state: &'a Mutex<AccountState>, post_id: &str) -> Option<Self> {
        let fresh = lock(state).liking.insert(post_id.to_string());
        fresh.then(|| Self {
            state,
            post_id: post_id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).liking.remove(&self.post_id);
    }
}

/// Closes the delete dialog and clears the staged post when dropped.
struct DialogClose<'a>(&'a Mutex<AccountState>);

impl Drop for DialogClose<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.0);
        state.staged_delete = None;
        state.dialog_open = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use postboard_types::time::parse_timestamp;

    use super::*;
    use crate::error::DecodeError;
    use crate::events::NoticeStatus;

    /// In-memory stand-in for the posts API.
    #[derive(Default)]
    struct MockApi {
        posts: Mutex<Vec<Post>>,
        fail_next: Mutex<Option<ClientError>>,
        /// When set, like requests wait here until notified.
        like_gate: Option<Arc<Notify>>,
        list_calls: AtomicUsize,
        like_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    impl MockApi {
        fn with_posts(posts: Vec<Post>) -> Self {
            Self {
                posts: Mutex::new(posts),
                ..Self::default()
            }
        }

        fn fail_next(&self, err: ClientError) {
            *self.fail_next.lock().unwrap() = Some(err);
        }

        fn take_failure(&self) -> Option<ClientError> {
            self.fail_next.lock().unwrap().take()
        }
    }

    impl PostApi for MockApi {
        async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if let Some(err) = self.take_failure() {
                return Err(err);
            }
            Ok(self.posts.lock().unwrap().clone())
        }

        async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Post, ClientError> {
            self.like_calls.fetch_add(1, Ordering::SeqCst);
            match &self.like_gate {
                Some(gate) => gate.notified().await,
                None => tokio::task::yield_now().await,
            }
            if let Some(err) = self.take_failure() {
                return Err(err);
            }

            let mut posts = self.posts.lock().unwrap();
            let post = posts
                .iter_mut()
                .find(|p| p.id == post_id)
                .ok_or(ClientError::Rejected {
                    message: Some("Post not found".into()),
                })?;
            if post.is_liked_by(user_id) {
                post.likes.retain(|id| id != user_id);
            } else {
                post.likes.push(user_id.to_string());
            }
            post.likes_count = post.likes.len() as u64;
            Ok(post.clone())
        }

        async fn delete_post(&self, post_id: &str, user_id: &str) -> Result<(), ClientError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if let Some(err) = self.take_failure() {
                return Err(err);
            }

            let mut posts = self.posts.lock().unwrap();
            match posts.iter().position(|p| p.id == post_id) {
                Some(i) if posts[i].user_id == user_id => {
                    posts.remove(i);
                    Ok(())
                }
                Some(_) => Err(ClientError::Rejected {
                    message: Some("You can only delete your own posts".into()),
                }),
                None => Err(ClientError::Rejected {
                    message: Some("Post not found".into()),
                }),
            }
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            username: format!("user_{id}"),
            email: format!("{id}@example.com"),
            bio: String::new(),
            profile_image: String::new(),
            created_at: parse_timestamp("2023-06-01").unwrap(),
            updated_at: None,
        }
    }

    fn post(id: &str, owner: &str, created_at: &str) -> Post {
        Post {
            id: id.to_string(),
            user_id: owner.to_string(),
            title: format!("Post {id}"),
            caption: String::new(),
            image: format!("https://img.example/{id}.png"),
            likes: Vec::new(),
            likes_count: 0,
            created_at: parse_timestamp(created_at).unwrap(),
            updated_at: None,
        }
    }

    fn sample_posts() -> Vec<Post> {
        vec![
            post("p2", "u1", "2024-01-01"),
            post("p3", "u2", "2024-01-03"),
            post("p1", "u1", "2024-01-02"),
        ]
    }

    fn signed_in(api: MockApi) -> (AccountController<MockApi>, mpsc::UnboundedReceiver<UiEvent>) {
        AccountController::new(api, Session::signed_in(user("u1")))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    fn transport_failure() -> ClientError {
        ClientError::Decode(DecodeError::MissingData)
    }

    #[tokio::test]
    async fn load_keeps_own_posts_newest_first() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        assert!(c.is_loading());

        assert_eq!(c.load_posts().await.unwrap(), 2);

        assert_eq!(ids(&c.posts()), ["p1", "p2"]);
        assert!(!c.is_loading());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn load_without_user_redirects_and_skips_fetch() {
        let (c, mut rx) = AccountController::new(MockApi::with_posts(sample_posts()), Session::anonymous());

        let err = c.load_posts().await.unwrap_err();

        assert!(matches!(err, AccountError::NotAuthenticated));
        assert_eq!(c.api.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(drain(&mut rx), [UiEvent::Navigate(Route::Login)]);
        assert!(c.posts().is_empty());
    }

    #[tokio::test]
    async fn load_failure_leaves_list_empty_and_clears_loading() {
        let api = MockApi::with_posts(sample_posts());
        api.fail_next(transport_failure());
        let (c, mut rx) = signed_in(api);

        assert!(c.load_posts().await.is_err());

        assert!(c.posts().is_empty());
        assert!(!c.is_loading());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn rapid_double_like_sends_one_request() {
        let (c, _rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        let (first, second) = tokio::join!(c.toggle_like("p1"), c.toggle_like("p1"));
        let mut outcomes = vec![first.unwrap(), second.unwrap()];
        outcomes.sort_by_key(|o| matches!(o, LikeOutcome::Ignored));

        assert_eq!(outcomes, [LikeOutcome::Liked { likes_count: 1 }, LikeOutcome::Ignored]);
        assert_eq!(c.api.like_calls.load(Ordering::SeqCst), 1);
        assert!(!c.is_liking("p1"));
    }

    #[tokio::test]
    async fn in_flight_flag_is_per_post() {
        let gate = Arc::new(Notify::new());
        let api = MockApi {
            like_gate: Some(gate.clone()),
            ..MockApi::with_posts(sample_posts())
        };
        let (c, _rx) = signed_in(api);
        c.load_posts().await.unwrap();

        let held = c.toggle_like("p1");
        let probe = async {
            while !c.is_liking("p1") {
                tokio::task::yield_now().await;
            }
            assert!(!c.is_liking("p2"));
            let repeat = c.toggle_like("p1").await.unwrap();
            gate.notify_one();
            repeat
        };

        let (held, repeat) = tokio::join!(held, probe);
        assert_eq!(repeat, LikeOutcome::Ignored);
        assert_eq!(held.unwrap(), LikeOutcome::Liked { likes_count: 1 });
        assert_eq!(c.api.like_calls.load(Ordering::SeqCst), 1);
        assert!(!c.is_liking("p1"));
    }

    #[tokio::test]
    async fn like_then_unlike_follows_server() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        let outcome = c.toggle_like("p1").await.unwrap();
        assert_eq!(outcome, LikeOutcome::Liked { likes_count: 1 });
        let p1 = c.posts().into_iter().find(|p| p.id == "p1").unwrap();
        assert!(c.is_liked(&p1));
        assert_eq!(p1.likes_count, p1.likes.len() as u64);

        let outcome = c.toggle_like("p1").await.unwrap();
        assert_eq!(outcome, LikeOutcome::Unliked { likes_count: 0 });
        let p1 = c.posts().into_iter().find(|p| p.id == "p1").unwrap();
        assert!(!c.is_liked(&p1));

        let titles: Vec<String> = drain(&mut rx)
            .into_iter()
            .map(|e| match e {
                UiEvent::Notify(n) => n.title,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(titles, ["Post liked", "Post unliked"]);
    }

    #[tokio::test]
    async fn rejected_like_keeps_state_and_shows_server_message() {
        let api = MockApi::with_posts(sample_posts());
        let (c, mut rx) = signed_in(api);
        c.load_posts().await.unwrap();
        let before = c.posts();

        c.api.fail_next(ClientError::Rejected {
            message: Some("Post not found".into()),
        });
        assert!(c.toggle_like("p1").await.is_err());

        assert_eq!(c.posts(), before);
        assert!(!c.is_liking("p1"));
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => {
                assert_eq!(n.status, NoticeStatus::Error);
                assert_eq!(n.description.as_deref(), Some("Post not found"));
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_like_without_message_uses_default() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        c.api.fail_next(ClientError::Rejected { message: None });
        assert!(c.toggle_like("p1").await.is_err());

        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => {
                assert_eq!(n.description.as_deref(), Some("Failed to update like"))
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_on_like_is_generic() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        c.api.fail_next(transport_failure());
        assert!(c.toggle_like("p2").await.is_err());

        assert!(!c.is_liking("p2"));
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => assert_eq!(
                n.description.as_deref(),
                Some("Failed to update like. Please try again.")
            ),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn abandoned_like_releases_its_flag() {
        let gate = Arc::new(Notify::new());
        let api = MockApi {
            like_gate: Some(gate),
            ..MockApi::with_posts(sample_posts())
        };
        let (c, _rx) = signed_in(api);
        c.load_posts().await.unwrap();

        tokio::select! {
            biased;
            _ = c.toggle_like("p1") => panic!("gated request finished"),
            _ = std::future::ready(()) => {}
        }

        assert!(!c.is_liking("p1"));
    }

    #[tokio::test]
    async fn like_without_user_is_refused() {
        let (c, mut rx) = AccountController::new(MockApi::with_posts(sample_posts()), Session::anonymous());
        let err = c.toggle_like("p1").await.unwrap_err();
        assert!(matches!(err, AccountError::NotAuthenticated));
        assert_eq!(c.api.like_calls.load(Ordering::SeqCst), 0);
        assert!(!c.is_liking("p1"));
        assert_eq!(drain(&mut rx), [UiEvent::Navigate(Route::Login)]);
    }

    #[tokio::test]
    async fn delete_after_logout_redirects_without_request() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();
        c.request_delete(&c.posts()[0]);
        c.logout();
        drain(&mut rx);

        let err = c.confirm_delete().await.unwrap_err();

        assert!(matches!(err, AccountError::NotAuthenticated));
        assert_eq!(c.api.delete_calls.load(Ordering::SeqCst), 0);
        assert!(!c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), None);
        assert_eq!(drain(&mut rx), [UiEvent::Navigate(Route::Login)]);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_only_that_post() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();
        let p1 = c.posts()[0].clone();
        let p2 = c.posts()[1].clone();

        c.request_delete(&p1);
        assert!(c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), Some(p1.clone()));
        assert_eq!(c.api.delete_calls.load(Ordering::SeqCst), 0);

        let outcome = c.confirm_delete().await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted { post_id: "p1".into() });
        assert_eq!(c.posts(), [p2]);
        assert!(!c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), None);
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => assert_eq!(n.title, "Post deleted"),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_delete_keeps_post_and_closes_dialog() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();
        let before = c.posts();

        c.request_delete(&before[0]);
        c.api.fail_next(ClientError::Rejected { message: None });
        assert!(c.confirm_delete().await.is_err());

        assert_eq!(c.posts(), before);
        assert!(!c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), None);
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => {
                assert_eq!(n.title, "Delete failed");
                assert_eq!(n.description.as_deref(), Some("Failed to delete post"));
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_on_delete_is_generic() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();
        let before = c.posts();

        c.request_delete(&before[1]);
        c.api.fail_next(transport_failure());
        let err = c.confirm_delete().await.unwrap_err();

        assert!(matches!(err, AccountError::Client(ClientError::Decode(_))));
        assert_eq!(c.posts(), before);
        assert!(!c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), None);
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => {
                assert_eq!(n.status, NoticeStatus::Error);
                assert_eq!(n.title, "Error");
                assert_eq!(
                    n.description.as_deref(),
                    Some("An error occurred while deleting the post. Please try again.")
                );
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_of_foreign_post_is_refused_by_server() {
        let mut posts = sample_posts();
        posts.push(post("p9", "u2", "2024-02-01"));
        let (c, mut rx) = signed_in(MockApi::with_posts(posts));
        c.load_posts().await.unwrap();

        c.request_delete(&post("p3", "u2", "2024-01-03"));
        assert!(c.confirm_delete().await.is_err());

        assert_eq!(ids(&c.posts()), ["p1", "p2"]);
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n)] => assert_eq!(
                n.description.as_deref(),
                Some("You can only delete your own posts")
            ),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn confirm_with_nothing_staged_is_a_no_op() {
        let (c, mut rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        assert_eq!(c.confirm_delete().await.unwrap(), DeleteOutcome::NothingStaged);
        assert_eq!(c.api.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(c.posts().len(), 2);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn cancel_closes_dialog_without_deleting() {
        let (c, _rx) = signed_in(MockApi::with_posts(sample_posts()));
        c.load_posts().await.unwrap();

        c.request_delete(&c.posts()[0]);
        c.cancel_delete();

        assert!(!c.is_delete_dialog_open());
        assert_eq!(c.staged_delete(), None);
        assert_eq!(c.confirm_delete().await.unwrap(), DeleteOutcome::NothingStaged);
        assert_eq!(c.posts().len(), 2);
    }

    #[tokio::test]
    async fn logout_clears_session_and_goes_to_login() {
        let (c, mut rx) = signed_in(MockApi::default());

        c.logout();

        assert_eq!(c.current_user(), None);
        match drain(&mut rx).as_slice() {
            [UiEvent::Notify(n), UiEvent::Navigate(Route::Login)] => {
                assert_eq!(n.title, "Logged out");
                assert_eq!(n.status, NoticeStatus::Info);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn own_posts_is_stable_on_equal_timestamps() {
        let posts = vec![
            post("a", "u1", "2024-01-01"),
            post("b", "u1", "2024-01-01"),
            post("c", "u2", "2024-01-05"),
            post("d", "u1", "2024-01-02"),
        ];
        assert_eq!(ids(&own_posts(posts, "u1")), ["d", "a", "b"]);
    }
}
