//! Client side of Postboard: a typed HTTP client for the posts API and the
//! account page controller that drives it.

pub mod account;
pub mod error;
pub mod events;
pub mod http;
pub mod session;
pub mod view;

pub use account::{AccountController, DeleteOutcome, LikeOutcome};
pub use error::{AccountError, ClientError, DecodeError};
pub use events::{Notice, NoticeStatus, Route, UiEvent};
pub use http::{PostApi, PostsClient};
pub use session::Session;
