//! Domain primitives, services and ports.
//!
//! Nothing in here knows about HTTP, SQL or Redis. Adapters in
//! [`crate::inbound`] and [`crate::outbound`] plug into the traits in
//! [`ports`].

pub mod auth;
pub mod comment;
pub mod error;
pub mod feed;
pub mod follow;
pub mod group;
pub mod image;
pub mod login;
pub mod ports;
pub mod post;
pub mod posts;
mod slug;
pub mod trace_id;
pub mod user;

pub use self::auth::{AccountDirectory, LoginCredentials, LoginValidationError};
pub use self::comment::{Comment, CommentId, NewComment};
pub use self::error::{Error, ErrorCode, FieldErrors};
pub use self::feed::FeedService;
pub use self::follow::FollowService;
pub use self::group::{
    GROUP_SLUG_MAX, GROUP_TITLE_MAX, Group, GroupId, GroupSlug, GroupTitle, GroupValidationError,
};
pub use self::image::{
    ImageFormat, ImageRef, ImageUpload, ImageValidationError, POST_IMAGE_DIR, sanitize_filename,
};
pub use self::login::DirectoryLoginService;
pub use self::post::{
    NewPost, POST_EXCERPT_LEN, Post, PostChanges, PostDraft, PostId, PostText,
    PostValidationError,
};
pub use self::posts::PostService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{USERNAME_MAX, User, UserId, UserValidationError, Username};
