//! Comments left under posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PostId, PostText, User, UserId};

/// Stable comment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(Uuid);

impl CommentId {
    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The wrapped UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// A comment with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    id: CommentId,
    post_id: PostId,
    author: User,
    text: PostText,
    created_at: DateTime<Utc>,
}

impl Comment {
    /// Assemble a comment from stored parts.
    #[must_use]
    pub const fn new(
        id: CommentId,
        post_id: PostId,
        author: User,
        text: PostText,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            author,
            text,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &CommentId {
        &self.id
    }

    /// Post commented on.
    #[must_use]
    pub const fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Author.
    #[must_use]
    pub const fn author(&self) -> &User {
        &self.author
    }

    /// Body text.
    #[must_use]
    pub const fn text(&self) -> &PostText {
        &self.text
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A comment ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Identifier assigned up front.
    pub id: CommentId,
    /// Post commented on.
    pub post_id: PostId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub text: PostText,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
