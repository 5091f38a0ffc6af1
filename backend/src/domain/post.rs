//! Posts and the drafts they are written from.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Group, GroupId, ImageRef, ImageUpload, User, UserId};

/// Characters of a post shown where it is listed by name.
pub const POST_EXCERPT_LEN: usize = 15;

/// Validation errors for post text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostValidationError {
    /// Text was blank.
    #[error("This field is required.")]
    EmptyText,
}

/// Stable post identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
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

impl FromStr for PostId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Non-blank body text of a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostText(String);

impl PostText {
    /// Validate and wrap text.
    pub fn new(raw: impl Into<String>) -> Result<Self, PostValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(PostValidationError::EmptyText);
        }
        Ok(Self(value))
    }

    /// Borrow the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first [`POST_EXCERPT_LEN`] characters.
    #[must_use]
    pub fn excerpt(&self) -> String {
        self.0.chars().take(POST_EXCERPT_LEN).collect()
    }
}

impl TryFrom<String> for PostText {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostText> for String {
    fn from(value: PostText) -> Self {
        value.0
    }
}

/// A published post with its author and group resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: PostId,
    author: User,
    text: PostText,
    group: Option<Group>,
    image: Option<ImageRef>,
    created_at: DateTime<Utc>,
}

impl Post {
    /// Assemble a post from stored parts.
    #[must_use]
    pub const fn new(
        id: PostId,
        author: User,
        text: PostText,
        group: Option<Group>,
        image: Option<ImageRef>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            text,
            group,
            image,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &PostId {
        &self.id
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

    /// Group, when filed under one.
    #[must_use]
    pub const fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    /// Attached image.
    #[must_use]
    pub const fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    /// Publication timestamp; the feed sort key.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `user` wrote this post.
    #[must_use]
    pub fn is_authored_by(&self, user: &UserId) -> bool {
        self.author.id() == user
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text.excerpt())
    }
}

/// A post ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Identifier assigned up front.
    pub id: PostId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub text: PostText,
    /// Optional group.
    pub group: Option<GroupId>,
    /// Optional stored image.
    pub image: Option<ImageRef>,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

/// Author-editable fields of an existing post.
///
/// `image` of `None` keeps the current image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostChanges {
    /// Replacement text.
    pub text: PostText,
    /// Replacement group; `None` files the post under no group.
    pub group: Option<GroupId>,
    /// Replacement image.
    pub image: Option<ImageRef>,
}

/// Raw post form as submitted by a client, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Submitted text.
    pub text: String,
    /// Submitted group slug; blank means no group.
    pub group: Option<String>,
    /// Submitted image, already checked by [`ImageUpload::new`].
    pub image: Option<Result<ImageUpload, super::ImageValidationError>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use rstest::rstest;

    #[rstest]
    fn displays_its_first_fifteen_characters() {
        let author = User::new(UserId::random(), Username::new("auth").expect("valid"));
        let post = Post::new(
            PostId::random(),
            author,
            PostText::new("Тестовый пост для проверки").expect("valid"),
            None,
            None,
            Utc::now(),
        );
        assert_eq!(post.to_string(), "Тестовый пост д");
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    fn blank_text_is_rejected(#[case] raw: &str) {
        assert_eq!(PostText::new(raw), Err(PostValidationError::EmptyText));
    }

    #[rstest]
    fn authorship_compares_ids() {
        let author_id = UserId::random();
        let author = User::new(author_id, Username::new("auth").expect("valid"));
        let post = Post::new(
            PostId::random(),
            author,
            PostText::new("hello").expect("valid"),
            None,
            None,
            Utc::now(),
        );
        assert!(post.is_authored_by(&author_id));
        assert!(!post.is_authored_by(&UserId::random()));
    }
}
