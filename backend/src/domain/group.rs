//! Topical groups posts may be filed under.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::slug::{is_valid_slug, slugify};

/// Maximum length of a group title.
pub const GROUP_TITLE_MAX: usize = 200;
/// Maximum length of a group slug.
pub const GROUP_SLUG_MAX: usize = 50;

/// Validation errors for group fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupValidationError {
    /// Title was blank.
    #[error("group title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`GROUP_TITLE_MAX`] characters.
    #[error("group title must be at most {max} characters")]
    TitleTooLong {
        /// Allowed maximum.
        max: usize,
    },
    /// Slug was not lowercase letters, digits, hyphens or underscores.
    #[error("group slug must be lowercase letters, digits, hyphens or underscores")]
    InvalidSlug,
    /// Slug exceeded [`GROUP_SLUG_MAX`] characters.
    #[error("group slug must be at most {max} characters")]
    SlugTooLong {
        /// Allowed maximum.
        max: usize,
    },
}

/// Stable group identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
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

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// URL-safe unique name of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupSlug(String);

impl GroupSlug {
    /// Validate and wrap a slug.
    pub fn new(raw: impl Into<String>) -> Result<Self, GroupValidationError> {
        let value = raw.into();
        if !is_valid_slug(&value) {
            return Err(GroupValidationError::InvalidSlug);
        }
        if value.len() > GROUP_SLUG_MAX {
            return Err(GroupValidationError::SlugTooLong {
                max: GROUP_SLUG_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Derive a slug from a title, the way the admin form prefills it.
    pub fn from_title(title: &GroupTitle) -> Result<Self, GroupValidationError> {
        let derived: String = slugify(title.as_str()).chars().take(GROUP_SLUG_MAX).collect();
        Self::new(derived.trim_end_matches('-').to_owned())
    }

    /// Borrow the slug.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GroupSlug {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupSlug> for String {
    fn from(value: GroupSlug) -> Self {
        value.0
    }
}

/// Human-readable group name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupTitle(String);

impl GroupTitle {
    /// Validate and wrap a title.
    pub fn new(raw: impl Into<String>) -> Result<Self, GroupValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(GroupValidationError::EmptyTitle);
        }
        if value.chars().count() > GROUP_TITLE_MAX {
            return Err(GroupValidationError::TitleTooLong {
                max: GROUP_TITLE_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Borrow the title.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GroupTitle {
    type Error = GroupValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupTitle> for String {
    fn from(value: GroupTitle) -> Self {
        value.0
    }
}

/// A topical bucket of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    id: GroupId,
    title: GroupTitle,
    slug: GroupSlug,
    description: String,
}

impl Group {
    /// Assemble a group from validated parts.
    #[must_use]
    pub const fn new(id: GroupId, title: GroupTitle, slug: GroupSlug, description: String) -> Self {
        Self {
            id,
            title,
            slug,
            description,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &GroupId {
        &self.id
    }

    /// Display title.
    #[must_use]
    pub const fn title(&self) -> &GroupTitle {
        &self.title
    }

    /// Unique slug.
    #[must_use]
    pub const fn slug(&self) -> &GroupSlug {
        &self.slug
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn title(raw: &str) -> GroupTitle {
        GroupTitle::new(raw).expect("valid title")
    }

    #[rstest]
    fn displays_as_its_title() {
        let group = Group::new(
            GroupId::random(),
            title("Cat Pictures"),
            GroupSlug::new("cats").expect("valid slug"),
            "All about cats".to_owned(),
        );
        assert_eq!(group.to_string(), "Cat Pictures");
    }

    #[rstest]
    #[case("Cat Pictures", "cat-pictures")]
    #[case("Rust 2024", "rust-2024")]
    fn slug_prefills_from_title(#[case] raw: &str, #[case] expected: &str) {
        let slug = GroupSlug::from_title(&title(raw)).expect("derivable slug");
        assert_eq!(slug.as_str(), expected);
    }

    #[rstest]
    fn underivable_titles_need_an_explicit_slug() {
        assert_eq!(
            GroupSlug::from_title(&title("Котики")),
            Err(GroupValidationError::InvalidSlug)
        );
    }

    #[rstest]
    fn long_titles_truncate_the_derived_slug() {
        let slug = GroupSlug::from_title(&title(&"word ".repeat(30))).expect("derivable slug");
        assert!(slug.as_str().len() <= GROUP_SLUG_MAX);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[rstest]
    #[case("")]
    #[case("Upper")]
    #[case("with space")]
    fn rejects_bad_slugs(#[case] raw: &str) {
        assert_eq!(GroupSlug::new(raw), Err(GroupValidationError::InvalidSlug));
    }

    #[rstest]
    fn rejects_blank_titles() {
        assert_eq!(GroupTitle::new("  "), Err(GroupValidationError::EmptyTitle));
    }
}
