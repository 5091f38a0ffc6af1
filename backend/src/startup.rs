//! Start-up loading of accounts and groups.
//!
//! Accounts file:
//!
//! ```json
//! { "alice": "s3cret", "bob": "hunter2" }
//! ```
//!
//! Groups file:
//!
//! ```json
//! [ { "title": "Cats", "description": "Feline content" }, { "title": "Dogs", "slug": "dogs" } ]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{
    AccountDirectory, Group, GroupId, GroupSlug, GroupTitle, GroupValidationError,
    LoginValidationError,
};

/// Errors raised while loading start-up data.
#[derive(Debug, Error)]
pub enum StartupError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A file was not the expected JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// An account entry was malformed.
    #[error("invalid account entry: {0}")]
    Account(#[from] LoginValidationError),
    /// A group entry was malformed.
    #[error("invalid group {title:?}: {source}")]
    Group {
        /// Offending title.
        title: String,
        /// Validation failure.
        #[source]
        source: GroupValidationError,
    },
    /// Storing a group failed.
    #[error("failed to store group {slug}: {source}")]
    Store {
        /// Slug of the group.
        slug: String,
        /// Repository failure.
        #[source]
        source: GroupPersistenceError,
    },
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    title: String,
    slug: Option<String>,
    #[serde(default)]
    description: String,
}

fn read_file(path: &Path) -> Result<Vec<u8>, StartupError> {
    let read_error = |source| StartupError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read(file_name).map_err(read_error)
}

fn parse_json<T: for<'de> Deserialize<'de>>(path: &Path, bytes: &[u8]) -> Result<T, StartupError> {
    serde_json::from_slice(bytes).map_err(|source| StartupError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the accounts allowed to log in.
///
/// Without a file nobody can log in, which is logged but not an error.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or holds an invalid entry.
pub fn load_accounts(path: Option<&Path>) -> Result<AccountDirectory, StartupError> {
    let Some(path) = path else {
        warn!("no accounts file configured; logins will be rejected");
        return Ok(AccountDirectory::default());
    };
    let pairs: BTreeMap<String, String> = parse_json(path, &read_file(path)?)?;
    let directory = AccountDirectory::from_pairs(pairs)?;
    info!(accounts = directory.len(), path = %path.display(), "accounts loaded");
    Ok(directory)
}

fn group_from_entry(entry: GroupEntry) -> Result<Group, StartupError> {
    let invalid = |source| StartupError::Group {
        title: entry.title.clone(),
        source,
    };
    let title = GroupTitle::new(entry.title.as_str()).map_err(invalid)?;
    let slug = match entry.slug.as_deref() {
        Some(slug) => GroupSlug::new(slug),
        None => GroupSlug::from_title(&title),
    }
    .map_err(invalid)?;
    Ok(Group::new(GroupId::random(), title, slug, entry.description))
}

/// Create the groups listed in `path` whose slugs are not taken yet.
///
/// Returns how many groups were created.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, holds an invalid entry, or
/// the repository fails.
pub async fn seed_groups<G>(groups: &G, path: &Path) -> Result<usize, StartupError>
where
    G: GroupRepository + ?Sized,
{
    let entries: Vec<GroupEntry> = parse_json(path, &read_file(path)?)?;
    let mut created = 0;
    for entry in entries {
        let group = group_from_entry(entry)?;
        let store_error = |source| StartupError::Store {
            slug: group.slug().as_str().to_owned(),
            source,
        };
        if groups.find_by_slug(group.slug()).await.map_err(store_error)?.is_some() {
            continue;
        }
        match groups.insert(&group).await {
            Ok(()) => created += 1,
            Err(GroupPersistenceError::DuplicateSlug { .. }) => {}
            Err(source) => return Err(store_error(source)),
        }
    }
    info!(created, path = %path.display(), "groups seeded");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoginCredentials;
    use crate::outbound::memory::MemoryStore;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[rstest]
    fn accounts_are_loaded_from_json() {
        let file = json_file(r#"{ "alice": "s3cret", "bob": "hunter2" }"#);
        let directory = load_accounts(Some(file.path())).expect("accounts load");
        assert_eq!(directory.len(), 2);
        let creds = LoginCredentials::try_from_parts("alice", "s3cret").expect("shape");
        assert!(directory.verify(&creds));
    }

    #[rstest]
    fn missing_accounts_file_means_no_accounts() {
        assert!(load_accounts(None).expect("no file is fine").is_empty());
    }

    #[rstest]
    #[case(r#"{ "alice": "" }"#)]
    #[case(r#"["alice"]"#)]
    fn malformed_accounts_are_rejected(#[case] contents: &str) {
        let file = json_file(contents);
        assert!(load_accounts(Some(file.path())).is_err());
    }

    #[rstest]
    fn unreadable_accounts_report_the_path() {
        let err = load_accounts(Some(Path::new("/nonexistent/accounts.json")))
            .expect_err("missing file");
        assert!(matches!(err, StartupError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/accounts.json"));
    }

    #[tokio::test]
    async fn groups_are_seeded_once() {
        let store = MemoryStore::new();
        let file = json_file(
            r#"[
                { "title": "Cat Pictures", "description": "Feline content" },
                { "title": "Dogs", "slug": "dogs" }
            ]"#,
        );

        assert_eq!(seed_groups(&store, file.path()).await.expect("seed"), 2);
        assert_eq!(seed_groups(&store, file.path()).await.expect("reseed"), 0);

        let slug = GroupSlug::new("cat-pictures").expect("slug");
        let group = store
            .find_by_slug(&slug)
            .await
            .expect("lookup")
            .expect("seeded group");
        assert_eq!(group.description(), "Feline content");
    }

    #[tokio::test]
    async fn invalid_groups_are_rejected() {
        let store = MemoryStore::new();
        let file = json_file(r#"[ { "title": "Bad", "slug": "Not A Slug" } ]"#);
        let err = seed_groups(&store, file.path()).await.expect_err("invalid slug");
        assert!(matches!(err, StartupError::Group { .. }));
    }
}
