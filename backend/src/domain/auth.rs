//! Login credentials and the account directory they are checked against.

use std::collections::HashMap;

use thiserror::Error;
use zeroize::Zeroizing;

use super::Username;

/// Rejected login payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Username was blank or malformed.
    #[error("username is not valid")]
    InvalidUsername,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and password submitted at login.
///
/// The password is wiped from memory on drop.
///
/// # Examples
/// ```
/// use postboard::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "s3cret").unwrap();
/// assert_eq!(creds.username().as_str(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw inputs. The username is trimmed, the password is not.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let name =
            Username::new(username.trim()).map_err(|_| LoginValidationError::InvalidUsername)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: name,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Submitted username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Submitted password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Usernames and passwords allowed to log in.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: HashMap<Username, Zeroizing<String>>,
}

impl AccountDirectory {
    /// Build a directory from `(username, password)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, LoginValidationError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut accounts = HashMap::new();
        for (username, password) in pairs {
            let credentials = LoginCredentials::try_from_parts(&username, &password)?;
            accounts.insert(credentials.username, credentials.password);
        }
        Ok(Self { accounts })
    }

    /// Whether the credentials match a known account.
    #[must_use]
    pub fn verify(&self, credentials: &LoginCredentials) -> bool {
        self.accounts
            .get(credentials.username())
            .is_some_and(|expected| expected.as_str() == credentials.password())
    }

    /// Number of known accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn directory() -> AccountDirectory {
        AccountDirectory::from_pairs([
            ("alice".to_owned(), "wonderland".to_owned()),
            ("bob".to_owned(), " spaced ".to_owned()),
        ])
        .expect("valid accounts")
    }

    fn creds(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("credential shape")
    }

    #[rstest]
    #[case("alice", "wonderland", true)]
    #[case(" alice ", "wonderland", true)]
    #[case("alice", "Wonderland", false)]
    #[case("bob", " spaced ", true)]
    #[case("bob", "spaced", false)]
    #[case("carol", "wonderland", false)]
    fn verifies_credentials(
        directory: AccountDirectory,
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(directory.verify(&creds(username, password)), expected);
    }

    #[rstest]
    #[case("", "pw", LoginValidationError::InvalidUsername)]
    #[case("two words", "pw", LoginValidationError::InvalidUsername)]
    #[case("alice", "", LoginValidationError::EmptyPassword)]
    fn rejects_malformed_payloads(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        assert_eq!(
            LoginCredentials::try_from_parts(username, password),
            Err(expected)
        );
    }

    #[rstest]
    fn invalid_directory_entries_fail_loading() {
        let result = AccountDirectory::from_pairs([("bad name".to_owned(), "pw".to_owned())]);
        assert!(result.is_err());
    }
}
