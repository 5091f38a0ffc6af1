//! Login against the configured account directory.
//!
//! A successful login registers the user on first sight so posts, comments
//! and follows can reference a stable id.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::{AccountDirectory, Error, LoginCredentials, User};

/// [`LoginService`] backed by an [`AccountDirectory`].
pub struct DirectoryLoginService<U> {
    directory: AccountDirectory,
    users: Arc<U>,
}

impl<U> DirectoryLoginService<U> {
    /// Create the service.
    pub const fn new(directory: AccountDirectory, users: Arc<U>) -> Self {
        Self { directory, users }
    }
}

#[async_trait]
impl<U> LoginService for DirectoryLoginService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        if !self.directory.verify(credentials) {
            debug!(username = %credentials.username(), "login rejected");
            return Err(Error::unauthorized("invalid credentials"));
        }
        let user = self.users.find_or_create(credentials.username()).await?;
        info!(user = %user.id(), "login accepted");
        Ok(user)
    }
}
