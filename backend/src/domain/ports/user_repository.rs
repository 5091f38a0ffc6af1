//! Port for user persistence.
use async_trait::async_trait;

use crate::domain::{User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Connection could not be established.
        Connection { message: String } => ServiceUnavailable: "user repository connection failed: {message}",
        /// Query or mutation failed.
        Query { message: String } => InternalError: "user repository query failed: {message}",
    }
}

/// Storage of registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by handle.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user among `ids` that exists, in no particular order.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Return the user with `username`, registering it first when absent.
    ///
    /// Concurrent calls for the same handle yield the same user.
    async fn find_or_create(&self, username: &Username) -> Result<User, UserPersistenceError>;
}
