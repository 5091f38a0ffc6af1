//! PostgreSQL-backed [`FollowRepository`].
//!
//! The composite primary key and `ON CONFLICT DO NOTHING` keep concurrent
//! follow requests from creating duplicate edges.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::ports::{FollowPersistenceError, FollowRepository};

use super::diesel_helpers::{Failure, classify, map_basic, pool_message};
use super::models::NewFollowRow;
use super::pool::DbPool;
use super::schema::follows;

/// Diesel implementation of [`FollowRepository`].
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    /// Create the repository.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FollowPersistenceError {
    match classify(&error) {
        Failure::Check => FollowPersistenceError::self_follow(),
        _ => map_basic(
            &error,
            FollowPersistenceError::connection,
            FollowPersistenceError::query,
        ),
    }
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        if follower == author {
            return Err(FollowPersistenceError::self_follow());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FollowPersistenceError::connection(pool_message(err)))?;
        let inserted = diesel::insert_into(follows::table)
            .values(&NewFollowRow {
                follower_id: *follower.as_uuid(),
                author_id: *author.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn delete(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FollowPersistenceError::connection(pool_message(err)))?;
        let removed = diesel::delete(follows::table.find((*follower.as_uuid(), *author.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn exists(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FollowPersistenceError::connection(pool_message(err)))?;
        diesel::select(diesel::dsl::exists(
            follows::table.find((*follower.as_uuid(), *author.as_uuid())),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn followed_authors(
        &self,
        follower: &UserId,
    ) -> Result<Vec<UserId>, FollowPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| FollowPersistenceError::connection(pool_message(err)))?;
        let ids: Vec<Uuid> = follows::table
            .filter(follows::follower_id.eq(*follower.as_uuid()))
            .order_by(follows::created_at.asc())
            .select(follows::author_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
