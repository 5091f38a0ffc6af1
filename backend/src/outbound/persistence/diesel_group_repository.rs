//! PostgreSQL-backed [`GroupRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{Group, GroupId, GroupSlug, GroupTitle};

use super::diesel_helpers::{Failure, classify, map_basic, pool_message};
use super::models::GroupRow;
use super::pool::DbPool;
use super::schema::groups;

/// Diesel implementation of [`GroupRepository`].
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create the repository.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> GroupPersistenceError {
    map_basic(&error, GroupPersistenceError::connection, GroupPersistenceError::query)
}

pub(super) fn row_to_group(row: GroupRow) -> Result<Group, String> {
    let title = GroupTitle::new(row.title).map_err(|err| err.to_string())?;
    let slug = GroupSlug::new(row.slug).map_err(|err| err.to_string())?;
    Ok(Group::new(
        GroupId::from_uuid(row.id),
        title,
        slug,
        row.description,
    ))
}

fn convert(row: GroupRow) -> Result<Group, GroupPersistenceError> {
    row_to_group(row).map_err(GroupPersistenceError::query)
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| GroupPersistenceError::connection(pool_message(err)))?;
        groups::table
            .filter(groups::slug.eq(slug.as_str()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(convert)
            .transpose()
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| GroupPersistenceError::connection(pool_message(err)))?;
        groups::table
            .filter(groups::id.eq(*id.as_uuid()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(convert)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| GroupPersistenceError::connection(pool_message(err)))?;
        let rows: Vec<GroupRow> = groups::table
            .select(GroupRow::as_select())
            .order_by(groups::title.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(convert).collect()
    }

    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| GroupPersistenceError::connection(pool_message(err)))?;
        let row = GroupRow {
            id: *group.id().as_uuid(),
            title: group.title().as_str().to_owned(),
            slug: group.slug().as_str().to_owned(),
            description: group.description().to_owned(),
        };
        diesel::insert_into(groups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match classify(&err) {
                Failure::Unique => GroupPersistenceError::duplicate_slug(group.slug().as_str()),
                _ => map_diesel_error(err),
            })
    }
}
