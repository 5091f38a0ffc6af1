//! PostgreSQL-backed [`PostRepository`].
//!
//! Post rows are loaded first; their authors and groups follow in two batched
//! `IN` queries and are stitched together in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::{
    Group, GroupId, ImageRef, NewPost, Post, PostChanges, PostId, PostText, User, UserId,
};

use super::diesel_group_repository::row_to_group;
use super::diesel_helpers::{Failure, classify, map_basic, pool_message};
use super::diesel_user_repository::row_to_user;
use super::models::{GroupRow, NewPostRow, PostRow, UserRow};
use super::pool::DbPool;
use super::schema::{groups, posts, users};

/// Diesel implementation of [`PostRepository`].
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create the repository.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PostPersistenceError {
    match classify(&error) {
        Failure::ForeignKey => PostPersistenceError::missing_reference("author or group"),
        _ => map_basic(&error, PostPersistenceError::connection, PostPersistenceError::query),
    }
}

enum Selection {
    All,
    Group(Uuid),
    Author(Uuid),
    Authors(Vec<Uuid>),
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

async fn hydrate(
    conn: &mut AsyncPgConnection,
    rows: Vec<PostRow>,
) -> Result<Vec<Post>, PostPersistenceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let author_ids = distinct(rows.iter().map(|row| row.author_id));
    let group_ids = distinct(rows.iter().filter_map(|row| row.group_id));

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(author_ids))
        .select(UserRow::as_select())
        .load::<UserRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .into_iter()
        .map(|row| {
            let id = row.id;
            row_to_user(row).map(|user| (id, user))
        })
        .collect::<Result<_, _>>()
        .map_err(PostPersistenceError::query)?;

    let groups: HashMap<Uuid, Group> = if group_ids.is_empty() {
        HashMap::new()
    } else {
        groups::table
            .filter(groups::id.eq_any(group_ids))
            .select(GroupRow::as_select())
            .load::<GroupRow>(conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| {
                let id = row.id;
                row_to_group(row).map(|group| (id, group))
            })
            .collect::<Result<_, _>>()
            .map_err(PostPersistenceError::query)?
    };

    rows.into_iter()
        .map(|row| assemble(row, &authors, &groups))
        .collect()
}

fn assemble(
    row: PostRow,
    authors: &HashMap<Uuid, User>,
    groups: &HashMap<Uuid, Group>,
) -> Result<Post, PostPersistenceError> {
    let author = authors
        .get(&row.author_id)
        .cloned()
        .ok_or_else(|| PostPersistenceError::query(format!("post {} has no author", row.id)))?;
    let group = row
        .group_id
        .map(|id| {
            groups
                .get(&id)
                .cloned()
                .ok_or_else(|| PostPersistenceError::query(format!("post {} lost group {id}", row.id)))
        })
        .transpose()?;
    let text = PostText::new(row.text).map_err(|err| PostPersistenceError::query(err.to_string()))?;
    Ok(Post::new(
        PostId::from_uuid(row.id),
        author,
        text,
        group,
        row.image.map(ImageRef::from_stored),
        row.created_at,
    ))
}

impl DieselPostRepository {
    async fn load_one(
        conn: &mut AsyncPgConnection,
        id: Uuid,
    ) -> Result<Option<Post>, PostPersistenceError> {
        let row: Option<PostRow> = posts::table
            .find(id)
            .select(PostRow::as_select())
            .first(conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(hydrate(conn, vec![row]).await?.into_iter().next())
    }

    async fn list(&self, selection: Selection) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostPersistenceError::connection(pool_message(err)))?;
        let mut query = posts::table.into_boxed();
        query = match selection {
            Selection::All => query,
            Selection::Group(id) => query.filter(posts::group_id.eq(id)),
            Selection::Author(id) => query.filter(posts::author_id.eq(id)),
            Selection::Authors(ids) => query.filter(posts::author_id.eq_any(ids)),
        };
        let rows: Vec<PostRow> = query
            .select(PostRow::as_select())
            .order_by((posts::created_at.desc(), posts::seq.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate(&mut conn, rows).await
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn insert(&self, post: NewPost) -> Result<Post, PostPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostPersistenceError::connection(pool_message(err)))?;
        let id = *post.id.as_uuid();
        diesel::insert_into(posts::table)
            .values(&NewPostRow {
                id,
                author_id: *post.author.as_uuid(),
                text: post.text.as_str(),
                group_id: post.group.map(|group| *group.as_uuid()),
                image: post.image.as_ref().map(ImageRef::as_str),
                created_at: post.created_at,
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Self::load_one(&mut conn, id)
            .await?
            .ok_or_else(|| PostPersistenceError::query("inserted post vanished"))
    }

    async fn update(
        &self,
        id: &PostId,
        changes: PostChanges,
    ) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostPersistenceError::connection(pool_message(err)))?;
        let target = posts::table.find(*id.as_uuid());
        let text = changes.text.as_str();
        let group = changes.group.map(|group| *group.as_uuid());
        let updated = match changes.image.as_ref() {
            Some(image) => {
                diesel::update(target)
                    .set((
                        posts::text.eq(text),
                        posts::group_id.eq(group),
                        posts::image.eq(Some(image.as_str())),
                    ))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(target)
                    .set((posts::text.eq(text), posts::group_id.eq(group)))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Ok(None);
        }
        Self::load_one(&mut conn, *id.as_uuid()).await
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostPersistenceError::connection(pool_message(err)))?;
        let removed = diesel::delete(posts::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PostPersistenceError::connection(pool_message(err)))?;
        Self::load_one(&mut conn, *id.as_uuid()).await
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostPersistenceError> {
        self.list(Selection::All).await
    }

    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Post>, PostPersistenceError> {
        self.list(Selection::Group(*group.as_uuid())).await
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostPersistenceError> {
        self.list(Selection::Author(*author.as_uuid())).await
    }

    async fn list_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Post>, PostPersistenceError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        let ids = authors.iter().map(|id| *id.as_uuid()).collect();
        self.list(Selection::Authors(ids)).await
    }
}
