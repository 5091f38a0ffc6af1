//! PostgreSQL-backed [`CommentRepository`].

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, CommentId, NewComment, PostId, PostText, User};

use super::diesel_helpers::{Failure, classify, map_basic, pool_message};
use super::diesel_user_repository::row_to_user;
use super::models::{CommentRow, UserRow};
use super::pool::DbPool;
use super::schema::{comments, users};

/// Diesel implementation of [`CommentRepository`].
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create the repository.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> CommentPersistenceError {
    match classify(&error) {
        Failure::ForeignKey => CommentPersistenceError::missing_reference("post or author"),
        _ => map_basic(
            &error,
            CommentPersistenceError::connection,
            CommentPersistenceError::query,
        ),
    }
}

fn assemble(row: CommentRow, author: User) -> Result<Comment, CommentPersistenceError> {
    let text =
        PostText::new(row.text).map_err(|err| CommentPersistenceError::query(err.to_string()))?;
    Ok(Comment::new(
        CommentId::from_uuid(row.id),
        PostId::from_uuid(row.post_id),
        author,
        text,
        row.created_at,
    ))
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CommentPersistenceError::connection(pool_message(err)))?;
        let row = CommentRow {
            id: *comment.id.as_uuid(),
            post_id: *comment.post_id.as_uuid(),
            author_id: *comment.author.as_uuid(),
            text: comment.text.as_str().to_owned(),
            created_at: comment.created_at,
        };
        diesel::insert_into(comments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let author_row: UserRow = users::table
            .find(row.author_id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let author = row_to_user(author_row).map_err(CommentPersistenceError::query)?;
        Ok(Comment::new(
            comment.id,
            comment.post_id,
            author,
            comment.text,
            comment.created_at,
        ))
    }

    async fn list_for_post(&self, post: &PostId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CommentPersistenceError::connection(pool_message(err)))?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::post_id.eq(*post.as_uuid()))
            .select(CommentRow::as_select())
            .order_by(comments::created_at.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut author_ids: Vec<Uuid> = rows.iter().map(|row| row.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<Uuid, User> = users::table
            .filter(users::id.eq_any(author_ids))
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| {
                let id = row.id;
                row_to_user(row).map(|user| (id, user))
            })
            .collect::<Result<_, _>>()
            .map_err(CommentPersistenceError::query)?;
        rows.into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                    CommentPersistenceError::query(format!("comment {} has no author", row.id))
                })?;
                assemble(row, author)
            })
            .collect()
    }
}
