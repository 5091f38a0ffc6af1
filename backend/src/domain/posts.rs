//! Post and comment use-cases.
//!
//! Only a post's author may change or delete it. Anyone else is told so
//! through [`EditOutcome::NotAuthor`] / [`DeleteOutcome::NotAuthor`] rather
//! than an error, leaving the adapter to send them back to the post.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CommentRepository, DeleteOutcome, EditAccess, EditOutcome, GroupRepository, ImageStore,
    PostCommand, PostDetail, PostQuery, PostRepository,
};
use crate::domain::{
    CommentId, Comment, Error, FieldErrors, GroupId, GroupSlug, ImageRef, ImageUpload, NewComment,
    NewPost, Post, PostChanges, PostDraft, PostId, PostText, UserId,
};

const INVALID_GROUP: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// A draft that passed validation.
struct ValidDraft {
    text: PostText,
    group: Option<GroupId>,
    image: Option<ImageUpload>,
}

/// Post service implementing [`PostCommand`] and [`PostQuery`].
pub struct PostService<P, G, C, I> {
    posts: Arc<P>,
    groups: Arc<G>,
    comments: Arc<C>,
    images: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<P, G, C, I> PostService<P, G, C, I> {
    /// Create the service.
    pub fn new(
        posts: Arc<P>,
        groups: Arc<G>,
        comments: Arc<C>,
        images: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            groups,
            comments,
            images,
            clock,
        }
    }
}

impl<P, G, C, I> PostService<P, G, C, I>
where
    P: PostRepository,
    G: GroupRepository,
    C: CommentRepository,
    I: ImageStore,
{
    async fn existing(&self, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {id} not found")))
    }

    async fn resolve_group(&self, raw: Option<&str>) -> Result<Result<Option<GroupId>, ()>, Error> {
        let Some(slug) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Ok(None));
        };
        let Ok(parsed) = GroupSlug::new(slug) else {
            return Ok(Err(()));
        };
        Ok(self
            .groups
            .find_by_slug(&parsed)
            .await?
            .map(|group| Some(*group.id()))
            .ok_or(()))
    }

    /// Check every field, reporting all failures at once.
    async fn validate(&self, draft: PostDraft) -> Result<ValidDraft, Error> {
        let mut errors = FieldErrors::new();
        let echoed = json!({ "text": draft.text, "group": draft.group });

        let text = PostText::new(draft.text)
            .map_err(|err| errors.add("text", err.to_string()))
            .ok();
        let group = self
            .resolve_group(draft.group.as_deref())
            .await?
            .map_err(|()| errors.add("group", INVALID_GROUP))
            .ok();
        let image = match draft.image {
            None => Some(None),
            Some(Ok(upload)) => Some(Some(upload)),
            Some(Err(err)) => {
                errors.add("image", err.to_string());
                None
            }
        };

        errors.into_result(echoed)?;
        match (text, group, image) {
            (Some(text), Some(group), Some(image)) => Ok(ValidDraft { text, group, image }),
            _ => Err(Error::internal("post validation lost a field")),
        }
    }

    async fn store_image(&self, upload: Option<&ImageUpload>) -> Result<Option<ImageRef>, Error> {
        match upload {
            Some(image) => Ok(Some(self.images.save(image).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<P, G, C, I> PostCommand for PostService<P, G, C, I>
where
    P: PostRepository,
    G: GroupRepository,
    C: CommentRepository,
    I: ImageStore,
{
    async fn create(&self, author: UserId, draft: PostDraft) -> Result<Post, Error> {
        let valid = self.validate(draft).await?;
        let image = self.store_image(valid.image.as_ref()).await?;
        let post = self
            .posts
            .insert(NewPost {
                id: PostId::random(),
                author,
                text: valid.text,
                group: valid.group,
                image,
                created_at: self.clock.utc(),
            })
            .await?;
        info!(post = %post.id(), author = %author, "post published");
        Ok(post)
    }

    async fn edit(
        &self,
        editor: UserId,
        post: PostId,
        draft: PostDraft,
    ) -> Result<EditOutcome, Error> {
        let current = self.existing(&post).await?;
        if !current.is_authored_by(&editor) {
            return Ok(EditOutcome::NotAuthor);
        }
        let valid = self.validate(draft).await?;
        let image = self.store_image(valid.image.as_ref()).await?;
        let changes = PostChanges {
            text: valid.text,
            group: valid.group,
            image,
        };
        let updated = self
            .posts
            .update(&post, changes)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {post} not found")))?;
        info!(post = %post, "post edited");
        Ok(EditOutcome::Updated(updated))
    }

    async fn delete(&self, requester: UserId, post: PostId) -> Result<DeleteOutcome, Error> {
        let current = self.existing(&post).await?;
        if !current.is_authored_by(&requester) {
            return Ok(DeleteOutcome::NotAuthor);
        }
        if !self.posts.delete(&post).await? {
            return Err(Error::not_found(format!("post {post} not found")));
        }
        info!(post = %post, "post deleted");
        Ok(DeleteOutcome::Deleted {
            author: current.author().clone(),
        })
    }

    async fn add_comment(
        &self,
        author: UserId,
        post: PostId,
        text: String,
    ) -> Result<Comment, Error> {
        self.existing(&post).await?;
        let mut errors = FieldErrors::new();
        let echoed = json!({ "text": text });
        let body = PostText::new(text)
            .map_err(|err| errors.add("text", err.to_string()))
            .ok();
        errors.into_result(echoed)?;
        let Some(valid) = body else {
            return Err(Error::internal("comment validation lost its text"));
        };
        let comment = self
            .comments
            .insert(NewComment {
                id: CommentId::random(),
                post_id: post,
                author,
                text: valid,
                created_at: self.clock.utc(),
            })
            .await?;
        Ok(comment)
    }
}

#[async_trait]
impl<P, G, C, I> PostQuery for PostService<P, G, C, I>
where
    P: PostRepository,
    G: GroupRepository,
    C: CommentRepository,
    I: ImageStore,
{
    async fn detail(&self, post: PostId) -> Result<PostDetail, Error> {
        let found = self.existing(&post).await?;
        let comments = self.comments.list_for_post(&post).await?;
        let author_post_count = self.posts.list_by_author(found.author().id()).await?.len();
        Ok(PostDetail {
            post: found,
            comments,
            author_post_count,
        })
    }

    async fn edit_access(&self, editor: UserId, post: PostId) -> Result<EditAccess, Error> {
        let found = self.existing(&post).await?;
        if found.is_authored_by(&editor) {
            Ok(EditAccess::Author(found))
        } else {
            Ok(EditAccess::NotAuthor)
        }
    }
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
