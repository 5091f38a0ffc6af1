//! In-process store implementing every repository port.
//!
//! Used by the test suites and as the development fallback when no database
//! is configured. A single write lock guards each mutation, which gives the
//! follow graph the same uniqueness guarantee the database constraint does.
//! Deleting a post drops its comments.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CommentPersistenceError, CommentRepository, FollowPersistenceError, FollowRepository,
    GroupPersistenceError, GroupRepository, PostPersistenceError, PostRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Comment, CommentId, Group, GroupId, GroupSlug, ImageRef, NewComment, NewPost, Post,
    PostChanges, PostId, PostText, User, UserId, Username,
};

const POISONED: &str = "memory store lock poisoned";

struct PostRecord {
    id: PostId,
    author: UserId,
    text: PostText,
    group: Option<GroupId>,
    image: Option<ImageRef>,
    created_at: DateTime<Utc>,
    seq: u64,
}

struct CommentRecord {
    id: CommentId,
    post: PostId,
    author: UserId,
    text: PostText,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    usernames: HashMap<Username, UserId>,
    groups: HashMap<GroupId, Group>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: BTreeSet<(UserId, UserId)>,
    next_seq: u64,
}

impl State {
    fn hydrate(&self, record: &PostRecord) -> Option<Post> {
        let author = self.users.get(&record.author)?.clone();
        let group = match record.group {
            Some(id) => Some(self.groups.get(&id)?.clone()),
            None => None,
        };
        Some(Post::new(
            record.id,
            author,
            record.text.clone(),
            group,
            record.image.clone(),
            record.created_at,
        ))
    }

    /// Matching posts, newest first; later inserts win timestamp ties.
    fn listing<F>(&self, keep: F) -> Result<Vec<Post>, PostPersistenceError>
    where
        F: Fn(&PostRecord) -> bool,
    {
        let mut records: Vec<&PostRecord> = self.posts.iter().filter(|r| keep(r)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));
        records
            .into_iter()
            .map(|record| {
                self.hydrate(record).ok_or_else(|| {
                    PostPersistenceError::query(format!("post {} lost its author or group", record.id))
                })
            })
            .collect()
    }

    fn check_references(
        &self,
        author: &UserId,
        group: Option<&GroupId>,
    ) -> Result<(), PostPersistenceError> {
        if !self.users.contains_key(author) {
            return Err(PostPersistenceError::missing_reference(format!("user {author}")));
        }
        if let Some(id) = group.filter(|id| !self.groups.contains_key(id)) {
            return Err(PostPersistenceError::missing_reference(format!("group {id}")));
        }
        Ok(())
    }
}

/// Shared in-memory store; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, String> {
        self.state.read().map_err(|_| POISONED.to_owned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, String> {
        self.state.write().map_err(|_| POISONED.to_owned())
    }

    /// Number of follow edges, for assertions on graph invariants.
    pub fn follow_count(&self) -> usize {
        self.read().map_or(0, |state| state.follows.len())
    }

    /// Number of stored comments.
    pub fn comment_count(&self) -> usize {
        self.read().map_or(0, |state| state.comments.len())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.read().map_err(UserPersistenceError::query)?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.read().map_err(UserPersistenceError::query)?;
        Ok(ids.iter().filter_map(|id| state.users.get(id)).cloned().collect())
    }

    async fn find_or_create(&self, username: &Username) -> Result<User, UserPersistenceError> {
        let mut state = self.write().map_err(UserPersistenceError::query)?;
        if let Some(user) = state.usernames.get(username).and_then(|id| state.users.get(id)) {
            return Ok(user.clone());
        }
        let user = User::new(UserId::random(), username.clone());
        state.usernames.insert(username.clone(), *user.id());
        state.users.insert(*user.id(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, GroupPersistenceError> {
        let state = self.read().map_err(GroupPersistenceError::query)?;
        Ok(state.groups.values().find(|g| g.slug() == slug).cloned())
    }

    async fn find_by_id(&self, id: &GroupId) -> Result<Option<Group>, GroupPersistenceError> {
        let state = self.read().map_err(GroupPersistenceError::query)?;
        Ok(state.groups.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, GroupPersistenceError> {
        let state = self.read().map_err(GroupPersistenceError::query)?;
        let mut groups: Vec<Group> = state.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title().as_str().cmp(b.title().as_str()));
        Ok(groups)
    }

    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let mut state = self.write().map_err(GroupPersistenceError::query)?;
        if state.groups.values().any(|g| g.slug() == group.slug()) {
            return Err(GroupPersistenceError::duplicate_slug(group.slug().as_str()));
        }
        state.groups.insert(*group.id(), group.clone());
        Ok(())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn insert(&self, post: NewPost) -> Result<Post, PostPersistenceError> {
        let mut state = self.write().map_err(PostPersistenceError::query)?;
        state.check_references(&post.author, post.group.as_ref())?;
        let seq = state.next_seq;
        state.next_seq = seq.saturating_add(1);
        let record = PostRecord {
            id: post.id,
            author: post.author,
            text: post.text,
            group: post.group,
            image: post.image,
            created_at: post.created_at,
            seq,
        };
        let hydrated = state
            .hydrate(&record)
            .ok_or_else(|| PostPersistenceError::query("post references vanished"))?;
        state.posts.push(record);
        Ok(hydrated)
    }

    async fn update(
        &self,
        id: &PostId,
        changes: PostChanges,
    ) -> Result<Option<Post>, PostPersistenceError> {
        let mut state = self.write().map_err(PostPersistenceError::query)?;
        let Some(author) = state.posts.iter().find(|r| r.id == *id).map(|r| r.author) else {
            return Ok(None);
        };
        state.check_references(&author, changes.group.as_ref())?;
        let Some(record) = state.posts.iter_mut().find(|r| r.id == *id) else {
            return Ok(None);
        };
        record.text = changes.text;
        record.group = changes.group;
        if let Some(image) = changes.image {
            record.image = Some(image);
        }
        Ok(state
            .posts
            .iter()
            .find(|r| r.id == *id)
            .and_then(|r| state.hydrate(r)))
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError> {
        let mut state = self.write().map_err(PostPersistenceError::query)?;
        let before = state.posts.len();
        state.posts.retain(|r| r.id != *id);
        let removed = state.posts.len() != before;
        if removed {
            state.comments.retain(|c| c.post != *id);
        }
        Ok(removed)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let state = self.read().map_err(PostPersistenceError::query)?;
        Ok(state
            .posts
            .iter()
            .find(|r| r.id == *id)
            .and_then(|r| state.hydrate(r)))
    }

    async fn list_all(&self) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.read().map_err(PostPersistenceError::query)?;
        state.listing(|_| true)
    }

    async fn list_by_group(&self, group: &GroupId) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.read().map_err(PostPersistenceError::query)?;
        state.listing(|r| r.group.as_ref() == Some(group))
    }

    async fn list_by_author(&self, author: &UserId) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.read().map_err(PostPersistenceError::query)?;
        state.listing(|r| r.author == *author)
    }

    async fn list_by_authors(
        &self,
        authors: &[UserId],
    ) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.read().map_err(PostPersistenceError::query)?;
        state.listing(|r| authors.contains(&r.author))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut state = self.write().map_err(CommentPersistenceError::query)?;
        if !state.posts.iter().any(|r| r.id == comment.post_id) {
            return Err(CommentPersistenceError::missing_reference(format!(
                "post {}",
                comment.post_id
            )));
        }
        let author = state.users.get(&comment.author).cloned().ok_or_else(|| {
            CommentPersistenceError::missing_reference(format!("user {}", comment.author))
        })?;
        state.comments.push(CommentRecord {
            id: comment.id,
            post: comment.post_id,
            author: comment.author,
            text: comment.text.clone(),
            created_at: comment.created_at,
        });
        Ok(Comment::new(
            comment.id,
            comment.post_id,
            author,
            comment.text,
            comment.created_at,
        ))
    }

    async fn list_for_post(&self, post: &PostId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let state = self.read().map_err(CommentPersistenceError::query)?;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post == *post)
            .filter_map(|c| {
                let author = state.users.get(&c.author)?.clone();
                Some(Comment::new(c.id, c.post, author, c.text.clone(), c.created_at))
            })
            .collect();
        comments.sort_by_key(Comment::created_at);
        Ok(comments)
    }
}

#[async_trait]
impl FollowRepository for MemoryStore {
    async fn insert_if_absent(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        if follower == author {
            return Err(FollowPersistenceError::self_follow());
        }
        let mut state = self.write().map_err(FollowPersistenceError::query)?;
        Ok(state.follows.insert((*follower, *author)))
    }

    async fn delete(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let mut state = self.write().map_err(FollowPersistenceError::query)?;
        Ok(state.follows.remove(&(*follower, *author)))
    }

    async fn exists(
        &self,
        follower: &UserId,
        author: &UserId,
    ) -> Result<bool, FollowPersistenceError> {
        let state = self.read().map_err(FollowPersistenceError::query)?;
        Ok(state.follows.contains(&(*follower, *author)))
    }

    async fn followed_authors(
        &self,
        follower: &UserId,
    ) -> Result<Vec<UserId>, FollowPersistenceError> {
        let state = self.read().map_err(FollowPersistenceError::query)?;
        Ok(state
            .follows
            .iter()
            .filter(|(from, _)| from == follower)
            .map(|(_, to)| *to)
            .collect())
    }
}
