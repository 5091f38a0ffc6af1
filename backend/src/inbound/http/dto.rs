//! JSON views rendered by the HTTP handlers.
//!
//! Feed responses look like:
//!
//! ```json
//! {
//!   "context": { "kind": "profile", "author": {...}, "following": true, "postCount": 13 },
//!   "items": [ { "id": "...", "text": "...", "excerpt": "...", ... } ],
//!   "page": { "number": 2, "numPages": 2, "perPage": 10, "total": 13, ... },
//!   "links": { "self": "/api/v1/profiles/alice?page=2", "prev": "/api/v1/profiles/alice?page=1" }
//! }
//! ```

use chrono::{DateTime, Utc};
use pagination::{Page, PageLinks};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{FeedContext, FeedPage, PostDetail};
use crate::domain::{Comment, Group, ImageRef, Post, User};

/// Public path prefix under which stored images are served.
pub const MEDIA_PREFIX: &str = "/media";

/// A user as shown next to their posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable identifier.
    pub id: Uuid,
    /// Unique handle.
    #[schema(example = "alice")]
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().to_string(),
        }
    }
}

/// A topical group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    /// Stable identifier.
    pub id: Uuid,
    /// Display title.
    #[schema(example = "Cats")]
    pub title: String,
    /// URL slug.
    #[schema(example = "cats")]
    pub slug: String,
    /// Free-form description.
    pub description: String,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        Self {
            id: *group.id().as_uuid(),
            title: group.title().as_str().to_owned(),
            slug: group.slug().as_str().to_owned(),
            description: group.description().to_owned(),
        }
    }
}

/// An attached image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    /// Storage reference.
    #[schema(example = "posts/cat.gif")]
    pub reference: String,
    /// Stored file name.
    #[schema(example = "cat.gif")]
    pub filename: String,
    /// Where the image is served.
    #[schema(example = "/media/posts/cat.gif")]
    pub url: String,
}

impl From<&ImageRef> for ImageView {
    fn from(image: &ImageRef) -> Self {
        Self {
            reference: image.as_str().to_owned(),
            filename: image.filename().to_owned(),
            url: format!("{MEDIA_PREFIX}/{}", image.as_str()),
        }
    }
}

/// A post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    /// Stable identifier.
    pub id: Uuid,
    /// Who wrote it.
    pub author: UserView,
    /// Full text.
    pub text: String,
    /// First characters of the text.
    pub excerpt: String,
    /// Group it was posted in.
    pub group: Option<GroupView>,
    /// Attached image.
    pub image: Option<ImageView>,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: *post.id().as_uuid(),
            author: post.author().into(),
            text: post.text().as_str().to_owned(),
            excerpt: post.text().excerpt(),
            group: post.group().map(GroupView::from),
            image: post.image().map(ImageView::from),
            created_at: post.created_at(),
        }
    }
}

/// A comment under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    /// Stable identifier.
    pub id: Uuid,
    /// Who wrote it.
    pub author: UserView,
    /// Comment text.
    pub text: String,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: *comment.id().as_uuid(),
            author: comment.author().into(),
            text: comment.text().as_str().to_owned(),
            created_at: comment.created_at(),
        }
    }
}

/// Position of a page within its listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Page served, after clamping.
    pub number: usize,
    /// Number of pages; at least one.
    pub num_pages: usize,
    /// Page size.
    pub per_page: usize,
    /// Items across all pages.
    pub total: usize,
    /// Whether a previous page exists.
    pub has_previous: bool,
    /// Whether a next page exists.
    pub has_next: bool,
}

impl<T> From<&Page<T>> for PageMeta {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number().get(),
            num_pages: page.num_pages().get(),
            per_page: page.per_page().get(),
            total: page.total(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
        }
    }
}

/// Navigation links for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LinksView {
    /// The page served.
    #[serde(rename = "self")]
    pub self_link: String,
    /// The preceding page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// The following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl From<PageLinks> for LinksView {
    fn from(links: PageLinks) -> Self {
        Self {
            self_link: links.self_link,
            prev: links.prev,
            next: links.next,
        }
    }
}

/// What a feed page is a listing of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedContextView {
    /// Every post.
    Index,
    /// One group's posts.
    Group {
        /// The group.
        group: GroupView,
    },
    /// One author's posts.
    Profile {
        /// The author.
        author: UserView,
        /// Whether the viewer follows the author.
        following: bool,
        /// The author's post count.
        #[serde(rename = "postCount")]
        post_count: usize,
    },
    /// Posts by authors the viewer follows.
    Follow,
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    /// What is being listed.
    pub context: FeedContextView,
    /// Posts on this page, newest first.
    pub items: Vec<PostView>,
    /// Page position.
    pub page: PageMeta,
    /// Navigation links.
    pub links: LinksView,
}

impl FeedResponse {
    /// Render `feed` as served at `path` with the raw `query` string.
    #[must_use]
    pub fn render(feed: &FeedPage, path: &str, query: &str) -> Self {
        let page = &feed.page;
        let context = match &feed.context {
            FeedContext::All => FeedContextView::Index,
            FeedContext::Group(group) => FeedContextView::Group {
                group: group.into(),
            },
            FeedContext::Author { author, following } => FeedContextView::Profile {
                author: author.into(),
                following: *following,
                post_count: page.total(),
            },
            FeedContext::Followed => FeedContextView::Follow,
        };
        Self {
            context,
            items: page.items().iter().map(PostView::from).collect(),
            page: page.into(),
            links: PageLinks::for_page(path, query, page).into(),
        }
    }
}

/// A post with its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailView {
    /// The post.
    pub post: PostView,
    /// Comments, oldest first.
    pub comments: Vec<CommentView>,
    /// Number of comments.
    pub comment_count: usize,
    /// Number of posts by the same author.
    pub author_post_count: usize,
}

impl From<&PostDetail> for PostDetailView {
    fn from(detail: &PostDetail) -> Self {
        Self {
            post: (&detail.post).into(),
            comments: detail.comments.iter().map(CommentView::from).collect(),
            comment_count: detail.comments.len(),
            author_post_count: detail.author_post_count,
        }
    }
}

/// Current values of a post, for prefilling its edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostFormView {
    /// Post being edited.
    pub post_id: Uuid,
    /// Current text.
    pub text: String,
    /// Current group slug.
    pub group: Option<String>,
    /// Current image.
    pub image: Option<ImageView>,
    /// Groups the post may be moved to.
    pub groups: Vec<GroupView>,
}

impl PostFormView {
    /// Prefill from `post`, offering `groups` as choices.
    #[must_use]
    pub fn prefill(post: &Post, groups: &[Group]) -> Self {
        Self {
            post_id: *post.id().as_uuid(),
            text: post.text().as_str().to_owned(),
            group: post.group().map(|group| group.slug().as_str().to_owned()),
            image: post.image().map(ImageView::from),
            groups: groups.iter().map(GroupView::from).collect(),
        }
    }
}

/// The group catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupsResponse {
    /// Groups ordered by title.
    pub groups: Vec<GroupView>,
}

/// Body of `POST /api/v1/posts/{id}/comments`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CommentRequest {
    /// Comment text.
    #[schema(example = "Nice cat!")]
    pub text: String,
}

/// Body of `POST /api/v1/login`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    /// Account name.
    #[schema(example = "alice")]
    pub username: String,
    /// Account password.
    pub password: String,
}

/// `?next=` on the login endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
    /// Where to go after logging in.
    pub next: Option<String>,
}

/// `?page=` on paged listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Raw page number; anything unparsable means the first page.
    pub page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GroupId, GroupSlug, GroupTitle, PostId, PostText, UserId, Username};
    use pagination::{Paginator, RequestedPage};
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    fn user(name: &str) -> User {
        User::new(UserId::random(), Username::new(name).expect("valid username"))
    }

    fn group() -> Group {
        Group::new(
            GroupId::random(),
            GroupTitle::new("Cats").expect("title"),
            GroupSlug::new("cats").expect("slug"),
            "All about cats".to_owned(),
        )
    }

    fn post(author: &User, text: &str, group: Option<Group>) -> Post {
        Post::new(
            PostId::random(),
            author.clone(),
            PostText::new(text).expect("text"),
            group,
            Some(ImageRef::in_posts_dir("cat.gif")),
            Utc::now(),
        )
    }

    #[fixture]
    fn target() -> (&'static str, &'static str) {
        ("/api/v1/profiles/alice", "page=7&sort=new")
    }

    #[rstest]
    fn posts_expose_excerpt_and_media_url() {
        let alice = user("alice");
        let view = PostView::from(&post(&alice, "Sixteen chars!!! and more", Some(group())));
        let json = serde_json::to_value(&view).expect("serialises");
        assert_eq!(json["excerpt"], "Sixteen chars!!");
        assert_eq!(json["image"]["url"], "/media/posts/cat.gif");
        assert_eq!(json["image"]["filename"], "cat.gif");
        assert_eq!(json["group"]["slug"], "cats");
        assert_eq!(json["author"]["username"], "alice");
    }

    #[rstest]
    fn profile_feeds_report_following_and_count(target: (&'static str, &'static str)) {
        let alice = user("alice");
        let posts: Vec<Post> = (0..13).map(|i| post(&alice, &format!("post {i}"), None)).collect();
        let page = Paginator::try_new(10)
            .expect("page size")
            .page(posts, RequestedPage::new(7));
        let feed = FeedPage {
            context: FeedContext::Author {
                author: alice,
                following: true,
            },
            page,
        };

        let json: Value =
            serde_json::to_value(FeedResponse::render(&feed, target.0, target.1)).expect("serialises");

        assert_eq!(json["context"]["kind"], "profile");
        assert_eq!(json["context"]["following"], true);
        assert_eq!(json["context"]["postCount"], 13);
        assert_eq!(json["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(
            json["page"],
            json!({
                "number": 2, "numPages": 2, "perPage": 10, "total": 13,
                "hasPrevious": true, "hasNext": false,
            })
        );
        assert_eq!(
            json["links"]["self"],
            "/api/v1/profiles/alice?sort=new&page=2"
        );
        assert_eq!(
            json["links"]["prev"],
            "/api/v1/profiles/alice?sort=new&page=1"
        );
        assert!(json["links"].get("next").is_none());
    }

    #[rstest]
    fn empty_index_renders_first_page(target: (&'static str, &'static str)) {
        let page = Paginator::try_new(10)
            .expect("page size")
            .page(Vec::<Post>::new(), RequestedPage::FIRST);
        let feed = FeedPage {
            context: FeedContext::All,
            page,
        };
        let view = FeedResponse::render(&feed, target.0, target.1);
        assert_eq!(view.context, FeedContextView::Index);
        assert!(view.items.is_empty());
        assert_eq!(view.page.number, 1);
        assert!(!view.page.has_next);
    }
}
