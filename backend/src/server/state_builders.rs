//! Builders wiring repositories and services into [`HttpState`].

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use pagination::Paginator;

use postboard::domain::ports::{
    CommentRepository, FollowRepository, GroupRepository, ImageStore, PostRepository,
    UserRepository,
};
use postboard::domain::{
    AccountDirectory, DirectoryLoginService, FeedService, FollowService, PostService,
};
use postboard::inbound::http::state::HttpState;
use postboard::outbound::media::FilesystemImageStore;
use postboard::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselFollowRepository, DieselGroupRepository,
    DieselPostRepository, DieselUserRepository,
};

use super::{ServerConfig, Storage};

/// One repository per aggregate, possibly all the same store.
struct Repositories<P, G, C, U, F> {
    posts: Arc<P>,
    groups: Arc<G>,
    comments: Arc<C>,
    users: Arc<U>,
    follows: Arc<F>,
}

impl Repositories<
    DieselPostRepository,
    DieselGroupRepository,
    DieselCommentRepository,
    DieselUserRepository,
    DieselFollowRepository,
> {
    fn postgres(pool: &DbPool) -> Self {
        Self {
            posts: Arc::new(DieselPostRepository::new(pool.clone())),
            groups: Arc::new(DieselGroupRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            follows: Arc::new(DieselFollowRepository::new(pool.clone())),
        }
    }
}

fn assemble<P, G, C, U, F, I>(
    repos: Repositories<P, G, C, U, F>,
    images: Arc<I>,
    accounts: AccountDirectory,
    paginator: Paginator,
) -> HttpState
where
    P: PostRepository + 'static,
    G: GroupRepository + 'static,
    C: CommentRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
    I: ImageStore + 'static,
{
    let Repositories {
        posts,
        groups,
        comments,
        users,
        follows,
    } = repos;

    let graph = Arc::new(FollowService::new(follows, Arc::clone(&users)));
    let feeds = FeedService::new(
        Arc::clone(&posts),
        Arc::clone(&groups),
        Arc::clone(&users),
        Arc::clone(&graph),
        paginator,
    );
    let post_service = Arc::new(PostService::new(
        posts,
        groups,
        comments,
        Arc::clone(&images),
        Arc::new(DefaultClock),
    ));

    HttpState {
        feeds: Arc::new(feeds),
        posts: post_service.clone(),
        post_query: post_service,
        follows: graph,
        login: Arc::new(DirectoryLoginService::new(accounts, users)),
        images,
    }
}

/// Build the shared HTTP state for the configured storage.
///
/// # Errors
///
/// Fails when the media directory cannot be created or opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let images = Arc::new(FilesystemImageStore::open(config.media_root.clone())?);
    let accounts = config.accounts.clone();
    let paginator = config.paginator;

    let state = match &config.storage {
        Storage::Memory(store) => assemble(
            Repositories {
                posts: Arc::clone(store),
                groups: Arc::clone(store),
                comments: Arc::clone(store),
                users: Arc::clone(store),
                follows: Arc::clone(store),
            },
            images,
            accounts,
            paginator,
        ),
        Storage::Postgres(pool) => {
            assemble(Repositories::postgres(pool), images, accounts, paginator)
        }
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use actix_web::cookie::{Key, SameSite};
    use postboard::domain::LoginCredentials;
    use postboard::domain::ports::FeedSelector;
    use postboard::outbound::cache::NoopResponseCache;
    use pagination::RequestedPage;
    use postboard::outbound::memory::MemoryStore;
    use rstest::rstest;

    use crate::server::SessionCookie;

    fn config_over(store: Arc<MemoryStore>, media: &std::path::Path) -> ServerConfig {
        let accounts = AccountDirectory::from_pairs([("alice".to_owned(), "s3cret".to_owned())])
            .expect("valid accounts");
        ServerConfig::new(
            SessionCookie {
                key: Key::generate(),
                secure: false,
                same_site: SameSite::Lax,
            },
            SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            Arc::new(NoopResponseCache::new()),
            Duration::from_secs(20),
        )
        .with_storage(Storage::Memory(store))
        .with_accounts(accounts)
        .with_media_root(media.to_path_buf())
    }

    #[rstest]
    #[tokio::test]
    async fn memory_storage_backs_login_and_feeds() {
        let media = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(MemoryStore::new());
        let state = build_http_state(&config_over(Arc::clone(&store), media.path()))
            .expect("state builds");

        let creds = LoginCredentials::try_from_parts("alice", "s3cret").expect("shape");
        let user = state.login.authenticate(&creds).await.expect("login");
        assert_eq!(user.username().as_str(), "alice");

        let username = user.username().clone();
        let found = store
            .find_by_username(&username)
            .await
            .expect("lookup")
            .expect("user registered in the shared store");
        assert_eq!(found.id(), user.id());

        let feed = state
            .feeds
            .feed(FeedSelector::All, RequestedPage::FIRST, None)
            .await
            .expect("empty feed");
        assert_eq!(feed.page.total(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_accounts_are_rejected() {
        let media = tempfile::tempdir().expect("temp dir");
        let state = build_http_state(&config_over(Arc::new(MemoryStore::new()), media.path()))
            .expect("state builds");

        let creds = LoginCredentials::try_from_parts("mallory", "guess").expect("shape");
        assert!(state.login.authenticate(&creds).await.is_err());
    }
}
