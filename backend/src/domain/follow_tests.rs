//! Tests for the follow graph service.

use std::sync::Arc;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    FollowPersistenceError, MockFollowRepository, MockUserRepository,
};
use mockall::predicate::eq;
use rstest::rstest;

fn user(name: &str) -> User {
    User::new(UserId::random(), Username::new(name).expect("valid username"))
}

fn users_knowing(known: Vec<User>) -> MockUserRepository {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_username()
        .returning(move |name| Ok(known.iter().find(|u| u.username() == name).cloned()));
    users
}

fn service(
    follows: MockFollowRepository,
    users: MockUserRepository,
) -> FollowService<MockFollowRepository, MockUserRepository> {
    FollowService::new(Arc::new(follows), Arc::new(users))
}

#[rstest]
#[case(true, FollowOutcome::Created)]
#[case(false, FollowOutcome::AlreadyFollowing)]
#[tokio::test]
async fn follow_reports_whether_an_edge_was_created(
    #[case] inserted: bool,
    #[case] expected: FollowOutcome,
) {
    let reader = user("reader");
    let author = user("author");
    let mut follows = MockFollowRepository::new();
    follows
        .expect_insert_if_absent()
        .with(eq(*reader.id()), eq(*author.id()))
        .times(1)
        .return_once(move |_, _| Ok(inserted));

    let svc = service(follows, users_knowing(vec![reader.clone(), author]));
    let outcome = svc
        .follow(*reader.id(), "author".to_owned())
        .await
        .expect("follow succeeds");
    assert_eq!(outcome, expected);
}

#[tokio::test]
async fn following_yourself_touches_nothing() {
    let reader = user("reader");
    let mut follows = MockFollowRepository::new();
    follows.expect_insert_if_absent().never();

    let svc = service(follows, users_knowing(vec![reader.clone()]));
    let outcome = svc
        .follow(*reader.id(), "reader".to_owned())
        .await
        .expect("self-follow is not an error");
    assert_eq!(outcome, FollowOutcome::SelfIgnored);
}

#[rstest]
#[case("nobody")]
#[case("not a username")]
#[tokio::test]
async fn following_unknown_authors_is_not_found(#[case] target: &str) {
    let mut follows = MockFollowRepository::new();
    follows.expect_insert_if_absent().never();

    let svc = service(follows, users_knowing(Vec::new()));
    let err = svc
        .follow(UserId::random(), target.to_owned())
        .await
        .expect_err("unknown author");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unfollowing_a_missing_edge_is_not_found() {
    let author = user("author");
    let mut follows = MockFollowRepository::new();
    follows.expect_delete().times(1).return_once(|_, _| Ok(false));

    let svc = service(follows, users_knowing(vec![author]));
    let err = svc
        .unfollow(UserId::random(), "author".to_owned())
        .await
        .expect_err("no edge");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unfollowing_an_existing_edge_succeeds() {
    let author = user("author");
    let mut follows = MockFollowRepository::new();
    follows.expect_delete().times(1).return_once(|_, _| Ok(true));

    let svc = service(follows, users_knowing(vec![author]));
    svc.unfollow(UserId::random(), "author".to_owned())
        .await
        .expect("edge removed");
}

#[tokio::test]
async fn nobody_follows_themselves() {
    let mut follows = MockFollowRepository::new();
    follows.expect_exists().never();
    let me = UserId::random();

    let svc = service(follows, MockUserRepository::new());
    assert!(!svc.is_following(me, me).await.expect("lookup succeeds"));
}

#[tokio::test]
async fn store_outages_surface_as_unavailable() {
    let mut follows = MockFollowRepository::new();
    follows
        .expect_exists()
        .return_once(|_, _| Err(FollowPersistenceError::connection("refused")));

    let svc = service(follows, MockUserRepository::new());
    let err = svc
        .is_following(UserId::random(), UserId::random())
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn followed_authors_are_resolved_and_sorted() {
    let zed = user("zed");
    let amy = user("amy");
    let ids = vec![*zed.id(), *amy.id()];
    let resolved = vec![zed.clone(), amy.clone()];

    let mut follows = MockFollowRepository::new();
    follows
        .expect_followed_authors()
        .return_once(move |_| Ok(ids));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_ids()
        .return_once(move |_| Ok(resolved));

    let svc = service(follows, users);
    let authors = svc
        .followed_authors(UserId::random())
        .await
        .expect("lookup succeeds");
    assert_eq!(authors, vec![amy, zed]);
}
