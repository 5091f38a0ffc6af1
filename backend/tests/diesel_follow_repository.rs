//! `DieselFollowRepository` against embedded PostgreSQL: edge uniqueness
//! under repeated and concurrent follows, the self-follow guard in the
//! adapter and in the schema, and unfollow bookkeeping.

#[path = "support/pg_embed.rs"]
mod pg_embed;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types;
use pg_embed::{PgContext, pg_context};
use postboard::domain::ports::{FollowPersistenceError, FollowRepository, UserRepository};
use postboard::domain::{User, Username};
use postboard::outbound::persistence::{DieselFollowRepository, DieselUserRepository};
use rstest::{fixture, rstest};

#[fixture]
fn pg() -> Option<PgContext> {
    pg_context()
}

fn register(ctx: &PgContext, name: &str) -> User {
    let users = DieselUserRepository::new(ctx.pool.clone());
    let username = Username::new(name).expect("valid username");
    ctx.runtime
        .block_on(users.find_or_create(&username))
        .expect("user stored")
}

#[rstest]
fn repeated_follows_keep_one_edge(pg: Option<PgContext>) {
    let Some(ctx) = pg else { return };
    let alice = register(&ctx, "alice");
    let bob = register(&ctx, "bob");
    let follows = DieselFollowRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        assert!(follows.insert_if_absent(bob.id(), alice.id()).await.expect("first follow"));
        assert!(!follows.insert_if_absent(bob.id(), alice.id()).await.expect("second follow"));
        assert!(follows.exists(bob.id(), alice.id()).await.expect("lookup"));
        assert!(!follows.exists(alice.id(), bob.id()).await.expect("reverse lookup"));
        assert_eq!(
            follows.followed_authors(bob.id()).await.expect("authors"),
            vec![*alice.id()]
        );
    });
}

#[rstest]
fn concurrent_follows_create_a_single_edge(pg: Option<PgContext>) {
    let Some(ctx) = pg else { return };
    let alice = register(&ctx, "alice");
    let bob = register(&ctx, "bob");
    let follows = DieselFollowRepository::new(ctx.pool.clone());

    let outcomes = ctx.runtime.block_on(async {
        let (first, second) = tokio::join!(
            follows.insert_if_absent(bob.id(), alice.id()),
            follows.insert_if_absent(bob.id(), alice.id()),
        );
        [first.expect("first follow"), second.expect("second follow")]
    });

    assert_eq!(outcomes.iter().filter(|created| **created).count(), 1);
    let authors = ctx
        .runtime
        .block_on(follows.followed_authors(bob.id()))
        .expect("authors");
    assert_eq!(authors.len(), 1);
}

#[rstest]
fn self_follows_are_refused(pg: Option<PgContext>) {
    let Some(ctx) = pg else { return };
    let alice = register(&ctx, "alice");
    let follows = DieselFollowRepository::new(ctx.pool.clone());

    let outcome = ctx
        .runtime
        .block_on(follows.insert_if_absent(alice.id(), alice.id()));
    assert_eq!(outcome, Err(FollowPersistenceError::self_follow()));
    assert!(
        ctx.runtime
            .block_on(follows.followed_authors(alice.id()))
            .expect("authors")
            .is_empty()
    );
}

#[rstest]
fn schema_rejects_self_edges_written_directly(pg: Option<PgContext>) {
    let Some(ctx) = pg else { return };
    let alice = register(&ctx, "alice");

    let mut conn = PgConnection::establish(&ctx.url).expect("sync connection");
    let outcome = diesel::sql_query("INSERT INTO follows (follower_id, author_id) VALUES ($1, $1)")
        .bind::<sql_types::Uuid, _>(*alice.id().as_uuid())
        .execute(&mut conn);

    assert!(
        matches!(
            outcome,
            Err(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _))
        ),
        "unexpected outcome: {outcome:?}"
    );
}

#[rstest]
fn unfollow_reports_missing_edges(pg: Option<PgContext>) {
    let Some(ctx) = pg else { return };
    let alice = register(&ctx, "alice");
    let bob = register(&ctx, "bob");
    let follows = DieselFollowRepository::new(ctx.pool.clone());

    ctx.runtime.block_on(async {
        follows.insert_if_absent(bob.id(), alice.id()).await.expect("follow");
        assert!(follows.delete(bob.id(), alice.id()).await.expect("first unfollow"));
        assert!(!follows.delete(bob.id(), alice.id()).await.expect("second unfollow"));
        assert!(!follows.exists(bob.id(), alice.id()).await.expect("lookup"));
    });
}
