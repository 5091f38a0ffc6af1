//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered users; rows appear on first successful login.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Administrator-managed groups.
    groups (id) {
        id -> Uuid,
        title -> Varchar,
        slug -> Varchar,
        description -> Text,
    }
}

diesel::table! {
    /// Posts. `seq` breaks ties between equal timestamps.
    posts (id) {
        id -> Uuid,
        seq -> Int8,
        author_id -> Uuid,
        text -> Text,
        group_id -> Nullable<Uuid>,
        image -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Comments; removed with their post.
    comments (id) {
        id -> Uuid,
        post_id -> Uuid,
        author_id -> Uuid,
        text -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Follow edges. The composite key keeps edges unique.
    follows (follower_id, author_id) {
        follower_id -> Uuid,
        author_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(posts -> groups (group_id));
diesel::joinable!(comments -> posts (post_id));
diesel::joinable!(comments -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, groups, posts, comments, follows);
