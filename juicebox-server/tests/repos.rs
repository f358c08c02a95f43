//! Repository behavior against a real database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p juicebox-server -- --ignored

mod common;

use std::collections::BTreeSet;

use juicebox_server::db::{
    DbError, NewPost, Post, PostRepo, PostUpdate, TagRepo, UserRepo, UserUpdate,
};
use juicebox_server::visibility::visible_posts;

fn tag_names(post: &Post) -> BTreeSet<String> {
    post.tags.iter().map(|t| t.name.clone()).collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

fn set(list: &[&str]) -> BTreeSet<String> {
    names(list).into_iter().collect()
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_tag_twice_returns_same_id() {
    let pool = common::test_pool().await;
    let repo = TagRepo::new(&pool);

    let first = repo.create_tags(&names(&["#happy"])).await.unwrap();
    let second = repo.create_tags(&names(&["#happy", "#new"])).await.unwrap();

    assert_eq!(first.len(), 1);
    let happy = second.iter().find(|t| t.name == "#happy").unwrap();
    assert_eq!(happy.id, first[0].id);
    assert_eq!(repo.get_all_tags().await.unwrap().len(), 2);

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_names_in_one_call_collapse() {
    let pool = common::test_pool().await;
    let tags = TagRepo::new(&pool)
        .create_tags(&names(&["#dup", "#dup"]))
        .await
        .unwrap();

    assert_eq!(tags.len(), 1);

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_post_round_trip() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "albert").await;
    let repo = PostRepo::new(&pool);

    let created = repo
        .create_post(NewPost {
            author_id: author.id,
            title: "T".into(),
            content: "C".into(),
            tags: names(&["x", "y"]),
        })
        .await
        .unwrap();

    let fetched = repo.get_post_by_id(created.id).await.unwrap();
    assert_eq!(tag_names(&fetched), set(&["x", "y"]));
    assert_eq!(fetched.author.id, author.id);
    assert_eq!(fetched.author.username, author.username);
    assert_eq!(fetched.author.name, author.name);
    assert_eq!(fetched.author.location, author.location);
    assert!(fetched.active);

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn create_post_without_tags() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "sandra").await;

    let post = PostRepo::new(&pool)
        .create_post(NewPost {
            author_id: author.id,
            title: "Untagged".into(),
            content: "Nothing here".into(),
            tags: Vec::new(),
        })
        .await
        .unwrap();

    assert!(post.tags.is_empty());

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_post_is_an_error_missing_user_is_none() {
    let pool = common::test_pool().await;

    let err = PostRepo::new(&pool).get_post_by_id(9999).await.unwrap_err();
    assert!(matches!(err, DbError::PostNotFound { post_id: 9999 }));

    let user = UserRepo::new(&pool).get_user_by_id(9999).await.unwrap();
    assert!(user.is_none());

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn add_no_tags_leaves_associations() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "glamgal").await;
    let post = PostRepo::new(&pool)
        .create_post(NewPost {
            author_id: author.id,
            title: "Living the Glam Life".into(),
            content: "Do you even?".into(),
            tags: names(&["#glam"]),
        })
        .await
        .unwrap();

    let tag_repo = TagRepo::new(&pool);
    assert!(tag_repo.create_tags(&[]).await.unwrap().is_empty());
    let after = tag_repo.add_tags_to_post(post.id, &[]).await.unwrap();

    assert_eq!(tag_names(&after), tag_names(&post));

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn re_adding_a_tag_is_a_no_op() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "albert").await;
    let post = PostRepo::new(&pool)
        .create_post(NewPost {
            author_id: author.id,
            title: "First Post".into(),
            content: "Hello".into(),
            tags: names(&["#happy"]),
        })
        .await
        .unwrap();

    let tag_repo = TagRepo::new(&pool);
    let again = tag_repo.add_tags_to_post(post.id, &post.tags).await.unwrap();
    assert_eq!(again.tags.len(), 1);

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_without_changes_returns_post_unchanged() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "albert").await;
    let repo = PostRepo::new(&pool);
    let post = repo
        .create_post(NewPost {
            author_id: author.id,
            title: "Same".into(),
            content: "Same".into(),
            tags: names(&["#a", "#b"]),
        })
        .await
        .unwrap();

    let updated = repo
        .update_post(post.id, PostUpdate::default(), None)
        .await
        .unwrap();

    assert_eq!(updated.title, post.title);
    assert_eq!(updated.content, post.content);
    assert_eq!(updated.active, post.active);
    assert_eq!(tag_names(&updated), tag_names(&post));

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_with_empty_tags_clears_them() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "albert").await;
    let repo = PostRepo::new(&pool);
    let post = repo
        .create_post(NewPost {
            author_id: author.id,
            title: "Tagged".into(),
            content: "Body".into(),
            tags: names(&["#a", "#b"]),
        })
        .await
        .unwrap();

    let updated = repo
        .update_post(post.id, PostUpdate::default(), Some(Vec::new()))
        .await
        .unwrap();

    assert!(updated.tags.is_empty());
    // Tags themselves survive
    assert_eq!(TagRepo::new(&pool).get_all_tags().await.unwrap().len(), 2);

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_replaces_tag_set_and_fields() {
    let pool = common::test_pool().await;
    let author = common::create_user(&pool, "sandra").await;
    let repo = PostRepo::new(&pool);
    let post = repo
        .create_post(NewPost {
            author_id: author.id,
            title: "How does this work?".into(),
            content: "Seriously".into(),
            tags: names(&["#happy", "#worst-day-ever"]),
        })
        .await
        .unwrap();

    let updated = repo
        .update_post(
            post.id,
            PostUpdate {
                title: Some("New Title".into()),
                ..Default::default()
            },
            Some(names(&["#youcandoanything", "#redfish", "#happy"])),
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "New Title");
    assert_eq!(updated.content, "Seriously");
    assert_eq!(
        tag_names(&updated),
        set(&["#happy", "#redfish", "#youcandoanything"])
    );

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_missing_post_is_not_found() {
    let pool = common::test_pool().await;
    let err = PostRepo::new(&pool)
        .update_post(404, PostUpdate::default(), Some(names(&["#x"])))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::PostNotFound { post_id: 404 }));

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn posts_by_tag_name_and_visibility() {
    let pool = common::test_pool().await;
    let albert = common::create_user(&pool, "albert").await;
    let sandra = common::create_user(&pool, "sandra").await;
    let repo = PostRepo::new(&pool);

    let mut ids = Vec::new();
    for (author, title) in [(albert.id, "a1"), (albert.id, "a2"), (sandra.id, "s1")] {
        let post = repo
            .create_post(NewPost {
                author_id: author,
                title: title.into(),
                content: String::new(),
                tags: names(&["#happy"]),
            })
            .await
            .unwrap();
        ids.push(post.id);
    }
    repo.update_post(
        ids[1],
        PostUpdate {
            active: Some(false),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let tag_repo = TagRepo::new(&pool);
    let tagged = tag_repo.get_posts_by_tag_name("#happy").await.unwrap();
    assert_eq!(tagged.len(), 3);

    let mine: Vec<i32> = visible_posts(tagged.clone(), Some(albert.id))
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(mine, vec![ids[0]]);

    let mut anonymous: Vec<i32> = visible_posts(tagged, None).iter().map(|p| p.id).collect();
    anonymous.sort();
    assert_eq!(anonymous, vec![ids[0], ids[2]]);

    assert!(tag_repo.get_posts_by_tag_name("#nope").await.unwrap().is_empty());

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn users_are_listed_without_credentials() {
    let pool = common::test_pool().await;
    let albert = common::create_user(&pool, "albert").await;
    let repo = UserRepo::new(&pool);

    let users = repo.list_users().await.unwrap();
    assert_eq!(users, vec![albert.clone()]);

    let json = serde_json::to_value(&users).unwrap();
    assert!(json[0].get("password").is_none());

    let record = repo.get_user_by_username("albert").await.unwrap().unwrap();
    assert_eq!(record.password, "albert-secret");

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_username_returns_none() {
    let pool = common::test_pool().await;
    common::create_user(&pool, "albert").await;

    let again = UserRepo::new(&pool)
        .create_user(juicebox_server::db::NewUser {
            username: "albert".into(),
            password: "other".into(),
            name: "Other".into(),
            location: "Elsewhere".into(),
        })
        .await
        .unwrap();

    assert!(again.is_none());

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn update_user_fields() {
    let pool = common::test_pool().await;
    let albert = common::create_user(&pool, "albert").await;
    let repo = UserRepo::new(&pool);

    assert!(repo
        .update_user(albert.id, UserUpdate::default())
        .await
        .unwrap()
        .is_none());

    let updated = repo
        .update_user(
            albert.id,
            UserUpdate {
                name: Some("Newname Sogood".into()),
                location: Some("Lesterville, KY".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Newname Sogood");
    assert_eq!(updated.location, "Lesterville, KY");
    assert_eq!(updated.username, "albert");

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn user_by_id_includes_enriched_posts() {
    let pool = common::test_pool().await;
    let albert = common::create_user(&pool, "albert").await;
    PostRepo::new(&pool)
        .create_post(NewPost {
            author_id: albert.id,
            title: "Mine".into(),
            content: "Body".into(),
            tags: names(&["#me"]),
        })
        .await
        .unwrap();

    let found = UserRepo::new(&pool)
        .get_user_by_id(albert.id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.user, albert);
    assert_eq!(found.posts.len(), 1);
    assert_eq!(found.posts[0].author.id, albert.id);
    assert_eq!(tag_names(&found.posts[0]), set(&["#me"]));

    common::teardown(pool).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn teardown_drops_the_test_schema() {
    let pool = common::test_pool().await;
    let schema_name = common::schema_name(&pool).await;
    assert!(schema_name.starts_with(common::SCHEMA_PREFIX));

    common::teardown(pool).await;

    let url = std::env::var("DATABASE_URL").unwrap();
    let admin = sqlx::PgPool::connect(&url).await.unwrap();
    let still_there: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM pg_namespace WHERE nspname = $1)",
    )
    .bind(&schema_name)
    .fetch_one(&admin)
    .await
    .unwrap();
    admin.close().await;

    assert!(!still_there);
}
