//! Development database rebuild and smoke check
//!
//! `rebuild` drops and recreates every table, then seeds a few users and
//! tagged posts. `check` reads everything back through the repositories.

use sqlx::PgPool;

use super::{schema, DbError, NewPost, NewUser, PostRepo, TagRepo, UserRepo};

/// Tag every seeded post shares; `check` lists posts through it.
pub const SEED_TAG: &str = "#happy";

struct SeedUser {
    username: &'static str,
    password: &'static str,
    name: &'static str,
    location: &'static str,
}

struct SeedPost {
    author: &'static str,
    title: &'static str,
    content: &'static str,
    tags: &'static [&'static str],
}

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "albert",
        password: "bertie99",
        name: "Al Bert",
        location: "Sidney, Australia",
    },
    SeedUser {
        username: "sandra",
        password: "2sandy4me",
        name: "Just Sandra",
        location: "Ain't tellin'",
    },
    SeedUser {
        username: "glamgal",
        password: "soglam",
        name: "Joshua",
        location: "Upper East Side",
    },
];

const POSTS: &[SeedPost] = &[
    SeedPost {
        author: "albert",
        title: "First Post",
        content: "This is my first post. I hope I love writing blogs as much as I love writing them.",
        tags: &["#happy", "#youcandoanything"],
    },
    SeedPost {
        author: "sandra",
        title: "How does this work?",
        content: "Seriously, does this even do anything?",
        tags: &["#happy", "#worst-day-ever"],
    },
    SeedPost {
        author: "glamgal",
        title: "Living the Glam Life",
        content: "Do you even? I swear that half of you are posing.",
        tags: &["#happy", "#youcandoanything", "#canmandoeverything"],
    },
];

/// Counts of what `rebuild` created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub posts: usize,
}

/// Drop all tables, recreate them, and seed initial users and posts.
pub async fn rebuild(pool: &PgPool) -> Result<SeedSummary, DbError> {
    schema::drop_tables(pool).await?;
    schema::create_tables(pool).await?;

    let users = create_initial_users(pool).await?;
    let posts = create_initial_posts(pool).await?;

    Ok(SeedSummary { users, posts })
}

async fn create_initial_users(pool: &PgPool) -> Result<usize, DbError> {
    tracing::info!("Creating users...");
    let repo = UserRepo::new(pool);
    let mut created = 0;

    for seed in USERS {
        let user = repo
            .create_user(NewUser {
                username: seed.username.to_owned(),
                password: seed.password.to_owned(),
                name: seed.name.to_owned(),
                location: seed.location.to_owned(),
            })
            .await?;

        if let Some(user) = user {
            tracing::debug!(id = user.id, username = %user.username, "user created");
            created += 1;
        }
    }

    tracing::info!(created, "Finished creating users");
    Ok(created)
}

async fn create_initial_posts(pool: &PgPool) -> Result<usize, DbError> {
    tracing::info!("Creating posts...");
    let users = UserRepo::new(pool);
    let posts = PostRepo::new(pool);
    let mut created = 0;

    for seed in POSTS {
        let Some(author) = users.get_user_by_username(seed.author).await? else {
            tracing::warn!(author = seed.author, "seed author missing, skipping post");
            continue;
        };

        let post = posts
            .create_post(NewPost {
                author_id: author.id,
                title: seed.title.to_owned(),
                content: seed.content.to_owned(),
                tags: seed.tags.iter().map(|t| (*t).to_owned()).collect(),
            })
            .await?;

        tracing::debug!(id = post.id, title = %post.title, tags = post.tags.len(), "post created");
        created += 1;
    }

    tracing::info!(created, "Finished creating posts");
    Ok(created)
}

/// Counts of what `check` read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckSummary {
    pub users: usize,
    pub posts: usize,
    pub tags: usize,
    pub posts_with_seed_tag: usize,
}

/// Read users, posts and tags back through the repositories.
pub async fn check(pool: &PgPool) -> Result<CheckSummary, DbError> {
    tracing::info!("Testing database...");

    let user_repo = UserRepo::new(pool);
    let users = user_repo.list_users().await?;
    tracing::info!(count = users.len(), "list_users");

    if let Some(first) = users.first() {
        if let Some(found) = user_repo.get_user_by_id(first.id).await? {
            tracing::info!(
                id = found.user.id,
                posts = found.posts.len(),
                "get_user_by_id"
            );
        }
    }

    let posts = PostRepo::new(pool).get_all_posts().await?;
    tracing::info!(count = posts.len(), "get_all_posts");

    let tag_repo = TagRepo::new(pool);
    let tags = tag_repo.get_all_tags().await?;
    tracing::info!(count = tags.len(), "get_all_tags");

    let tagged = tag_repo.get_posts_by_tag_name(SEED_TAG).await?;
    tracing::info!(tag = SEED_TAG, count = tagged.len(), "get_posts_by_tag_name");

    tracing::info!("Finished database tests");
    Ok(CheckSummary {
        users: users.len(),
        posts: posts.len(),
        tags: tags.len(),
        posts_with_seed_tag: tagged.len(),
    })
}
