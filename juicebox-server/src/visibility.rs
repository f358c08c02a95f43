//! Who gets to see which posts in a listing.
//!
//! Anonymous requesters see every active post. An authenticated requester
//! sees only their own active posts; other authors' posts and inactive posts
//! are dropped for them.

use crate::db::Post;

/// Whether `post` belongs in a listing for `requester`.
pub fn is_visible(post: &Post, requester: Option<i32>) -> bool {
    match requester {
        Some(user_id) => post.active && post.author.id == user_id,
        None => post.active,
    }
}

/// Keep the posts `requester` may see, preserving order.
pub fn visible_posts(posts: Vec<Post>, requester: Option<i32>) -> Vec<Post> {
    posts
        .into_iter()
        .filter(|post| is_visible(post, requester))
        .collect()
}
