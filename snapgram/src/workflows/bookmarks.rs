//! Bookmark membership, stored on both the profile and the post.
//!
//! A toggle is two independent writes. Bookmarks never notify anyone.

use crate::{
    client::Client,
    errors::SocialError,
    models::{Post, UserProfile},
    session::Session,
    store::{DocumentStore, FieldOp, Filter},
};

/// Adds or removes `post_id` from the caller's bookmarks and returns the new state.
///
/// `currently_bookmarked` is the state the caller last saw; the toggle writes its opposite.
/// A missing profile or post leaves the state unchanged.
pub async fn toggle_bookmark<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    post_id: &str,
    currently_bookmarked: bool,
) -> Result<bool, SocialError> {
    let users = client.collection::<UserProfile>();
    let posts = client.collection::<Post>();
    if !users.exists(&session.user_id).await? {
        log::warn!("{} has no profile; bookmark not applied", session.user_id);
        return Ok(currently_bookmarked);
    }
    if !posts.exists(post_id).await? {
        log::warn!("cannot bookmark missing post {post_id}");
        return Ok(currently_bookmarked);
    }

    let (user_op, post_op) = if currently_bookmarked {
        (
            FieldOp::array_remove("bookmarks", post_id),
            FieldOp::array_remove("bookmarked_by", &session.user_id),
        )
    } else {
        (
            FieldOp::array_union("bookmarks", post_id),
            FieldOp::array_union("bookmarked_by", &session.user_id),
        )
    };
    users.update(&session.user_id, &[user_op]).await?;
    posts.update(post_id, &[post_op]).await?;

    log::debug!(
        "{} {} post {post_id}",
        session.user_id,
        if currently_bookmarked { "unbookmarked" } else { "bookmarked" }
    );
    Ok(!currently_bookmarked)
}

/// Posts bookmarked by `user_id`, newest first.
pub async fn get_bookmarked_posts<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Vec<Post>, SocialError> {
    let mut posts = client
        .collection::<Post>()
        .find_many(&[Filter::contains("bookmarked_by", user_id)])
        .await?;
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Reads membership from the profile side.
pub async fn is_post_bookmarked<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
    post_id: &str,
) -> Result<bool, SocialError> {
    Ok(client
        .collection::<UserProfile>()
        .get(user_id)
        .await?
        .is_some_and(|profile| profile.has_bookmarked(post_id)))
}
