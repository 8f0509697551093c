//! Posts, the feed, and the like counter.

use chrono::Utc;

use crate::{
    client::Client,
    errors::{SocialError, ValidationError, ValidationIssue},
    id::generate_document_id,
    models::{NotificationType, PhotoMeta, Post, UserProfile},
    rules::{LikeDecision, LikeTransition, apply_like},
    session::Session,
    store::{DocumentStore, FieldOp, Filter},
    validators::is_valid_url,
};

use super::notifications::{DispatchOutcome, NotificationEvent, create_notification};

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub caption: String,
    pub photos: Vec<PhotoMeta>,
}

/// Result of [`create_post`].
#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub post: Post,
    /// Followers that received a NEW_POST notification.
    pub notified: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    Changed {
        likes: i64,
        transition: LikeTransition,
        /// Present only for `Liked`.
        notification: Option<DispatchOutcome>,
    },
    /// Membership already matched; nothing was written.
    Unchanged,
    /// The caller owns the post; nothing was written.
    Rejected,
    PostMissing,
}

/// Publishes a post, then tells each of the author's followers about it.
///
/// Fan-out is best effort: a follower whose notification cannot be written is logged and
/// skipped, and the post stays published.
pub async fn create_post<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    new_post: NewPost,
) -> Result<PublishedPost, SocialError> {
    validate_new_post(&new_post)?;

    let post = Post {
        id: generate_document_id(),
        user_id: session.user_id.clone(),
        caption: new_post.caption,
        photos: new_post.photos,
        likes: 0,
        userlikes: Vec::new(),
        bookmarked_by: Vec::new(),
        username: session.display_name.clone(),
        photo_url: session.photo_url.clone(),
        date: Utc::now(),
    };
    client.collection::<Post>().create(&post).await?;
    log::debug!("{} published post {}", session.user_id, post.id);

    let notified = notify_followers(client, session, &post.id).await;
    Ok(PublishedPost { post, notified })
}

async fn notify_followers<S: DocumentStore>(client: &Client<S>, session: &Session, post_id: &str) -> usize {
    let followers = match client.collection::<UserProfile>().get(&session.user_id).await {
        Ok(Some(author)) => author.followers,
        Ok(None) => {
            log::warn!("author {} has no profile; skipping new-post fan-out", session.user_id);
            return 0;
        }
        Err(err) => {
            log::error!("could not load followers of {}: {err}", session.user_id);
            return 0;
        }
    };

    let mut notified = 0;
    for follower_id in &followers {
        let event = NotificationEvent::from_session(NotificationType::NewPost, session, follower_id).with_post(post_id);
        if create_notification(client, event).await.is_sent() {
            notified += 1;
        }
    }
    log::debug!("post {post_id}: notified {notified} of {} follower(s)", followers.len());
    notified
}

/// Likes or unlikes a post on behalf of the caller.
///
/// Membership and counter change in one document patch: `array_union`/`array_remove` on
/// `userlikes` and `increment` on `likes`, which is assigned outright only when clamped at
/// zero. Only an absent-to-present transition notifies the author.
pub async fn toggle_like<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    post_id: &str,
    wants_like: bool,
) -> Result<LikeOutcome, SocialError> {
    let posts = client.collection::<Post>();
    let Some(post) = posts.get(post_id).await? else {
        log::warn!("cannot like missing post {post_id}");
        return Ok(LikeOutcome::PostMissing);
    };

    let (likes, transition) = match apply_like(&post, &session.user_id, wants_like) {
        LikeDecision::Rejected => {
            log::debug!("{} tried to like their own post {post_id}", session.user_id);
            return Ok(LikeOutcome::Rejected);
        }
        LikeDecision::Unchanged => return Ok(LikeOutcome::Unchanged),
        LikeDecision::Changed { likes, transition, .. } => (likes, transition),
    };

    let (delta, membership) = match transition {
        LikeTransition::Liked => (1, FieldOp::array_union("userlikes", &session.user_id)),
        LikeTransition::Unliked => (-1, FieldOp::array_remove("userlikes", &session.user_id)),
    };
    let counter = if post.likes + delta == likes {
        FieldOp::increment("likes", delta)
    } else {
        FieldOp::assign("likes", likes)
    };
    posts.update(post_id, &[counter, membership]).await?;

    let notification = match transition {
        LikeTransition::Liked => {
            let event = NotificationEvent::from_session(NotificationType::Like, session, &post.user_id).with_post(post_id);
            Some(create_notification(client, event).await)
        }
        LikeTransition::Unliked => None,
    };

    Ok(LikeOutcome::Changed {
        likes,
        transition,
        notification,
    })
}

pub async fn get_post<S: DocumentStore>(client: &Client<S>, post_id: &str) -> Result<Option<Post>, SocialError> {
    Ok(client.collection::<Post>().get(post_id).await?)
}

/// Every post, newest first.
pub async fn get_feed<S: DocumentStore>(client: &Client<S>) -> Result<Vec<Post>, SocialError> {
    let mut posts = client.collection::<Post>().find_many(&[]).await?;
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Posts by `user_id`, newest first.
pub async fn get_posts_by_user<S: DocumentStore>(client: &Client<S>, user_id: &str) -> Result<Vec<Post>, SocialError> {
    let mut posts = client
        .collection::<Post>()
        .find_many(&[Filter::eq("user_id", user_id)])
        .await?;
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(posts)
}

/// Deletes one of the caller's posts. Returns `false` for missing or foreign posts.
pub async fn delete_post<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    post_id: &str,
) -> Result<bool, SocialError> {
    let posts = client.collection::<Post>();
    match posts.get(post_id).await? {
        Some(post) if session.is(&post.user_id) => Ok(posts.delete(post_id).await?),
        Some(_) => {
            log::warn!("{} cannot delete post {post_id} they do not own", session.user_id);
            Ok(false)
        }
        None => Ok(false),
    }
}

/// Re-denormalizes the caller's display name and photo onto all of their posts.
pub async fn update_author_info_on_posts<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
) -> Result<usize, SocialError> {
    let posts = client.collection::<Post>();
    let authored = posts.find_many(&[Filter::eq("user_id", session.user_id.as_str())]).await?;
    for post in &authored {
        posts
            .update(
                &post.id,
                &[
                    FieldOp::assign("username", session.display_name.as_str()),
                    FieldOp::assign("photo_url", session.photo_url.as_str()),
                ],
            )
            .await?;
    }
    Ok(authored.len())
}

fn validate_new_post(new_post: &NewPost) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    if new_post.photos.is_empty() {
        issues.push(ValidationIssue::new("photos", "required", "a post needs at least one photo"));
    }
    for (index, photo) in new_post.photos.iter().enumerate() {
        if !is_valid_url(&photo.cdn_url) {
            issues.push(ValidationIssue::new(
                format!("photos[{index}].cdn_url"),
                "url",
                "cdn_url must be a valid URL",
            ));
        }
    }
    ValidationError::new(issues).into_result()
}
