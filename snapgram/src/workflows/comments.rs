//! Comments on posts.

use chrono::Utc;

use crate::{
    client::Client,
    errors::{SocialError, ValidationError},
    id::generate_document_id,
    models::{Comment, NotificationType, Post},
    session::Session,
    store::{DocumentStore, Filter},
};

use super::notifications::{DispatchOutcome, NotificationEvent, create_notification};

#[derive(Debug, Clone)]
pub struct PostedComment {
    pub comment: Comment,
    pub notification: DispatchOutcome,
}

/// Comments on a post and notifies its author. Returns `None` when the post does not exist.
pub async fn create_comment<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    post_id: &str,
    text: &str,
) -> Result<Option<PostedComment>, SocialError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::single("text", "required", "comment text cannot be empty").into());
    }

    let Some(post) = client.collection::<Post>().get(post_id).await? else {
        log::warn!("{} cannot comment on missing post {post_id}", session.user_id);
        return Ok(None);
    };

    let comment = Comment {
        id: generate_document_id(),
        post_id: post.id.clone(),
        user_id: session.user_id.clone(),
        username: session.display_name.clone(),
        user_photo_url: session.photo_url.clone(),
        text: text.to_string(),
        date: Utc::now(),
    };
    client.collection::<Comment>().create(&comment).await?;

    let event = NotificationEvent::from_session(NotificationType::Comment, session, &post.user_id).with_post(&post.id);
    let notification = create_notification(client, event).await;
    Ok(Some(PostedComment { comment, notification }))
}

/// Comments on `post_id`, newest first.
pub async fn get_comments_by_post<S: DocumentStore>(
    client: &Client<S>,
    post_id: &str,
) -> Result<Vec<Comment>, SocialError> {
    let mut comments = client
        .collection::<Comment>()
        .find_many(&[Filter::eq("post_id", post_id)])
        .await?;
    comments.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(comments)
}
