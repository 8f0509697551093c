//! Notification gating, dispatch, and the read side of the notification feed.

use std::cmp::Ordering;

use chrono::Utc;

use crate::{
    client::{Client, Subscription},
    errors::SocialError,
    id::generate_document_id,
    models::{Notification, NotificationSettings, NotificationType, UserProfile},
    rules::{is_self_action, should_notify},
    session::Session,
    store::{DocumentStore, FieldOp, Filter},
};

/// An interaction that may produce a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub kind: NotificationType,
    pub sender_id: String,
    pub receiver_id: String,
    pub post_id: Option<String>,
    pub sender_name: String,
    pub sender_photo: String,
    pub message: String,
}

impl NotificationEvent {
    /// An event sent by the session's user, carrying the default message for `kind`.
    pub fn from_session(kind: NotificationType, session: &Session, receiver_id: &str) -> Self {
        Self {
            kind,
            sender_id: session.user_id.clone(),
            receiver_id: receiver_id.to_string(),
            post_id: None,
            sender_name: session.display_name.clone(),
            sender_photo: session.photo_url.clone(),
            message: kind.default_message().to_string(),
        }
    }

    pub fn with_post(mut self, post_id: &str) -> Self {
        self.post_id = Some(post_id.to_string());
        self
    }
}

/// What happened to a dispatched event. Dispatch itself never returns an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A record was written with this id.
    Sent(String),
    /// The receiver's settings turned this category off.
    Suppressed,
    SelfAction,
    ReceiverMissing,
    /// The store failed; the failure was logged.
    Failed,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent(_))
    }
}

/// Gates `event` against the receiver's stored settings and writes an unread record.
pub async fn create_notification<S: DocumentStore>(client: &Client<S>, event: NotificationEvent) -> DispatchOutcome {
    if is_self_action(&event.sender_id, &event.receiver_id) {
        log::debug!("skipping {} notification to self for {}", event.kind, event.sender_id);
        return DispatchOutcome::SelfAction;
    }

    let receiver = match client.collection::<UserProfile>().get(&event.receiver_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            log::warn!(
                "dropping {} notification: receiver {} has no profile",
                event.kind,
                event.receiver_id
            );
            return DispatchOutcome::ReceiverMissing;
        }
        Err(err) => {
            log::error!("dropping {} notification to {}: {err}", event.kind, event.receiver_id);
            return DispatchOutcome::Failed;
        }
    };

    if !should_notify(receiver.notification_settings.as_ref(), event.kind) {
        log::debug!("{} notifications are off for {}", event.kind, event.receiver_id);
        return DispatchOutcome::Suppressed;
    }

    let notification = Notification {
        id: generate_document_id(),
        kind: event.kind,
        sender_id: event.sender_id,
        receiver_id: event.receiver_id,
        post_id: event.post_id,
        sender_name: event.sender_name,
        sender_photo: event.sender_photo,
        message: event.message,
        read: false,
        timestamp: Utc::now(),
    };

    match client.collection::<Notification>().create(&notification).await {
        Ok(()) => {
            log::debug!(
                "sent {} notification {} to {}",
                notification.kind,
                notification.id,
                notification.receiver_id
            );
            DispatchOutcome::Sent(notification.id)
        }
        Err(err) => {
            log::error!(
                "failed to write {} notification to {}: {err}",
                notification.kind,
                notification.receiver_id
            );
            DispatchOutcome::Failed
        }
    }
}

/// Flips the read flag. Returns `false` when the notification does not exist.
pub async fn mark_notification_read<S: DocumentStore>(
    client: &Client<S>,
    notification_id: &str,
) -> Result<bool, SocialError> {
    let notifications = client.collection::<Notification>();
    if !notifications.exists(notification_id).await? {
        log::warn!("cannot mark missing notification {notification_id} as read");
        return Ok(false);
    }
    notifications
        .update(notification_id, &[FieldOp::assign("read", true)])
        .await?;
    Ok(true)
}

/// Marks every unread notification of `user_id` as read; returns how many were flipped.
pub async fn mark_all_notifications_read<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<usize, SocialError> {
    let notifications = client.collection::<Notification>();
    let unread = notifications.find_many(&unread_filter(user_id)).await?;
    for notification in &unread {
        notifications
            .update(&notification.id, &[FieldOp::assign("read", true)])
            .await?;
    }
    Ok(unread.len())
}

/// All notifications received by `user_id`, newest first.
pub async fn get_notifications<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Vec<Notification>, SocialError> {
    let mut notifications = client
        .collection::<Notification>()
        .find_many(&[Filter::eq("receiver_id", user_id)])
        .await?;
    notifications.sort_by(newest_first);
    Ok(notifications)
}

pub async fn unread_notification_count<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<usize, SocialError> {
    Ok(client
        .collection::<Notification>()
        .count_where(&unread_filter(user_id))
        .await?)
}

/// Live notification feed for `user_id`, newest first.
pub fn subscribe_notifications<'a, S: DocumentStore>(
    client: &'a Client<S>,
    user_id: &str,
) -> Subscription<'a, S, Notification> {
    client
        .collection::<Notification>()
        .subscribe(vec![Filter::eq("receiver_id", user_id)])
        .ordered_by(newest_first)
}

/// Stores the caller's preferences. Returns `false` when the caller has no profile.
pub async fn update_notification_settings<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    settings: NotificationSettings,
) -> Result<bool, SocialError> {
    let users = client.collection::<UserProfile>();
    if !users.exists(&session.user_id).await? {
        log::warn!("cannot store notification settings: {} has no profile", session.user_id);
        return Ok(false);
    }
    let value = serde_json::to_value(settings).map_err(crate::errors::StoreError::from)?;
    users
        .update(&session.user_id, &[FieldOp::assign("notification_settings", value)])
        .await?;
    Ok(true)
}

/// Effective settings for `user_id`: stored values, or all enabled.
pub async fn notification_settings<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<NotificationSettings, SocialError> {
    Ok(client
        .collection::<UserProfile>()
        .get(user_id)
        .await?
        .map(|profile| profile.effective_settings())
        .unwrap_or_default())
}

fn unread_filter(user_id: &str) -> [Filter; 2] {
    [Filter::eq("receiver_id", user_id), Filter::eq("read", false)]
}

fn newest_first(a: &Notification, b: &Notification) -> Ordering {
    b.timestamp.cmp(&a.timestamp)
}
