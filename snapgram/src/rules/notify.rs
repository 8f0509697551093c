use crate::models::{NotificationSettings, NotificationType};

/// Whether a notification of `kind` reaches a receiver with the given stored settings.
///
/// Follow-request lifecycle events are never suppressed. Missing settings mean every
/// category is enabled.
pub fn should_notify(settings: Option<&NotificationSettings>, kind: NotificationType) -> bool {
    if kind.is_unsuppressible() {
        return true;
    }
    let settings = settings.copied().unwrap_or_default();
    match kind {
        NotificationType::Like => settings.likes,
        NotificationType::Comment => settings.comments,
        NotificationType::Follow | NotificationType::Unfollow => settings.follows,
        NotificationType::NewPost => settings.new_posts,
        NotificationType::FollowRequest | NotificationType::FollowAccept | NotificationType::FollowReject => true,
    }
}

/// An action on one's own content or profile never notifies.
pub fn is_self_action(actor_id: &str, owner_id: &str) -> bool {
    actor_id == owner_id
}
