//! Follow graph with privacy gating.
//!
//! Every relationship change is two independent writes, one per profile. A failure between
//! them leaves the pair asymmetric; readers treat `followers`/`following` as eventually
//! symmetric and `integrity` reports drift.

use crate::{
    client::Client,
    errors::SocialError,
    models::{NotificationType, UserProfile},
    rules::{FollowAction, evaluate_follow_action},
    session::Session,
    store::{DocumentStore, FieldOp},
};

use super::notifications::{NotificationEvent, create_notification};

/// Follows a public account. Returns `false` without writing when the target is the caller,
/// is private, is already followed, or either profile is missing.
pub async fn follow_user<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    target_id: &str,
) -> Result<bool, SocialError> {
    if session.is(target_id) {
        log::warn!("{} tried to follow themself", session.user_id);
        return Ok(false);
    }
    let Some((actor, target)) = load_pair(client, &session.user_id, target_id).await? else {
        return Ok(false);
    };
    if target.is_private {
        log::warn!("{target_id} is private; {} must send a follow request", session.user_id);
        return Ok(false);
    }
    if actor.is_following(target_id) {
        log::debug!("{} already follows {target_id}", session.user_id);
        return Ok(false);
    }

    let users = client.collection::<UserProfile>();
    users
        .update(&session.user_id, &[FieldOp::array_union("following", target_id)])
        .await?;
    users
        .update(target_id, &[FieldOp::array_union("followers", &session.user_id)])
        .await?;
    log::debug!("{} now follows {target_id}", session.user_id);

    create_notification(client, sender_event(NotificationType::Follow, session, &actor, target_id)).await;
    Ok(true)
}

/// Removes the follow edge in both directions. Allowed on private accounts too.
///
/// When the target's profile is gone, the caller's side is still cleared and nobody is
/// notified.
pub async fn unfollow_user<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    target_id: &str,
) -> Result<bool, SocialError> {
    if session.is(target_id) {
        return Ok(false);
    }
    let users = client.collection::<UserProfile>();
    let Some(actor) = users.get(&session.user_id).await? else {
        log::warn!("user profile {} not found", session.user_id);
        return Ok(false);
    };
    let target = users.get(target_id).await?;

    users
        .update(&session.user_id, &[FieldOp::array_remove("following", target_id)])
        .await?;
    let Some(target) = target else {
        log::warn!("{} unfollowed {target_id}, whose profile no longer exists", session.user_id);
        return Ok(true);
    };
    users
        .update(target_id, &[FieldOp::array_remove("followers", &session.user_id)])
        .await?;
    log::debug!("{} unfollowed {target_id}", session.user_id);

    let was_connected = actor.is_following(target_id) || target.is_followed_by(&session.user_id);
    if was_connected {
        create_notification(client, sender_event(NotificationType::Unfollow, session, &actor, target_id)).await;
    }
    Ok(true)
}

/// Queues a follow request on `target_id`. The request notification is never suppressed.
pub async fn send_follow_request<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    target_id: &str,
) -> Result<bool, SocialError> {
    if session.is(target_id) {
        return Ok(false);
    }
    let Some((actor, target)) = load_pair(client, &session.user_id, target_id).await? else {
        return Ok(false);
    };
    if actor.is_following(target_id) {
        log::debug!("{} already follows {target_id}; no request needed", session.user_id);
        return Ok(false);
    }
    if target.has_pending_request_from(&session.user_id) {
        return Ok(false);
    }

    client
        .collection::<UserProfile>()
        .update(target_id, &[FieldOp::array_union("follow_requests", &session.user_id)])
        .await?;
    log::debug!("{} requested to follow {target_id}", session.user_id);

    create_notification(
        client,
        sender_event(NotificationType::FollowRequest, session, &actor, target_id),
    )
    .await;
    Ok(true)
}

/// Accepts or rejects `requester_id`'s pending request on the caller's account.
///
/// The request is always cleared, even when the requester's profile has since been deleted.
/// Acceptance adds the edge in both directions; the requester's side is skipped when their
/// profile is gone. The requester is told either way. Returns `false` when there is no such
/// pending request.
pub async fn resolve_follow_request<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    requester_id: &str,
    accept: bool,
) -> Result<bool, SocialError> {
    let users = client.collection::<UserProfile>();
    let Some(owner) = users.get(&session.user_id).await? else {
        log::warn!("user profile {} not found", session.user_id);
        return Ok(false);
    };
    if !owner.has_pending_request_from(requester_id) {
        log::warn!("{} has no pending request from {requester_id}", session.user_id);
        return Ok(false);
    }

    users
        .update(&session.user_id, &[FieldOp::array_remove("follow_requests", requester_id)])
        .await?;
    if accept {
        if users.exists(requester_id).await? {
            users
                .update(&session.user_id, &[FieldOp::array_union("followers", requester_id)])
                .await?;
            users
                .update(requester_id, &[FieldOp::array_union("following", &session.user_id)])
                .await?;
        } else {
            log::warn!("cannot accept {requester_id}: profile no longer exists");
        }
    }
    log::debug!(
        "{} {} follow request from {requester_id}",
        session.user_id,
        if accept { "accepted" } else { "rejected" }
    );

    let kind = if accept {
        NotificationType::FollowAccept
    } else {
        NotificationType::FollowReject
    };
    create_notification(client, sender_event(kind, session, &owner, requester_id)).await;
    Ok(true)
}

/// The follow button: evaluates the relationship and performs whichever action applies.
///
/// Returns the action that took effect, `Noop` when nothing was written.
pub async fn toggle_follow<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    target_id: &str,
) -> Result<FollowAction, SocialError> {
    let Some((actor, target)) = load_pair(client, &session.user_id, target_id).await? else {
        return Ok(FollowAction::Noop);
    };

    let action = evaluate_follow_action(
        &session.user_id,
        target_id,
        target.is_private,
        actor.is_following(target_id),
        target.has_pending_request_from(&session.user_id),
    );

    let applied = match action {
        FollowAction::Follow => follow_user(client, session, target_id).await?,
        FollowAction::Request => send_follow_request(client, session, target_id).await?,
        FollowAction::Unfollow => unfollow_user(client, session, target_id).await?,
        FollowAction::Noop => false,
    };
    Ok(if applied { action } else { FollowAction::Noop })
}

pub async fn is_following<S: DocumentStore>(
    client: &Client<S>,
    actor_id: &str,
    target_id: &str,
) -> Result<bool, SocialError> {
    Ok(client
        .collection::<UserProfile>()
        .get(actor_id)
        .await?
        .is_some_and(|profile| profile.is_following(target_id)))
}

/// Profiles of everyone following `user_id`. Dangling ids are skipped.
pub async fn get_followers<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Vec<UserProfile>, SocialError> {
    let Some(profile) = client.collection::<UserProfile>().get(user_id).await? else {
        return Ok(Vec::new());
    };
    resolve_profiles(client, &profile.followers).await
}

/// Profiles of everyone `user_id` follows. Dangling ids are skipped.
pub async fn get_following<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Vec<UserProfile>, SocialError> {
    let Some(profile) = client.collection::<UserProfile>().get(user_id).await? else {
        return Ok(Vec::new());
    };
    resolve_profiles(client, &profile.following).await
}

/// Profiles waiting for the caller's approval.
pub async fn pending_follow_requests<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
) -> Result<Vec<UserProfile>, SocialError> {
    let Some(profile) = client.collection::<UserProfile>().get(&session.user_id).await? else {
        return Ok(Vec::new());
    };
    resolve_profiles(client, &profile.follow_requests).await
}

async fn resolve_profiles<S: DocumentStore>(
    client: &Client<S>,
    user_ids: &[String],
) -> Result<Vec<UserProfile>, SocialError> {
    let users = client.collection::<UserProfile>();
    let mut profiles = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        match users.get(user_id).await? {
            Some(profile) => profiles.push(profile),
            None => log::warn!("skipping dangling user reference {user_id}"),
        }
    }
    Ok(profiles)
}

/// Loads both profiles, or logs and returns `None` when either is missing.
async fn load_pair<S: DocumentStore>(
    client: &Client<S>,
    first_id: &str,
    second_id: &str,
) -> Result<Option<(UserProfile, UserProfile)>, SocialError> {
    let users = client.collection::<UserProfile>();
    let first = users.get(first_id).await?;
    let second = users.get(second_id).await?;
    match (first, second) {
        (Some(first), Some(second)) => Ok(Some((first, second))),
        (first, _) => {
            let missing = if first.is_none() { first_id } else { second_id };
            log::warn!("user profile {missing} not found");
            Ok(None)
        }
    }
}

/// Event from the caller, falling back to the stored profile for display fields.
fn sender_event(kind: NotificationType, session: &Session, profile: &UserProfile, receiver_id: &str) -> NotificationEvent {
    let mut event = NotificationEvent::from_session(kind, session, receiver_id);
    if event.sender_name.is_empty() {
        event.sender_name = profile.display_name.clone();
    }
    if event.sender_photo.is_empty() {
        event.sender_photo = profile.photo_url.clone();
    }
    event
}
