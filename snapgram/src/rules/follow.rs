use serde::Serialize;

/// What a follow-button press should do, given the current relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowAction {
    /// Symmetric add to `following`/`followers`.
    Follow,
    /// Pending request on a private account.
    Request,
    /// Symmetric removal.
    Unfollow,
    Noop,
}

/// Decides the follow action for `actor` pressing follow on `target`.
///
/// Unfollowing is always allowed, private account or not. A user never follows themself.
/// A request already pending is not re-sent.
pub fn evaluate_follow_action(
    actor: &str,
    target: &str,
    target_is_private: bool,
    already_following: bool,
    already_requested: bool,
) -> FollowAction {
    if actor == target {
        return FollowAction::Noop;
    }
    if already_following {
        return FollowAction::Unfollow;
    }
    if target_is_private {
        if already_requested {
            return FollowAction::Noop;
        }
        return FollowAction::Request;
    }
    FollowAction::Follow
}
