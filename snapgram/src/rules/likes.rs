use serde::Serialize;

use crate::models::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeTransition {
    /// Absent -> present. The only transition that notifies.
    Liked,
    /// Present -> absent.
    Unliked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeDecision {
    /// The actor owns the post; nothing is written.
    Rejected,
    /// Membership already matches the request.
    Unchanged,
    Changed {
        likes: i64,
        userlikes: Vec<String>,
        transition: LikeTransition,
    },
}

/// Computes the new like counter and membership for `actor` wanting `wants_like` on `post`.
///
/// The counter moves by exactly one and never drops below zero. It is not recomputed from
/// the membership list, so pre-existing drift is carried forward.
pub fn apply_like(post: &Post, actor: &str, wants_like: bool) -> LikeDecision {
    if post.user_id == actor {
        return LikeDecision::Rejected;
    }

    let present = post.is_liked_by(actor);
    match (wants_like, present) {
        (true, false) => {
            let mut userlikes = post.userlikes.clone();
            userlikes.push(actor.to_string());
            LikeDecision::Changed {
                likes: post.likes.max(0) + 1,
                userlikes,
                transition: LikeTransition::Liked,
            }
        }
        (false, true) => LikeDecision::Changed {
            likes: (post.likes - 1).max(0),
            userlikes: post.userlikes.iter().filter(|id| *id != actor).cloned().collect(),
            transition: LikeTransition::Unliked,
        },
        _ => LikeDecision::Unchanged,
    }
}
