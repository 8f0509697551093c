//! Pure decision functions. Nothing here touches the store; the workflows feed these the
//! current state and carry out whatever writes they decide on.

pub mod follow;
pub mod likes;
pub mod notify;
pub mod unread;

pub use follow::{FollowAction, evaluate_follow_action};
pub use likes::{LikeDecision, LikeTransition, apply_like};
pub use notify::{is_self_action, should_notify};
pub use unread::total_unread;
