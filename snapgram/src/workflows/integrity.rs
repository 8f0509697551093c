//! Dual-write drift detection.
//!
//! Follow edges, bookmark membership and like counters are maintained by independent writes.
//! This module reports where the two sides disagree. It never repairs anything.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::{
    client::Client,
    errors::SocialError,
    models::{Post, UserProfile},
    store::DocumentStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    /// `user_id` follows `other_id`, but `other_id.followers` lacks `user_id`.
    FollowingWithoutFollower { user_id: String, other_id: String },
    /// `other_id` is in `user_id.followers`, but `other_id.following` lacks `user_id`.
    FollowerWithoutFollowing { user_id: String, other_id: String },
    /// A relationship set names a user with no profile.
    UnknownUser { user_id: String, referenced_by: String },
    BookmarkMissingOnPost { user_id: String, post_id: String },
    BookmarkMissingOnProfile { user_id: String, post_id: String },
    LikeCountMismatch { post_id: String, likes: i64, userlikes: usize },
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::FollowingWithoutFollower { user_id, other_id } => {
                write!(f, "{user_id} follows {other_id}, but is missing from their followers")
            }
            Drift::FollowerWithoutFollowing { user_id, other_id } => {
                write!(f, "{other_id} is a follower of {user_id}, but does not follow them")
            }
            Drift::UnknownUser { user_id, referenced_by } => {
                write!(f, "{referenced_by} references unknown user {user_id}")
            }
            Drift::BookmarkMissingOnPost { user_id, post_id } => {
                write!(f, "{user_id} bookmarked {post_id}, but the post does not list them")
            }
            Drift::BookmarkMissingOnProfile { user_id, post_id } => {
                write!(f, "post {post_id} lists {user_id} as a bookmarker, but their profile does not")
            }
            Drift::LikeCountMismatch {
                post_id,
                likes,
                userlikes,
            } => write!(f, "post {post_id} counts {likes} like(s) for {userlikes} liker(s)"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub users_checked: usize,
    pub posts_checked: usize,
    pub drifts: Vec<Drift>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty()
    }
}

/// Follow-edge drift among `profiles`. Edges pointing outside the slice are reported as
/// unknown users.
pub fn follow_drift(profiles: &[UserProfile]) -> Vec<Drift> {
    let by_id: HashMap<&str, &UserProfile> = profiles.iter().map(|p| (p.user_id.as_str(), p)).collect();
    let mut drifts = Vec::new();

    for profile in profiles {
        for other_id in &profile.following {
            match by_id.get(other_id.as_str()) {
                Some(other) if other.is_followed_by(&profile.user_id) => {}
                Some(_) => drifts.push(Drift::FollowingWithoutFollower {
                    user_id: profile.user_id.clone(),
                    other_id: other_id.clone(),
                }),
                None => drifts.push(Drift::UnknownUser {
                    user_id: other_id.clone(),
                    referenced_by: profile.user_id.clone(),
                }),
            }
        }
        for other_id in &profile.followers {
            match by_id.get(other_id.as_str()) {
                Some(other) if other.is_following(&profile.user_id) => {}
                Some(_) => drifts.push(Drift::FollowerWithoutFollowing {
                    user_id: profile.user_id.clone(),
                    other_id: other_id.clone(),
                }),
                None => drifts.push(Drift::UnknownUser {
                    user_id: other_id.clone(),
                    referenced_by: profile.user_id.clone(),
                }),
            }
        }
    }
    drifts
}

/// Bookmark drift between `profiles` and `posts`. Bookmarks of posts outside `posts` are
/// not judged.
pub fn bookmark_drift(profiles: &[UserProfile], posts: &[Post]) -> Vec<Drift> {
    let posts_by_id: HashMap<&str, &Post> = posts.iter().map(|p| (p.id.as_str(), p)).collect();
    let profiles_by_id: HashMap<&str, &UserProfile> = profiles.iter().map(|p| (p.user_id.as_str(), p)).collect();
    let mut drifts = Vec::new();

    for profile in profiles {
        for post_id in &profile.bookmarks {
            if let Some(post) = posts_by_id.get(post_id.as_str())
                && !post.is_bookmarked_by(&profile.user_id)
            {
                drifts.push(Drift::BookmarkMissingOnPost {
                    user_id: profile.user_id.clone(),
                    post_id: post_id.clone(),
                });
            }
        }
    }
    for post in posts {
        for user_id in &post.bookmarked_by {
            if let Some(profile) = profiles_by_id.get(user_id.as_str())
                && !profile.has_bookmarked(&post.id)
            {
                drifts.push(Drift::BookmarkMissingOnProfile {
                    user_id: user_id.clone(),
                    post_id: post.id.clone(),
                });
            }
        }
    }
    drifts
}

pub fn like_drift(posts: &[Post]) -> Vec<Drift> {
    posts
        .iter()
        .filter(|post| post.likes != post.userlikes.len() as i64)
        .map(|post| Drift::LikeCountMismatch {
            post_id: post.id.clone(),
            likes: post.likes,
            userlikes: post.userlikes.len(),
        })
        .collect()
}

/// Scans every profile and post in the store.
pub async fn check_integrity<S: DocumentStore>(client: &Client<S>) -> Result<IntegrityReport, SocialError> {
    let profiles = client.collection::<UserProfile>().find_many(&[]).await?;
    let posts = client.collection::<Post>().find_many(&[]).await?;

    let mut drifts = follow_drift(&profiles);
    drifts.extend(bookmark_drift(&profiles, &posts));
    drifts.extend(like_drift(&posts));
    for drift in &drifts {
        log::warn!("drift: {drift}");
    }

    Ok(IntegrityReport {
        users_checked: profiles.len(),
        posts_checked: posts.len(),
        drifts,
    })
}
