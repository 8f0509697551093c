//! Document types stored by the social layer.
//!
//! Every type here is owned by the external document store; the application only holds
//! transient copies.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{serde_helpers::lenient_vec, validators::is_cdn_url};

/// Collection names used by the store.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const CHAT_ROOMS: &str = "chat_rooms";
    pub const MESSAGES: &str = "messages";
    pub const NOTIFICATIONS: &str = "notifications";
}

/// A type persisted as one document in a named collection.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn document_id(&self) -> &str;
}

/// Per-category notification preferences. Absent settings mean everything is enabled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationSettings {
    pub likes: bool,
    pub comments: bool,
    pub follows: bool,
    pub new_posts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            likes: true,
            comments: true,
            follows: true,
            new_posts: true,
        }
    }
}

/// A user profile, keyed by the identity provider's user id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub followers: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub following: Vec<String>,
    /// Users waiting for approval to follow this (private) account.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub follow_requests: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub notification_settings: Option<NotificationSettings>,
    /// Post ids saved by this user.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub bookmarks: Vec<String>,
}

impl UserProfile {
    /// The single default profile: public, no relationships, default settings.
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: String::new(),
            photo_url: String::new(),
            bio: String::new(),
            email: None,
            followers: Vec::new(),
            following: Vec::new(),
            follow_requests: Vec::new(),
            is_private: false,
            notification_settings: None,
            bookmarks: Vec::new(),
        }
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.following.iter().any(|id| id == user_id)
    }

    pub fn is_followed_by(&self, user_id: &str) -> bool {
        self.followers.iter().any(|id| id == user_id)
    }

    pub fn has_pending_request_from(&self, user_id: &str) -> bool {
        self.follow_requests.iter().any(|id| id == user_id)
    }

    pub fn has_bookmarked(&self, post_id: &str) -> bool {
        self.bookmarks.iter().any(|id| id == post_id)
    }

    /// Stored settings, or the fail-open default.
    pub fn effective_settings(&self) -> NotificationSettings {
        self.notification_settings.unwrap_or_default()
    }
}

impl Document for UserProfile {
    const COLLECTION: &'static str = collections::USERS;

    fn document_id(&self) -> &str {
        &self.user_id
    }
}

/// Reference to an uploaded image on the CDN.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PhotoMeta {
    pub cdn_url: String,
    pub uuid: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    /// Author.
    pub user_id: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub photos: Vec<PhotoMeta>,
    /// Client-maintained counter; intended to equal `userlikes.len()`.
    #[serde(default)]
    pub likes: i64,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub userlikes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub bookmarked_by: Vec<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub photo_url: String,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.userlikes.iter().any(|id| id == user_id)
    }

    pub fn is_bookmarked_by(&self, user_id: &str) -> bool {
        self.bookmarked_by.iter().any(|id| id == user_id)
    }
}

impl Document for Post {
    const COLLECTION: &'static str = collections::POSTS;

    fn document_id(&self) -> &str {
        &self.id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub user_photo_url: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl Document for Comment {
    const COLLECTION: &'static str = collections::COMMENTS;

    fn document_id(&self) -> &str {
        &self.id
    }
}

/// A direct-message room between two users.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatRoom {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub participants: Vec<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: BTreeMap<String, i64>,
}

impl ChatRoom {
    pub fn includes(&self, user_id: &str) -> bool {
        self.participants.iter().any(|id| id == user_id)
    }

    pub fn unread_for(&self, user_id: &str) -> i64 {
        self.unread_count.get(user_id).copied().unwrap_or(0).max(0)
    }

    pub fn other_participant(&self, user_id: &str) -> Option<&str> {
        self.participants.iter().map(String::as_str).find(|id| *id != user_id)
    }
}

impl Document for ChatRoom {
    const COLLECTION: &'static str = collections::CHAT_ROOMS;

    fn document_id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Content is a URL on the image CDN.
    Image,
}

impl MessageKind {
    pub fn classify(content: &str, cdn_host: &str) -> Self {
        if is_cdn_url(content, cdn_host) {
            MessageKind::Image
        } else {
            MessageKind::Text
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn kind(&self, cdn_host: &str) -> MessageKind {
        MessageKind::classify(&self.content, cdn_host)
    }
}

impl Document for ChatMessage {
    const COLLECTION: &'static str = collections::MESSAGES;

    fn document_id(&self) -> &str {
        &self.id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Like,
    Comment,
    Follow,
    Unfollow,
    NewPost,
    FollowRequest,
    FollowAccept,
    FollowReject,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        NotificationType::Like,
        NotificationType::Comment,
        NotificationType::Follow,
        NotificationType::Unfollow,
        NotificationType::NewPost,
        NotificationType::FollowRequest,
        NotificationType::FollowAccept,
        NotificationType::FollowReject,
    ];

    /// Request lifecycle events are delivered regardless of the receiver's settings.
    pub fn is_unsuppressible(self) -> bool {
        matches!(
            self,
            NotificationType::FollowRequest | NotificationType::FollowAccept | NotificationType::FollowReject
        )
    }

    pub fn default_message(self) -> &'static str {
        match self {
            NotificationType::Like => "liked your post",
            NotificationType::Comment => "commented on your post",
            NotificationType::Follow => "started following you",
            NotificationType::Unfollow => "unfollowed you",
            NotificationType::NewPost => "created a new post",
            NotificationType::FollowRequest => "wants to follow you",
            NotificationType::FollowAccept => "accepted your follow request",
            NotificationType::FollowReject => "rejected your follow request",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Like => "LIKE",
            NotificationType::Comment => "COMMENT",
            NotificationType::Follow => "FOLLOW",
            NotificationType::Unfollow => "UNFOLLOW",
            NotificationType::NewPost => "NEW_POST",
            NotificationType::FollowRequest => "FOLLOW_REQUEST",
            NotificationType::FollowAccept => "FOLLOW_ACCEPT",
            NotificationType::FollowReject => "FOLLOW_REJECT",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub sender_photo: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub timestamp: DateTime<Utc>,
}

impl Document for Notification {
    const COLLECTION: &'static str = collections::NOTIFICATIONS;

    fn document_id(&self) -> &str {
        &self.id
    }
}
