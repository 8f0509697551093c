//! Direct messages between two users and the per-participant unread counters.
//!
//! Sending is two independent writes: the message record, then the room's last-message
//! cache together with the receiver's counter. A failure between them leaves the message
//! visible while the preview and counter lag behind.

use std::cmp::Ordering;

use chrono::Utc;

use crate::{
    client::{Client, Subscription},
    errors::{SocialError, ValidationError, ValidationIssue},
    id::generate_document_id,
    models::{ChatMessage, ChatRoom},
    rules::total_unread,
    session::Session,
    store::{DocumentStore, FieldOp, Filter},
};

#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub receiver_id: String,
    /// Plain text, or an image URL on the configured CDN.
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(receiver_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            receiver_id: receiver_id.into(),
            content: content.into(),
        }
    }
}

/// Opens a room for two distinct users and returns it.
pub async fn create_chat_room<S: DocumentStore>(
    client: &Client<S>,
    participants: [&str; 2],
) -> Result<ChatRoom, SocialError> {
    ensure_distinct(participants[0], participants[1])?;
    let room = ChatRoom {
        id: generate_document_id(),
        participants: participants.iter().map(|id| id.to_string()).collect(),
        last_message: None,
        last_message_timestamp: Some(Utc::now()),
        unread_count: Default::default(),
    };
    client.collection::<ChatRoom>().create(&room).await?;
    log::debug!("opened chat room {} for {participants:?}", room.id);
    Ok(room)
}

/// The room shared by `user_a` and `user_b`, if any. Nobody shares a room with themself.
pub async fn get_chat_room<S: DocumentStore>(
    client: &Client<S>,
    user_a: &str,
    user_b: &str,
) -> Result<Option<ChatRoom>, SocialError> {
    if user_a == user_b {
        return Ok(None);
    }
    Ok(client
        .collection::<ChatRoom>()
        .find_first(&[
            Filter::contains("participants", user_a),
            Filter::contains("participants", user_b),
        ])
        .await?)
}

pub async fn get_or_create_chat_room<S: DocumentStore>(
    client: &Client<S>,
    user_a: &str,
    user_b: &str,
) -> Result<ChatRoom, SocialError> {
    ensure_distinct(user_a, user_b)?;
    match get_chat_room(client, user_a, user_b).await? {
        Some(room) => Ok(room),
        None => create_chat_room(client, [user_a, user_b]).await,
    }
}

fn ensure_distinct(user_a: &str, user_b: &str) -> Result<(), ValidationError> {
    if user_a == user_b {
        return Err(ValidationError::single(
            "participants",
            "distinct",
            "a chat room needs two different users",
        ));
    }
    Ok(())
}

/// Rooms the user participates in, most recently active first.
pub async fn list_chat_rooms<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Vec<ChatRoom>, SocialError> {
    let mut rooms = client
        .collection::<ChatRoom>()
        .find_many(&[Filter::contains("participants", user_id)])
        .await?;
    rooms.sort_by(|a, b| b.last_message_timestamp.cmp(&a.last_message_timestamp));
    Ok(rooms)
}

/// Sends a message in `room_id`. Returns `None` when the room does not exist.
pub async fn send_chat_message<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    room_id: &str,
    outgoing: OutgoingMessage,
) -> Result<Option<ChatMessage>, SocialError> {
    let rooms = client.collection::<ChatRoom>();
    let Some(room) = rooms.get(room_id).await? else {
        log::warn!("cannot send to missing chat room {room_id}");
        return Ok(None);
    };
    validate_outgoing(&room, session, &outgoing)?;

    let message = ChatMessage {
        id: generate_document_id(),
        room_id: room.id.clone(),
        sender_id: session.user_id.clone(),
        receiver_id: outgoing.receiver_id,
        content: outgoing.content,
        timestamp: Utc::now(),
    };
    client.collection::<ChatMessage>().create(&message).await?;

    let sent_at = serde_json::to_value(message.timestamp).map_err(crate::errors::StoreError::from)?;
    rooms
        .update(
            room_id,
            &[
                FieldOp::assign("last_message", message.content.as_str()),
                FieldOp::assign("last_message_timestamp", sent_at),
                FieldOp::map_increment("unread_count", &message.receiver_id, 1),
            ],
        )
        .await?;
    log::debug!(
        "{} sent a {:?} message in {room_id}",
        message.sender_id,
        client.message_kind(&message.content)
    );
    Ok(Some(message))
}

/// Zeroes `user_id`'s unread counter in the room. Returns `false` for a missing room.
pub async fn mark_messages_read<S: DocumentStore>(
    client: &Client<S>,
    room_id: &str,
    user_id: &str,
) -> Result<bool, SocialError> {
    let rooms = client.collection::<ChatRoom>();
    if !rooms.exists(room_id).await? {
        log::warn!("cannot mark missing chat room {room_id} as read");
        return Ok(false);
    }
    rooms
        .update(room_id, &[FieldOp::map_assign("unread_count", user_id, 0)])
        .await?;
    Ok(true)
}

/// Total unread messages for `user_id` across all of their rooms.
pub async fn unread_message_count<S: DocumentStore>(client: &Client<S>, user_id: &str) -> Result<i64, SocialError> {
    let rooms = client
        .collection::<ChatRoom>()
        .find_many(&[Filter::contains("participants", user_id)])
        .await?;
    Ok(total_unread(&rooms, user_id))
}

/// Messages in `room_id`, oldest first.
pub async fn get_messages<S: DocumentStore>(client: &Client<S>, room_id: &str) -> Result<Vec<ChatMessage>, SocialError> {
    let mut messages = client
        .collection::<ChatMessage>()
        .find_many(&[Filter::eq("room_id", room_id)])
        .await?;
    messages.sort_by(oldest_first);
    Ok(messages)
}

/// Live message list for `room_id`, oldest first.
pub fn subscribe_messages<'a, S: DocumentStore>(
    client: &'a Client<S>,
    room_id: &str,
) -> Subscription<'a, S, ChatMessage> {
    client
        .collection::<ChatMessage>()
        .subscribe(vec![Filter::eq("room_id", room_id)])
        .ordered_by(oldest_first)
}

fn validate_outgoing(room: &ChatRoom, session: &Session, outgoing: &OutgoingMessage) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    if outgoing.content.trim().is_empty() {
        issues.push(ValidationIssue::new("content", "required", "message cannot be empty"));
    }
    if !room.includes(&session.user_id) {
        issues.push(ValidationIssue::new("sender_id", "participant", "sender is not in this room"));
    }
    if session.is(&outgoing.receiver_id) || !room.includes(&outgoing.receiver_id) {
        issues.push(ValidationIssue::new(
            "receiver_id",
            "participant",
            "receiver must be the other participant",
        ));
    }
    ValidationError::new(issues).into_result()
}

fn oldest_first(a: &ChatMessage, b: &ChatMessage) -> Ordering {
    a.timestamp.cmp(&b.timestamp)
}
