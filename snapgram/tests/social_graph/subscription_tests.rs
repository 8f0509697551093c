use super::support::*;

use snapgram::{ChatMessage, Subscription};

const WAIT: Duration = Duration::from_secs(2);

/// Polls until a snapshot satisfies `done`, failing the test on timeout.
async fn wait_for<S, T>(subscription: &mut Subscription<'_, S, T>, done: impl Fn(&[T]) -> bool) -> Vec<T>
where
    S: DocumentStore,
    T: snapgram::Document,
{
    tokio::time::timeout(WAIT, async {
        loop {
            let snapshot = subscription
                .next()
                .await
                .expect("subscription open")
                .expect("snapshot");
            if done(&snapshot) {
                return snapshot;
            }
        }
    })
    .await
    .expect("snapshot in time")
}

#[tokio::test]
async fn first_poll_yields_the_current_snapshot() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    create_notification(&client, NotificationEvent::from_session(NotificationType::Like, &bob, "alice")).await;

    let mut feed = subscribe_notifications(&client, "alice");
    let snapshot = feed.next().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    feed.unsubscribe();
}

#[tokio::test]
async fn notification_feed_redelivers_after_writes() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    let mut feed = subscribe_notifications(&client, "alice");
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    let snapshot = wait_for(&mut feed, |items| items.len() == 1).await;
    assert_eq!(snapshot[0].kind, NotificationType::Follow);

    mark_notification_read(&client, &snapshot[0].id).await.unwrap();
    let snapshot = wait_for(&mut feed, |items| items.iter().all(|n| n.read)).await;
    assert!(snapshot[0].read);
}

#[tokio::test]
async fn message_feed_is_ordered_and_scoped_to_the_room() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let carl = user(&client, "carl").await;
    let room = get_or_create_chat_room(&client, "alice", "bob").await.unwrap();
    let other = get_or_create_chat_room(&client, "carl", "bob").await.unwrap();

    let mut feed = subscribe_messages(&client, &room.id);
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    send_chat_message(&client, &carl, &other.id, OutgoingMessage::new("bob", "elsewhere"))
        .await
        .unwrap();
    send_chat_message(&client, &bob, &room.id, OutgoingMessage::new("alice", "one"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    send_chat_message(&client, &alice, &room.id, OutgoingMessage::new("bob", "two"))
        .await
        .unwrap();

    let snapshot: Vec<ChatMessage> = wait_for(&mut feed, |items| items.len() == 2).await;
    let contents: Vec<&str> = snapshot.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
}

#[tokio::test]
async fn unsubscribed_feed_stops_and_restart_reopens() {
    let client = memory_client();
    let mut feed = subscribe_messages(&client, "room");
    feed.next().await.unwrap().unwrap();
    feed.restart();
    assert!(!feed.is_closed());
    assert!(feed.next().await.unwrap().unwrap().is_empty());
    feed.unsubscribe();
}
