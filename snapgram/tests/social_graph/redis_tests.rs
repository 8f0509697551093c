//! Workflows against a live Redis. Run with `cargo test -- --ignored` and `REDIS_URL` set.

use super::support::*;
use serial_test::serial;

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn redis_follow_request_flow() {
    let ns = TestNamespace::unique();
    let client = ns.redis_client().await;
    let carol = user(&client, "carol").await;
    assert!(set_privacy(&client, &carol, true).await.unwrap());
    let dave = user(&client, "dave").await;

    assert_eq!(
        toggle_follow(&client, &dave, &carol.user_id).await.unwrap(),
        FollowAction::Request
    );
    assert_eq!(profile(&client, "carol").await.follow_requests, vec!["dave"]);

    assert!(resolve_follow_request(&client, &carol, "dave", true).await.unwrap());
    let carol_profile = profile(&client, "carol").await;
    assert!(carol_profile.follow_requests.is_empty());
    assert_eq!(carol_profile.followers, vec!["dave"]);
    assert_eq!(profile(&client, "dave").await.following, vec!["carol"]);
    assert_eq!(inbox(&client, "dave").await[0].kind, NotificationType::FollowAccept);
}

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn redis_like_and_unread_counters() {
    let ns = TestNamespace::unique();
    let client = ns.redis_client().await;
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    toggle_like(&client, &bob, &post.id, true).await.unwrap();
    toggle_like(&client, &bob, &post.id, false).await.unwrap();
    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 0);
    assert!(stored.userlikes.is_empty());

    let room = get_or_create_chat_room(&client, "alice", "bob").await.unwrap();
    send_chat_message(&client, &bob, &room.id, OutgoingMessage::new("alice", "hi"))
        .await
        .unwrap();
    assert_eq!(unread_message_count(&client, "alice").await.unwrap(), 1);
    mark_messages_read(&client, &room.id, "alice").await.unwrap();
    assert_eq!(unread_message_count(&client, "alice").await.unwrap(), 0);

    assert!(check_integrity(&client).await.unwrap().is_clean());
}

#[tokio::test]
#[ignore = "requires a running Redis"]
#[serial]
async fn redis_subscription_sees_published_changes() {
    let ns = TestNamespace::unique();
    let client = ns.redis_client().await;
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    let mut feed = subscribe_notifications(&client, "alice");
    assert!(feed.next().await.unwrap().unwrap().is_empty());

    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    let snapshot = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = feed.next().await.unwrap().unwrap();
            if !snapshot.is_empty() {
                return snapshot;
            }
        }
    })
    .await
    .expect("notification delivered");
    assert_eq!(snapshot[0].kind, NotificationType::Follow);
    feed.unsubscribe();
}
