//! Partially applied dual-writes and swallowed secondary failures.

use super::support::*;

#[tokio::test]
async fn failed_second_bookmark_write_leaves_detectable_drift() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    client.store().fail_writes_to(collections::POSTS).await;
    assert!(toggle_bookmark(&client, &bob, &post.id, false).await.is_err());
    client.store().heal().await;

    assert_eq!(profile(&client, "bob").await.bookmarks, vec![post.id.clone()]);
    assert!(stored_post(&client, &post.id).await.bookmarked_by.is_empty());

    let report = check_integrity(&client).await.unwrap();
    assert_eq!(
        report.drifts,
        vec![Drift::BookmarkMissingOnPost {
            user_id: "bob".into(),
            post_id: post.id.clone(),
        }]
    );
}

#[tokio::test]
async fn failed_room_update_leaves_message_without_counter() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let room = get_or_create_chat_room(&client, "alice", "bob").await.unwrap();

    client.store().fail_writes_to(collections::CHAT_ROOMS).await;
    let result = send_chat_message(&client, &bob, &room.id, OutgoingMessage::new("alice", "hi")).await;
    assert!(result.is_err());
    client.store().heal().await;

    assert_eq!(get_messages(&client, &room.id).await.unwrap().len(), 1);
    assert_eq!(unread_message_count(&client, "alice").await.unwrap(), 0);
}

#[tokio::test]
async fn notification_outage_does_not_fail_the_like() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    client.store().fail_writes_to(collections::NOTIFICATIONS).await;
    let outcome = toggle_like(&client, &bob, &post.id, true).await.unwrap();
    assert!(matches!(
        outcome,
        LikeOutcome::Changed {
            notification: Some(DispatchOutcome::Failed),
            ..
        }
    ));
    assert_eq!(stored_post(&client, &post.id).await.likes, 1);

    let carl = user(&client, "carl").await;
    assert!(follow_user(&client, &carl, &alice.user_id).await.unwrap());
    assert_eq!(profile(&client, "alice").await.followers, vec!["carl"]);
}

#[tokio::test]
async fn fan_out_failures_do_not_unpublish() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    follow_user(&client, &bob, &alice.user_id).await.unwrap();

    client.store().fail_writes_to(collections::NOTIFICATIONS).await;
    let published = create_post(
        &client,
        &alice,
        NewPost {
            caption: String::new(),
            photos: vec![photo("x")],
        },
    )
    .await
    .unwrap();
    assert_eq!(published.notified, 0);
    assert!(get_post(&client, &published.post.id).await.unwrap().is_some());
}

#[tokio::test]
async fn primary_write_failure_is_returned() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    client.store().fail_writes_to(collections::USERS).await;
    assert!(follow_user(&client, &bob, &alice.user_id).await.is_err());
    client.store().heal().await;

    assert!(profile(&client, "alice").await.followers.is_empty());
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn integrity_reports_counter_and_edge_drift() {
    let client = memory_client();
    user(&client, "alice").await;
    user(&client, "bob").await;
    seed_post(&client, "alice", 5, &["bob"]).await;
    client
        .collection::<UserProfile>()
        .update("bob", &[FieldOp::array_union("following", "alice")])
        .await
        .unwrap();

    let report = check_integrity(&client).await.unwrap();
    assert_eq!(report.users_checked, 2);
    assert_eq!(report.posts_checked, 1);
    assert_eq!(report.drifts.len(), 2);
    assert!(report.drifts.contains(&Drift::FollowingWithoutFollower {
        user_id: "bob".into(),
        other_id: "alice".into(),
    }));
    assert!(
        report
            .drifts
            .iter()
            .any(|drift| matches!(drift, Drift::LikeCountMismatch { likes: 5, userlikes: 1, .. }))
    );
}
