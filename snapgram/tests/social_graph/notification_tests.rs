use super::support::*;

#[tokio::test]
async fn settings_gate_each_category() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let settings = NotificationSettings {
        likes: false,
        comments: true,
        ..NotificationSettings::default()
    };
    assert!(update_notification_settings(&client, &alice, settings).await.unwrap());

    let post = publish(&client, &alice).await;
    let liked = toggle_like(&client, &bob, &post.id, true).await.unwrap();
    assert!(matches!(
        liked,
        LikeOutcome::Changed {
            notification: Some(DispatchOutcome::Suppressed),
            ..
        }
    ));

    let posted = create_comment(&client, &bob, &post.id, "nice").await.unwrap().unwrap();
    assert!(posted.notification.is_sent());

    let kinds: Vec<NotificationType> = inbox(&client, "alice").await.into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NotificationType::Comment]);
}

#[tokio::test]
async fn missing_settings_fail_open() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    for kind in [
        NotificationType::Like,
        NotificationType::Comment,
        NotificationType::Follow,
        NotificationType::NewPost,
    ] {
        let outcome = create_notification(&client, NotificationEvent::from_session(kind, &bob, "alice")).await;
        assert!(outcome.is_sent(), "{kind} should be delivered");
    }
    assert_eq!(unread_notification_count(&client, "alice").await.unwrap(), 4);
}

#[tokio::test]
async fn request_lifecycle_ignores_settings() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;
    let muted = NotificationSettings {
        likes: false,
        comments: false,
        follows: false,
        new_posts: false,
    };
    update_notification_settings(&client, &carol, muted).await.unwrap();
    update_notification_settings(&client, &dave, muted).await.unwrap();

    send_follow_request(&client, &dave, &carol.user_id).await.unwrap();
    resolve_follow_request(&client, &carol, "dave", true).await.unwrap();

    assert_eq!(inbox(&client, "carol").await[0].kind, NotificationType::FollowRequest);
    assert_eq!(inbox(&client, "dave").await[0].kind, NotificationType::FollowAccept);
}

#[tokio::test]
async fn muted_follows_suppress_follow_and_unfollow() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let settings = NotificationSettings {
        follows: false,
        ..NotificationSettings::default()
    };
    update_notification_settings(&client, &alice, settings).await.unwrap();

    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    unfollow_user(&client, &bob, &alice.user_id).await.unwrap();
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn unfollow_notifies_only_when_connected() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    unfollow_user(&client, &bob, &alice.user_id).await.unwrap();
    assert!(inbox(&client, "alice").await.is_empty());

    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    unfollow_user(&client, &bob, &alice.user_id).await.unwrap();
    let kinds: Vec<NotificationType> = inbox(&client, "alice").await.into_iter().map(|n| n.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(kinds.contains(&NotificationType::Unfollow));
}

#[tokio::test]
async fn self_actions_never_notify() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let post = publish(&client, &alice).await;

    let posted = create_comment(&client, &alice, &post.id, "my own").await.unwrap().unwrap();
    assert_eq!(posted.notification, DispatchOutcome::SelfAction);

    let outcome = create_notification(
        &client,
        NotificationEvent::from_session(NotificationType::Like, &alice, "alice").with_post(&post.id),
    )
    .await;
    assert_eq!(outcome, DispatchOutcome::SelfAction);
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn missing_receiver_drops_the_notification_quietly() {
    let client = memory_client();
    let bob = user(&client, "bob").await;

    let outcome = create_notification(&client, NotificationEvent::from_session(NotificationType::Like, &bob, "ghost")).await;
    assert_eq!(outcome, DispatchOutcome::ReceiverMissing);
    assert_eq!(client.store().len(collections::NOTIFICATIONS).await, 0);
}

#[tokio::test]
async fn new_posts_fan_out_to_followers() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let carl = user(&client, "carl").await;
    user(&client, "stranger").await;
    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    follow_user(&client, &carl, &alice.user_id).await.unwrap();
    update_notification_settings(
        &client,
        &carl,
        NotificationSettings {
            new_posts: false,
            ..NotificationSettings::default()
        },
    )
    .await
    .unwrap();

    let published = create_post(
        &client,
        &alice,
        NewPost {
            caption: "hello".into(),
            photos: vec![photo("a")],
        },
    )
    .await
    .unwrap();

    assert_eq!(published.notified, 1);
    let bob_inbox = inbox(&client, "bob").await;
    assert_eq!(bob_inbox.len(), 1);
    assert_eq!(bob_inbox[0].kind, NotificationType::NewPost);
    assert_eq!(bob_inbox[0].post_id.as_deref(), Some(published.post.id.as_str()));
    assert!(inbox(&client, "carl").await.is_empty());
    assert!(inbox(&client, "stranger").await.is_empty());
}

#[tokio::test]
async fn read_flags_flip_one_or_all() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    for kind in [NotificationType::Like, NotificationType::Comment, NotificationType::Follow] {
        create_notification(&client, NotificationEvent::from_session(kind, &bob, "alice")).await;
    }

    let first = inbox(&client, "alice").await.remove(0);
    assert!(mark_notification_read(&client, &first.id).await.unwrap());
    assert_eq!(unread_notification_count(&client, "alice").await.unwrap(), 2);

    assert_eq!(mark_all_notifications_read(&client, "alice").await.unwrap(), 2);
    assert_eq!(unread_notification_count(&client, "alice").await.unwrap(), 0);
    assert!(inbox(&client, "alice").await.iter().all(|n| n.read));

    assert!(!mark_notification_read(&client, "missing").await.unwrap());
}

#[tokio::test]
async fn settings_round_trip_and_default() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    assert_eq!(
        notification_settings(&client, "alice").await.unwrap(),
        NotificationSettings::default()
    );

    let quiet = NotificationSettings {
        likes: false,
        comments: false,
        follows: true,
        new_posts: true,
    };
    assert!(update_notification_settings(&client, &alice, quiet).await.unwrap());
    assert_eq!(notification_settings(&client, "alice").await.unwrap(), quiet);
    assert_eq!(profile(&client, "alice").await.notification_settings, Some(quiet));

    let ghost = Session::new("ghost");
    assert!(!update_notification_settings(&client, &ghost, quiet).await.unwrap());
}
