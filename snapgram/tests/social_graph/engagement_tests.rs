use super::support::*;

#[tokio::test]
async fn like_is_idempotent() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    let first = toggle_like(&client, &bob, &post.id, true).await.unwrap();
    assert!(matches!(
        first,
        LikeOutcome::Changed {
            likes: 1,
            transition: LikeTransition::Liked,
            notification: Some(DispatchOutcome::Sent(_)),
        }
    ));
    assert_eq!(toggle_like(&client, &bob, &post.id, true).await.unwrap(), LikeOutcome::Unchanged);

    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 1);
    assert_eq!(stored.userlikes, vec!["bob"]);

    let likes: Vec<_> = inbox(&client, "alice")
        .await
        .into_iter()
        .filter(|n| n.kind == NotificationType::Like)
        .collect();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].post_id.as_deref(), Some(post.id.as_str()));
}

#[tokio::test]
async fn self_like_is_rejected_without_writes() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let post = publish(&client, &alice).await;

    assert_eq!(toggle_like(&client, &alice, &post.id, true).await.unwrap(), LikeOutcome::Rejected);
    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 0);
    assert!(stored.userlikes.is_empty());
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn unlike_from_five_to_four_sends_nothing() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = seed_post(&client, "alice", 5, &["bob"]).await;

    let outcome = toggle_like(&client, &bob, &post.id, false).await.unwrap();
    assert_eq!(
        outcome,
        LikeOutcome::Changed {
            likes: 4,
            transition: LikeTransition::Unliked,
            notification: None,
        }
    );

    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 4);
    assert!(stored.userlikes.is_empty());
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn concurrent_likes_from_different_users_both_count() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let carl = user(&client, "carl").await;
    let post = publish(&client, &alice).await;

    let (from_bob, from_carl) = tokio::join!(
        toggle_like(&client, &bob, &post.id, true),
        toggle_like(&client, &carl, &post.id, true),
    );
    assert!(matches!(from_bob.unwrap(), LikeOutcome::Changed { .. }));
    assert!(matches!(from_carl.unwrap(), LikeOutcome::Changed { .. }));

    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 2);
    assert!(stored.is_liked_by("bob"));
    assert!(stored.is_liked_by("carl"));
}

#[tokio::test]
async fn unlike_keeps_a_drifted_counter_at_zero() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = seed_post(&client, "alice", 0, &["carl", "bob"]).await;

    let outcome = toggle_like(&client, &bob, &post.id, false).await.unwrap();
    assert!(matches!(outcome, LikeOutcome::Changed { likes: 0, .. }));

    let stored = stored_post(&client, &post.id).await;
    assert_eq!(stored.likes, 0);
    assert_eq!(stored.userlikes, vec!["carl"]);
}

#[tokio::test]
async fn unlike_without_a_like_changes_nothing() {
    let client = memory_client();
    user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = seed_post(&client, "alice", 0, &[]).await;

    assert_eq!(toggle_like(&client, &bob, &post.id, false).await.unwrap(), LikeOutcome::Unchanged);
    assert_eq!(stored_post(&client, &post.id).await.likes, 0);
}

#[tokio::test]
async fn liking_a_missing_post_is_reported() {
    let client = memory_client();
    let bob = user(&client, "bob").await;
    assert_eq!(toggle_like(&client, &bob, "nope", true).await.unwrap(), LikeOutcome::PostMissing);
}

#[tokio::test]
async fn posts_need_valid_photos() {
    let client = memory_client();
    let alice = user(&client, "alice").await;

    let err = create_post(&client, &alice, NewPost::default()).await.unwrap_err();
    let validation = match err {
        snapgram::SocialError::Validation(validation) => validation,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(validation.issues[0].field, "photos");

    let bad = NewPost {
        caption: String::new(),
        photos: vec![PhotoMeta {
            cdn_url: "not a url".into(),
            uuid: "x".into(),
        }],
    };
    assert!(create_post(&client, &alice, bad).await.is_err());
    assert_eq!(client.store().len(collections::POSTS).await, 0);
}

#[tokio::test]
async fn feed_is_newest_first() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let first = publish(&client, &alice).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = publish(&client, &bob).await;

    let feed: Vec<String> = get_feed(&client).await.unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(feed, vec![second.id.clone(), first.id.clone()]);

    let by_alice = get_posts_by_user(&client, "alice").await.unwrap();
    assert_eq!(by_alice.len(), 1);
    assert_eq!(by_alice[0].username, "Alice");
}

#[tokio::test]
async fn only_the_author_deletes_a_post() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    assert!(!delete_post(&client, &bob, &post.id).await.unwrap());
    assert!(delete_post(&client, &alice, &post.id).await.unwrap());
    assert!(get_post(&client, &post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn author_info_is_re_denormalized() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    publish(&client, &alice).await;
    publish(&client, &alice).await;

    let update = ProfileUpdate {
        display_name: Some("Alice L.".into()),
        ..ProfileUpdate::default()
    };
    assert!(update_user_profile(&client, &alice, update).await.unwrap());
    let refreshed = Session::from_profile(&profile(&client, "alice").await);
    assert_eq!(update_author_info_on_posts(&client, &refreshed).await.unwrap(), 2);

    let posts = get_posts_by_user(&client, "alice").await.unwrap();
    assert!(posts.iter().all(|p| p.username == "Alice L."));
}

#[tokio::test]
async fn comments_carry_author_fields_and_sort_newest_first() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    create_comment(&client, &bob, &post.id, "first").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    create_comment(&client, &bob, &post.id, "  second  ").await.unwrap();

    let comments = get_comments_by_post(&client, &post.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].text, "second");
    assert_eq!(comments[0].username, "Bob");
    assert_eq!(comments[0].user_photo_url, "https://cdn.example.com/bob.jpg");

    let comment_notes = inbox(&client, "alice")
        .await
        .into_iter()
        .filter(|n| n.kind == NotificationType::Comment)
        .count();
    assert_eq!(comment_notes, 2);
}

#[tokio::test]
async fn empty_comments_and_missing_posts() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let post = publish(&client, &alice).await;

    assert!(create_comment(&client, &alice, &post.id, "   ").await.is_err());
    assert!(create_comment(&client, &alice, "missing", "hi").await.unwrap().is_none());
    assert!(get_comments_by_post(&client, &post.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn bookmark_round_trip_restores_both_sets() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    assert!(toggle_bookmark(&client, &bob, &post.id, false).await.unwrap());
    assert_eq!(profile(&client, "bob").await.bookmarks, vec![post.id.clone()]);
    assert_eq!(stored_post(&client, &post.id).await.bookmarked_by, vec!["bob"]);
    assert!(is_post_bookmarked(&client, "bob", &post.id).await.unwrap());
    assert_eq!(get_bookmarked_posts(&client, "bob").await.unwrap().len(), 1);

    assert!(!toggle_bookmark(&client, &bob, &post.id, true).await.unwrap());
    assert!(profile(&client, "bob").await.bookmarks.is_empty());
    assert!(stored_post(&client, &post.id).await.bookmarked_by.is_empty());
    assert!(get_bookmarked_posts(&client, "bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn bookmarks_never_notify() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let post = publish(&client, &alice).await;

    toggle_bookmark(&client, &bob, &post.id, false).await.unwrap();
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn bookmarking_a_missing_post_keeps_state() {
    let client = memory_client();
    let bob = user(&client, "bob").await;

    assert!(!toggle_bookmark(&client, &bob, "missing", false).await.unwrap());
    assert!(profile(&client, "bob").await.bookmarks.is_empty());
}
