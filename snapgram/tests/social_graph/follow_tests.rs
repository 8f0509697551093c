use super::support::*;

#[tokio::test]
async fn follow_then_unfollow_updates_both_sides() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    assert!(follow_user(&client, &bob, &alice.user_id).await.unwrap());
    assert_eq!(profile(&client, "bob").await.following, vec!["alice"]);
    assert_eq!(profile(&client, "alice").await.followers, vec!["bob"]);
    assert!(is_following(&client, "bob", "alice").await.unwrap());

    assert!(unfollow_user(&client, &bob, &alice.user_id).await.unwrap());
    assert!(profile(&client, "bob").await.following.is_empty());
    assert!(profile(&client, "alice").await.followers.is_empty());
}

#[tokio::test]
async fn public_follow_queues_one_unread_follow_notification() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    assert_eq!(
        toggle_follow(&client, &bob, &alice.user_id).await.unwrap(),
        FollowAction::Follow
    );

    let alice_profile = profile(&client, "alice").await;
    assert_eq!(alice_profile.followers, vec!["bob"]);
    assert_eq!(profile(&client, "bob").await.following, vec!["alice"]);

    let notifications = inbox(&client, "alice").await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationType::Follow);
    assert_eq!(notifications[0].sender_id, "bob");
    assert_eq!(notifications[0].sender_name, "Bob");
    assert!(!notifications[0].read);
}

#[tokio::test]
async fn following_twice_keeps_one_edge() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;

    assert!(follow_user(&client, &bob, &alice.user_id).await.unwrap());
    assert!(!follow_user(&client, &bob, &alice.user_id).await.unwrap());
    assert_eq!(profile(&client, "alice").await.followers, vec!["bob"]);
    assert_eq!(inbox(&client, "alice").await.len(), 1);
}

#[tokio::test]
async fn self_follow_is_a_noop() {
    let client = memory_client();
    let alice = user(&client, "alice").await;

    assert!(!follow_user(&client, &alice, "alice").await.unwrap());
    assert_eq!(toggle_follow(&client, &alice, "alice").await.unwrap(), FollowAction::Noop);

    let stored = profile(&client, "alice").await;
    assert!(stored.followers.is_empty());
    assert!(stored.following.is_empty());
    assert!(inbox(&client, "alice").await.is_empty());
}

#[tokio::test]
async fn private_account_gets_a_request_instead_of_an_edge() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;

    assert_eq!(
        toggle_follow(&client, &dave, &carol.user_id).await.unwrap(),
        FollowAction::Request
    );

    let carol_profile = profile(&client, "carol").await;
    assert_eq!(carol_profile.follow_requests, vec!["dave"]);
    assert!(carol_profile.followers.is_empty());
    assert!(profile(&client, "dave").await.following.is_empty());

    let notifications = inbox(&client, "carol").await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationType::FollowRequest);
}

#[tokio::test]
async fn direct_follow_of_private_account_is_refused() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;

    assert!(!follow_user(&client, &dave, &carol.user_id).await.unwrap());
    assert!(profile(&client, "carol").await.followers.is_empty());
}

#[tokio::test]
async fn repeated_request_is_not_queued_twice() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;

    assert!(send_follow_request(&client, &dave, &carol.user_id).await.unwrap());
    assert_eq!(toggle_follow(&client, &dave, &carol.user_id).await.unwrap(), FollowAction::Noop);
    assert!(!send_follow_request(&client, &dave, &carol.user_id).await.unwrap());

    assert_eq!(profile(&client, "carol").await.follow_requests, vec!["dave"]);
    assert_eq!(inbox(&client, "carol").await.len(), 1);
}

#[tokio::test]
async fn accepting_a_request_creates_the_edge_and_tells_the_requester() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;
    send_follow_request(&client, &dave, &carol.user_id).await.unwrap();

    let pending = pending_follow_requests(&client, &carol).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, "dave");

    assert!(resolve_follow_request(&client, &carol, "dave", true).await.unwrap());

    let carol_profile = profile(&client, "carol").await;
    assert!(carol_profile.follow_requests.is_empty());
    assert_eq!(carol_profile.followers, vec!["dave"]);
    assert_eq!(profile(&client, "dave").await.following, vec!["carol"]);

    let dave_inbox = inbox(&client, "dave").await;
    assert_eq!(dave_inbox.len(), 1);
    assert_eq!(dave_inbox[0].kind, NotificationType::FollowAccept);
}

#[tokio::test]
async fn rejecting_a_request_leaves_no_edge() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let erin = user(&client, "erin").await;
    send_follow_request(&client, &erin, &carol.user_id).await.unwrap();

    assert!(resolve_follow_request(&client, &carol, "erin", false).await.unwrap());

    let carol_profile = profile(&client, "carol").await;
    assert!(carol_profile.follow_requests.is_empty());
    assert!(carol_profile.followers.is_empty());
    assert!(profile(&client, "erin").await.following.is_empty());
    assert_eq!(inbox(&client, "erin").await[0].kind, NotificationType::FollowReject);
}

#[tokio::test]
async fn request_from_a_deleted_user_can_still_be_rejected() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;
    send_follow_request(&client, &dave, &carol.user_id).await.unwrap();
    assert!(client.collection::<UserProfile>().delete("dave").await.unwrap());

    assert!(resolve_follow_request(&client, &carol, "dave", false).await.unwrap());
    assert!(profile(&client, "carol").await.follow_requests.is_empty());
    assert!(pending_follow_requests(&client, &carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn accepting_a_deleted_user_clears_the_request_without_an_edge() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;
    send_follow_request(&client, &dave, &carol.user_id).await.unwrap();
    client.collection::<UserProfile>().delete("dave").await.unwrap();

    assert!(resolve_follow_request(&client, &carol, "dave", true).await.unwrap());
    let carol_profile = profile(&client, "carol").await;
    assert!(carol_profile.follow_requests.is_empty());
    assert!(carol_profile.followers.is_empty());
    assert!(!client.collection::<UserProfile>().exists("dave").await.unwrap());
}

#[tokio::test]
async fn unfollowing_a_deleted_profile_clears_the_callers_side() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    client.collection::<UserProfile>().delete("alice").await.unwrap();

    assert!(unfollow_user(&client, &bob, "alice").await.unwrap());
    assert!(profile(&client, "bob").await.following.is_empty());
    assert!(!client.collection::<UserProfile>().exists("alice").await.unwrap());
}

#[tokio::test]
async fn resolving_without_a_pending_request_does_nothing() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    user(&client, "dave").await;

    assert!(!resolve_follow_request(&client, &carol, "dave", true).await.unwrap());
    assert!(profile(&client, "carol").await.followers.is_empty());
    assert!(inbox(&client, "dave").await.is_empty());
}

#[tokio::test]
async fn unfollow_is_allowed_on_private_accounts() {
    let client = memory_client();
    let carol = private_user(&client, "carol").await;
    let dave = user(&client, "dave").await;
    send_follow_request(&client, &dave, &carol.user_id).await.unwrap();
    resolve_follow_request(&client, &carol, "dave", true).await.unwrap();

    assert_eq!(
        toggle_follow(&client, &dave, &carol.user_id).await.unwrap(),
        FollowAction::Unfollow
    );
    assert!(profile(&client, "carol").await.followers.is_empty());
    assert!(profile(&client, "dave").await.following.is_empty());
}

#[tokio::test]
async fn missing_target_is_a_safe_noop() {
    let client = memory_client();
    let alice = user(&client, "alice").await;

    assert!(!follow_user(&client, &alice, "ghost").await.unwrap());
    assert_eq!(toggle_follow(&client, &alice, "ghost").await.unwrap(), FollowAction::Noop);
    assert!(profile(&client, "alice").await.following.is_empty());
    assert!(get_followers(&client, "ghost").await.unwrap().is_empty());
}

#[tokio::test]
async fn follower_lists_resolve_profiles() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    let bob = user(&client, "bob").await;
    let carl = user(&client, "carl").await;
    follow_user(&client, &bob, &alice.user_id).await.unwrap();
    follow_user(&client, &carl, &alice.user_id).await.unwrap();

    let followers: Vec<String> = get_followers(&client, "alice")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.display_name)
        .collect();
    assert_eq!(followers, vec!["Bob", "Carl"]);
    assert_eq!(get_following(&client, "bob").await.unwrap()[0].user_id, "alice");
}

#[tokio::test]
async fn profile_reads_fall_back_and_skip_the_caller() {
    let client = memory_client();
    let alice = user(&client, "alice").await;
    user(&client, "bob").await;

    let ghost = profile_or_default(&client, "ghost").await.unwrap();
    assert_eq!(ghost.user_id, "ghost");
    assert!(ghost.followers.is_empty());
    assert!(!ghost.is_private);
    assert!(!client.collection::<UserProfile>().exists("ghost").await.unwrap());
    assert_eq!(profile_or_default(&client, "alice").await.unwrap().display_name, "Alice");

    let others: Vec<String> = list_other_users(&client, &alice)
        .await
        .unwrap()
        .into_iter()
        .map(|profile| profile.user_id)
        .collect();
    assert_eq!(others, vec!["bob"]);
}
