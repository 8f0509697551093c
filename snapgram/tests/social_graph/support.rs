#![allow(dead_code)]

pub(crate) use chrono::Utc;
pub(crate) use serde_json::json;
pub(crate) use snapgram::{
    Client, DocumentStore, FieldOp, MemoryStore, Notification, NotificationSettings, NotificationType, PhotoMeta,
    Post, RedisStore, Session, UserProfile,
    id::generate_document_id,
    models::collections,
    rules::{FollowAction, LikeTransition},
    workflows::{
        bookmarks::*, chat::*, comments::*, integrity::*, notifications::*, posts::*, profiles::*, social_graph::*,
    },
};
pub(crate) use std::sync::atomic::{AtomicUsize, Ordering};
pub(crate) use std::time::Duration;

pub(crate) fn memory_client() -> Client<MemoryStore> {
    Client::in_memory()
}

/// Creates a public profile and returns a session for it.
pub(crate) async fn user<S: DocumentStore>(client: &Client<S>, user_id: &str) -> Session {
    let mut display_name = user_id.to_string();
    if let Some(first) = display_name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let profile = create_user_profile(
        client,
        NewProfile {
            user_id: user_id.to_string(),
            display_name,
            photo_url: format!("https://cdn.example.com/{user_id}.jpg"),
            ..NewProfile::default()
        },
    )
    .await
    .expect("create profile");
    Session::from_profile(&profile)
}

pub(crate) async fn private_user<S: DocumentStore>(client: &Client<S>, user_id: &str) -> Session {
    let session = user(client, user_id).await;
    assert!(set_privacy(client, &session, true).await.expect("set privacy"));
    session
}

pub(crate) async fn profile<S: DocumentStore>(client: &Client<S>, user_id: &str) -> UserProfile {
    get_user_profile(client, user_id)
        .await
        .expect("load profile")
        .expect("profile exists")
}

pub(crate) async fn stored_post<S: DocumentStore>(client: &Client<S>, post_id: &str) -> Post {
    get_post(client, post_id).await.expect("load post").expect("post exists")
}

pub(crate) async fn inbox<S: DocumentStore>(client: &Client<S>, user_id: &str) -> Vec<Notification> {
    get_notifications(client, user_id).await.expect("notifications")
}

pub(crate) fn photo(name: &str) -> PhotoMeta {
    PhotoMeta {
        cdn_url: format!("https://ucarecdn.com/{name}/"),
        uuid: name.to_string(),
    }
}

pub(crate) async fn publish<S: DocumentStore>(client: &Client<S>, author: &Session) -> Post {
    create_post(
        client,
        author,
        NewPost {
            caption: "golden hour".into(),
            photos: vec![photo("p1")],
        },
    )
    .await
    .expect("create post")
    .post
}

/// Writes a post document directly, bypassing the workflows.
pub(crate) async fn seed_post<S: DocumentStore>(
    client: &Client<S>,
    author_id: &str,
    likes: i64,
    userlikes: &[&str],
) -> Post {
    let post = Post {
        id: generate_document_id(),
        user_id: author_id.to_string(),
        caption: String::new(),
        photos: vec![photo("seed")],
        likes,
        userlikes: userlikes.iter().map(|id| id.to_string()).collect(),
        bookmarked_by: Vec::new(),
        username: author_id.to_string(),
        photo_url: String::new(),
        date: Utc::now(),
    };
    client.collection::<Post>().create(&post).await.expect("seed post");
    post
}

pub(crate) static TEST_NAMESPACE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique key prefix so Redis-backed tests never see each other's documents.
pub(crate) struct TestNamespace {
    prefix: String,
}

impl TestNamespace {
    pub(crate) fn unique() -> Self {
        let idx = TEST_NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let salt = generate_document_id();
        Self {
            prefix: format!("snapgram_test_{idx}_{}", &salt[..8]),
        }
    }

    pub(crate) async fn redis_client(&self) -> Client<RedisStore> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
        let store = RedisStore::connect(&url, self.prefix.clone(), "social")
            .await
            .expect("redis store");
        Client::new(store)
    }
}
