use anyhow::{Context, Result};
use snapgram::{
    DocumentStore, NotificationSettings, PhotoMeta, Session,
    workflows::{
        bookmarks::toggle_bookmark,
        chat::{OutgoingMessage, get_or_create_chat_room, mark_messages_read, send_chat_message, unread_message_count},
        comments::create_comment,
        integrity::check_integrity,
        notifications::{get_notifications, update_notification_settings},
        posts::{LikeOutcome, NewPost, create_post, toggle_like},
        profiles::{NewProfile, create_user_profile, set_privacy},
        social_graph::{resolve_follow_request, toggle_follow},
    },
};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Walkthrough",
    commands: &[
        "snapgram --memory tour               # runs against a throwaway in-memory store",
        "snapgram tour                        # writes demo users to the configured Redis",
    ],
}];

/// Walks three demo users through every workflow and prints what each step did.
pub async fn handle_tour<S: DocumentStore>(ctx: &AppContext<S>, output: &OutputManager) -> Result<()> {
    let client = &ctx.client;
    let suffix = snapgram::id::generate_document_id()[..6].to_lowercase();
    let alice = demo_user(ctx, "alice", &suffix).await?;
    let bob = demo_user(ctx, "bob", &suffix).await?;
    let carol = demo_user(ctx, "carol", &suffix).await?;
    set_privacy(client, &carol, true).await?;

    output.heading("Follow graph");
    let action = toggle_follow(client, &bob, &alice.user_id).await?;
    output.bullet(&format!("bob → alice (public): {action:?}"));
    let action = toggle_follow(client, &bob, &carol.user_id).await?;
    output.bullet(&format!("bob → carol (private): {action:?}"));
    resolve_follow_request(client, &carol, &bob.user_id, true).await?;
    output.bullet("carol accepted bob's request");

    output.heading("Posts & likes");
    let photo = PhotoMeta {
        cdn_url: format!("https://{}/demo-{suffix}/", ctx.settings.media.cdn_host),
        uuid: format!("demo-{suffix}"),
    };
    let published = create_post(
        client,
        &alice,
        NewPost {
            caption: "first light".into(),
            photos: vec![photo],
        },
    )
    .await
    .context("Tour could not publish a post")?;
    let post_id = published.post.id.clone();
    output.bullet(&format!("alice posted {post_id}, {} follower(s) notified", published.notified));

    report_like(output, "bob likes", toggle_like(client, &bob, &post_id, true).await?);
    report_like(output, "bob likes again", toggle_like(client, &bob, &post_id, true).await?);
    report_like(output, "alice likes her own post", toggle_like(client, &alice, &post_id, true).await?);
    report_like(output, "bob unlikes", toggle_like(client, &bob, &post_id, false).await?);

    let quiet = NotificationSettings {
        likes: false,
        ..NotificationSettings::default()
    };
    update_notification_settings(client, &alice, quiet).await?;
    report_like(output, "bob likes with alice's likes muted", toggle_like(client, &bob, &post_id, true).await?);

    if let Some(posted) = create_comment(client, &bob, &post_id, "lovely").await? {
        output.bullet(&format!("bob commented; alice notification: {:?}", posted.notification));
    }
    let saved = toggle_bookmark(client, &bob, &post_id, false).await?;
    output.event(ICONS.bookmark, &format!("bob bookmarked the post: {saved}"));

    output.heading("Chat");
    let room = get_or_create_chat_room(client, &bob.user_id, &alice.user_id).await?;
    send_chat_message(client, &bob, &room.id, OutgoingMessage::new(&alice.user_id, "hi alice")).await?;
    send_chat_message(
        client,
        &bob,
        &room.id,
        OutgoingMessage::new(&alice.user_id, format!("https://{}/snap-{suffix}/", ctx.settings.media.cdn_host)),
    )
    .await?;
    let unread = unread_message_count(client, &alice.user_id).await?;
    output.event(ICONS.chat, &format!("alice has {unread} unread message(s)"));
    mark_messages_read(client, &room.id, &alice.user_id).await?;
    let unread = unread_message_count(client, &alice.user_id).await?;
    output.event(ICONS.chat, &format!("after reading: {unread}"));

    output.heading("Notifications");
    for user in [&alice, &bob, &carol] {
        let notifications = get_notifications(client, &user.user_id).await?;
        output.event(
            ICONS.bell,
            &format!("{} received {} notification(s)", user.user_id, notifications.len()),
        );
        for notification in notifications {
            output.bullet(&format!(
                "{} from {}: {}",
                notification.kind, notification.sender_id, notification.message
            ));
        }
    }

    let report = check_integrity(client).await?;
    if report.is_clean() {
        output.success("Tour finished with no drift");
    } else {
        output.warning(&format!("Tour finished with {} drift(s)", report.drifts.len()));
    }
    Ok(())
}

async fn demo_user<S: DocumentStore>(ctx: &AppContext<S>, name: &str, suffix: &str) -> Result<Session> {
    let profile = create_user_profile(
        &ctx.client,
        NewProfile {
            user_id: format!("{name}-{suffix}"),
            display_name: name.to_string(),
            ..NewProfile::default()
        },
    )
    .await
    .with_context(|| format!("Tour could not create {name}"))?;
    Ok(Session::from_profile(&profile))
}

fn report_like(output: &OutputManager, step: &str, outcome: LikeOutcome) {
    let text = match outcome {
        LikeOutcome::Changed {
            likes, notification, ..
        } => match notification {
            Some(dispatch) => format!("{step}: {likes} like(s), notification {dispatch:?}"),
            None => format!("{step}: {likes} like(s)"),
        },
        other => format!("{step}: {other:?}"),
    };
    output.event(ICONS.heart, &text);
}
