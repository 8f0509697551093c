use anyhow::{Context, Result};
use clap::Subcommand;
use snapgram::{
    DocumentStore, NotificationSettings,
    workflows::notifications::{
        get_notifications, mark_all_notifications_read, mark_notification_read, notification_settings,
        subscribe_notifications, unread_notification_count, update_notification_settings,
    },
};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;
use crate::views::{NotificationList, SettingsView};

pub const NOTIFICATION_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Notifications",
    commands: &[
        "snapgram --as alice notifications list --unread",
        "snapgram --as alice notifications read <notification-id>",
        "snapgram --as alice notifications read-all",
        "snapgram --as alice notifications watch --limit 3",
    ],
}];

pub const SETTINGS_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Notification Settings",
    commands: &[
        "snapgram --as alice settings show",
        "snapgram --as alice settings set --likes false --new-posts false",
    ],
}];

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// Notifications received by the acting user, newest first
    List {
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification read
    Read { notification_id: String },

    /// Mark every unread notification read
    ReadAll,

    /// Number of unread notifications
    Count,

    /// Print the feed each time it changes
    Watch {
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show effective settings (defaults to the acting user)
    Show { user_id: Option<String> },

    /// Change categories; omitted flags keep their current value
    Set {
        #[arg(long)]
        likes: Option<bool>,
        #[arg(long)]
        comments: Option<bool>,
        #[arg(long)]
        follows: Option<bool>,
        #[arg(long)]
        new_posts: Option<bool>,
    },
}

pub async fn handle_notification_commands<S: DocumentStore>(
    command: NotificationCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    match command {
        NotificationCommands::List { unread } => {
            let mut notifications = get_notifications(&ctx.client, &session.user_id).await?;
            if unread {
                notifications.retain(|notification| !notification.read);
            }
            output.display(&NotificationList(notifications))?;
        }
        NotificationCommands::Read { notification_id } => {
            if mark_notification_read(&ctx.client, &notification_id).await? {
                output.success(&format!("Marked {notification_id} read"));
            } else {
                output.warning(&format!("Notification {notification_id} not found"));
            }
        }
        NotificationCommands::ReadAll => {
            let count = mark_all_notifications_read(&ctx.client, &session.user_id).await?;
            output.success(&format!("Marked {count} notification(s) read"));
        }
        NotificationCommands::Count => {
            let count = unread_notification_count(&ctx.client, &session.user_id).await?;
            if output.is_json() {
                println!("{}", serde_json::json!({ "unread": count }));
            } else {
                output.event(ICONS.bell, &format!("{count} unread notification(s)"));
            }
        }
        NotificationCommands::Watch { limit } => {
            let mut subscription = subscribe_notifications(&ctx.client, &session.user_id);
            let mut seen = 0;
            while let Some(snapshot) = subscription.next().await {
                let notifications = snapshot.context("Notification feed failed")?;
                output.display(&NotificationList(notifications))?;
                seen += 1;
                if limit.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            subscription.unsubscribe();
        }
    }
    Ok(())
}

pub async fn handle_settings_commands<S: DocumentStore>(
    command: SettingsCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    match command {
        SettingsCommands::Show { user_id } => {
            let user_id = ctx.user_or_self(user_id)?;
            let settings = notification_settings(&ctx.client, &user_id).await?;
            output.display(&SettingsView(settings))?;
        }
        SettingsCommands::Set {
            likes,
            comments,
            follows,
            new_posts,
        } => {
            let session = ctx.session().await?;
            let current = notification_settings(&ctx.client, &session.user_id).await?;
            let updated = NotificationSettings {
                likes: likes.unwrap_or(current.likes),
                comments: comments.unwrap_or(current.comments),
                follows: follows.unwrap_or(current.follows),
                new_posts: new_posts.unwrap_or(current.new_posts),
            };
            if update_notification_settings(&ctx.client, &session, updated).await? {
                output.success("Notification settings saved");
                output.display(&SettingsView(updated))?;
            } else {
                output.warning(&format!("{} has no profile", session.user_id));
            }
        }
    }
    Ok(())
}
