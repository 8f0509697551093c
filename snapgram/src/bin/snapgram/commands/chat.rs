use anyhow::{Context, Result};
use clap::Subcommand;
use snapgram::{
    DocumentStore,
    workflows::chat::{
        OutgoingMessage, get_chat_room, get_messages, get_or_create_chat_room, list_chat_rooms, mark_messages_read,
        send_chat_message, subscribe_messages, unread_message_count,
    },
};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;
use crate::views::{MessageList, RoomList};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Messaging",
        commands: &[
            "snapgram --as bob chat send alice \"hey!\"",
            "snapgram --as alice chat read bob       # show the thread and clear unread",
            "snapgram --as alice chat watch bob --limit 5",
        ],
    },
    ExampleGroup {
        title: "Inbox",
        commands: &["snapgram --as alice chat rooms", "snapgram --as alice chat unread"],
    },
];

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Send a message, opening a room if needed
    Send { user_id: String, content: String },

    /// Show the thread with a user and mark it read
    Read { user_id: String },

    /// Rooms the acting user is in
    Rooms,

    /// Total unread messages
    Unread,

    /// Print the thread each time it changes
    Watch {
        user_id: String,
        /// Stop after this many snapshots
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub async fn handle_chat_commands<S: DocumentStore>(
    command: ChatCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    let cdn_host = ctx.settings.media.cdn_host.clone();

    match command {
        ChatCommands::Send { user_id, content } => {
            let room = get_or_create_chat_room(&ctx.client, &session.user_id, &user_id).await?;
            let sent = send_chat_message(&ctx.client, &session, &room.id, OutgoingMessage::new(&user_id, content))
                .await
                .context("Failed to send message")?;
            match sent {
                Some(message) => output.event(ICONS.chat, &format!("Sent to {} in {}", message.receiver_id, room.id)),
                None => output.warning(&format!("Room {} disappeared", room.id)),
            }
        }
        ChatCommands::Read { user_id } => {
            let Some(room) = get_chat_room(&ctx.client, &session.user_id, &user_id).await? else {
                output.info(&format!("No conversation with {user_id} yet"));
                return Ok(());
            };
            let messages = get_messages(&ctx.client, &room.id).await?;
            output.display(&MessageList {
                cdn_host,
                room_id: room.id.clone(),
                messages,
            })?;
            mark_messages_read(&ctx.client, &room.id, &session.user_id).await?;
        }
        ChatCommands::Rooms => {
            let rooms = list_chat_rooms(&ctx.client, &session.user_id).await?;
            output.display(&RoomList {
                user_id: session.user_id.clone(),
                rooms,
            })?;
        }
        ChatCommands::Unread => {
            let count = unread_message_count(&ctx.client, &session.user_id).await?;
            if output.is_json() {
                println!("{}", serde_json::json!({ "unread": count }));
            } else {
                output.event(ICONS.chat, &format!("{count} unread message(s)"));
            }
        }
        ChatCommands::Watch { user_id, limit } => {
            let room = get_or_create_chat_room(&ctx.client, &session.user_id, &user_id).await?;
            let mut subscription = subscribe_messages(&ctx.client, &room.id);
            let mut seen = 0;
            while let Some(snapshot) = subscription.next().await {
                let messages = snapshot.context("Message feed failed")?;
                output.display(&MessageList {
                    cdn_host: cdn_host.clone(),
                    room_id: room.id.clone(),
                    messages,
                })?;
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
