//! Table and compact renderings of library types.

use comfy_table::{Cell, Table};
use serde::Serialize;
use snapgram::{
    ChatMessage, ChatRoom, Comment, MessageKind, Notification, NotificationSettings, Post, UserProfile,
    workflows::integrity::IntegrityReport,
};

use crate::output::{OutputManager, TableDisplay};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct ProfileView(pub UserProfile);

impl TableDisplay for ProfileView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let profile = &self.0;
        let mut table = output.create_table(&["Field", "Value"]);
        table.add_row(vec![Cell::new("user"), Cell::new(&profile.user_id)]);
        table.add_row(vec![Cell::new("name"), Cell::new(&profile.display_name)]);
        table.add_row(vec![Cell::new("bio"), Cell::new(&profile.bio)]);
        table.add_row(vec![Cell::new("private"), Cell::new(yes_no(profile.is_private))]);
        table.add_row(vec![Cell::new("followers"), Cell::new(profile.followers.len())]);
        table.add_row(vec![Cell::new("following"), Cell::new(profile.following.len())]);
        table.add_row(vec![Cell::new("pending requests"), Cell::new(profile.follow_requests.len())]);
        table.add_row(vec![Cell::new("bookmarks"), Cell::new(profile.bookmarks.len())]);
        table
    }

    fn to_compact(&self) -> String {
        let profile = &self.0;
        format!(
            "{} ({}) followers={} following={} private={}",
            profile.user_id,
            profile.display_name,
            profile.followers.len(),
            profile.following.len(),
            profile.is_private
        )
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct ProfileList(pub Vec<UserProfile>);

impl TableDisplay for ProfileList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["User", "Name", "Private", "Followers"]);
        for profile in &self.0 {
            table.add_row(vec![
                Cell::new(&profile.user_id),
                Cell::new(&profile.display_name),
                Cell::new(yes_no(profile.is_private)),
                Cell::new(profile.followers.len()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().map(|p| p.user_id.as_str()).collect::<Vec<_>>().join(" ")
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct PostList(pub Vec<Post>);

impl TableDisplay for PostList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["Post", "Author", "Caption", "Photos", "Likes", "Date"]);
        for post in &self.0 {
            table.add_row(vec![
                Cell::new(&post.id),
                Cell::new(&post.user_id),
                Cell::new(truncate(&post.caption, 40)),
                Cell::new(post.photos.len()),
                Cell::new(post.likes),
                Cell::new(post.date.format(TIME_FORMAT)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Count: {}", self.0.len())
    }
}

#[derive(Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

impl TableDisplay for PostDetail {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["When", "Who", "Text"]);
        table.add_row(vec![
            Cell::new(self.post.date.format(TIME_FORMAT)),
            Cell::new(&self.post.user_id),
            Cell::new(format!("{} ({} like(s))", self.post.caption, self.post.likes)),
        ]);
        for comment in &self.comments {
            table.add_row(vec![
                Cell::new(comment.date.format(TIME_FORMAT)),
                Cell::new(&comment.user_id),
                Cell::new(&comment.text),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "{} likes={} comments={}",
            self.post.id,
            self.post.likes,
            self.comments.len()
        )
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct NotificationList(pub Vec<Notification>);

impl TableDisplay for NotificationList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["Id", "Type", "From", "Message", "Read", "When"]);
        for notification in &self.0 {
            table.add_row(vec![
                Cell::new(&notification.id),
                Cell::new(notification.kind),
                Cell::new(&notification.sender_id),
                Cell::new(&notification.message),
                Cell::new(yes_no(notification.read)),
                Cell::new(notification.timestamp.format(TIME_FORMAT)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let unread = self.0.iter().filter(|n| !n.read).count();
        format!("Count: {} unread: {unread}", self.0.len())
    }
}

#[derive(Serialize)]
pub struct MessageList {
    #[serde(skip)]
    pub cdn_host: String,
    pub room_id: String,
    pub messages: Vec<ChatMessage>,
}

impl TableDisplay for MessageList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["When", "From", "Kind", "Content"]);
        for message in &self.messages {
            let kind = match message.kind(&self.cdn_host) {
                MessageKind::Text => "text",
                MessageKind::Image => "image",
            };
            table.add_row(vec![
                Cell::new(message.timestamp.format(TIME_FORMAT)),
                Cell::new(&message.sender_id),
                Cell::new(kind),
                Cell::new(&message.content),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{} messages={}", self.room_id, self.messages.len())
    }
}

#[derive(Serialize)]
pub struct RoomList {
    #[serde(skip)]
    pub user_id: String,
    pub rooms: Vec<ChatRoom>,
}

impl TableDisplay for RoomList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["Room", "With", "Last message", "Unread"]);
        for room in &self.rooms {
            table.add_row(vec![
                Cell::new(&room.id),
                Cell::new(room.other_participant(&self.user_id).unwrap_or("-")),
                Cell::new(truncate(room.last_message.as_deref().unwrap_or(""), 40)),
                Cell::new(room.unread_for(&self.user_id)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("Rooms: {}", self.rooms.len())
    }
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct SettingsView(pub NotificationSettings);

impl TableDisplay for SettingsView {
    fn to_table(&self, output: &OutputManager) -> Table {
        let settings = &self.0;
        let mut table = output.create_table(&["Category", "Enabled"]);
        for (name, enabled) in [
            ("likes", settings.likes),
            ("comments", settings.comments),
            ("follows", settings.follows),
            ("new posts", settings.new_posts),
        ] {
            table.add_row(vec![Cell::new(name), Cell::new(yes_no(enabled))]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let settings = &self.0;
        format!(
            "likes={} comments={} follows={} new_posts={}",
            settings.likes, settings.comments, settings.follows, settings.new_posts
        )
    }
}

impl TableDisplay for IntegrityReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table(&["#", "Drift"]);
        for (index, drift) in self.drifts.iter().enumerate() {
            table.add_row(vec![Cell::new(index + 1), Cell::new(drift)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "users={} posts={} drifts={}",
            self.users_checked,
            self.posts_checked,
            self.drifts.len()
        )
    }
}
