use crate::commands::{chat, doctor, graph, notifications, posts, profile, tour};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "profile",
            groups: profile::EXAMPLES,
        },
        CommandExample {
            name: "follow",
            groups: graph::FOLLOW_EXAMPLES,
        },
        CommandExample {
            name: "unfollow",
            groups: graph::FOLLOW_EXAMPLES,
        },
        CommandExample {
            name: "requests",
            groups: graph::REQUEST_EXAMPLES,
        },
        CommandExample {
            name: "post",
            groups: posts::POST_EXAMPLES,
        },
        CommandExample {
            name: "like",
            groups: posts::LIKE_EXAMPLES,
        },
        CommandExample {
            name: "bookmark",
            groups: posts::BOOKMARK_EXAMPLES,
        },
        CommandExample {
            name: "comment",
            groups: posts::COMMENT_EXAMPLES,
        },
        CommandExample {
            name: "chat",
            groups: chat::EXAMPLES,
        },
        CommandExample {
            name: "notifications",
            groups: notifications::NOTIFICATION_EXAMPLES,
        },
        CommandExample {
            name: "settings",
            groups: notifications::SETTINGS_EXAMPLES,
        },
        CommandExample {
            name: "doctor",
            groups: doctor::EXAMPLES,
        },
        CommandExample {
            name: "tour",
            groups: tour::EXAMPLES,
        },
    ]
}
