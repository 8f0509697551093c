use anyhow::{Context, Result};
use clap::Subcommand;
use snapgram::{
    DocumentStore, PhotoMeta,
    id::generate_document_id,
    rules::LikeTransition,
    workflows::{
        bookmarks::{get_bookmarked_posts, is_post_bookmarked, toggle_bookmark},
        comments::{create_comment, get_comments_by_post},
        posts::{LikeOutcome, NewPost, create_post, delete_post, get_feed, get_post, get_posts_by_user, toggle_like},
    },
};
use url::Url;

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;
use crate::views::{PostDetail, PostList};

pub const POST_EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Publish",
        commands: &[
            "snapgram --as alice post create --caption \"sunset\" --photo https://ucarecdn.com/0c1d2e3f/",
        ],
    },
    ExampleGroup {
        title: "Browse",
        commands: &[
            "snapgram post feed",
            "snapgram post by-user alice",
            "snapgram post show <post-id>          # post with its comments",
        ],
    },
];

pub const LIKE_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Likes",
    commands: &["snapgram --as bob like <post-id>", "snapgram --as bob like <post-id> --undo"],
}];

pub const BOOKMARK_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Bookmarks",
    commands: &["snapgram --as bob bookmark toggle <post-id>", "snapgram --as bob bookmark list"],
}];

pub const COMMENT_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Comments",
    commands: &["snapgram --as bob comment <post-id> \"great light\""],
}];

#[derive(Subcommand)]
pub enum PostCommands {
    /// Publish a post and notify followers
    Create {
        #[arg(long, default_value = "")]
        caption: String,
        /// CDN URL of an uploaded photo (repeatable)
        #[arg(long = "photo", required = true)]
        photos: Vec<String>,
    },

    /// Every post, newest first
    Feed,

    /// Posts by one user, newest first
    ByUser { user_id: String },

    /// A post with its comments
    Show { post_id: String },

    /// Delete one of the acting user's posts
    Delete { post_id: String },
}

#[derive(Subcommand)]
pub enum BookmarkCommands {
    /// Bookmark a post, or remove the bookmark if it is already saved
    Toggle { post_id: String },

    /// Posts the acting user has bookmarked
    List,
}

pub async fn handle_post_commands<S: DocumentStore>(
    command: PostCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    match command {
        PostCommands::Create { caption, photos } => {
            let session = ctx.session().await?;
            let photos = photos.iter().map(|url| photo_meta(url)).collect();
            let published = create_post(&ctx.client, &session, NewPost { caption, photos })
                .await
                .context("Failed to publish post")?;
            output.success(&format!(
                "Published {} and notified {} follower(s)",
                published.post.id, published.notified
            ));
            output.display(&PostList(vec![published.post]))?;
        }
        PostCommands::Feed => output.display(&PostList(get_feed(&ctx.client).await?))?,
        PostCommands::ByUser { user_id } => {
            output.display(&PostList(get_posts_by_user(&ctx.client, &user_id).await?))?;
        }
        PostCommands::Show { post_id } => match get_post(&ctx.client, &post_id).await? {
            Some(post) => {
                let comments = get_comments_by_post(&ctx.client, &post_id).await?;
                output.display(&PostDetail { post, comments })?;
            }
            None => output.warning(&format!("Post {post_id} not found")),
        },
        PostCommands::Delete { post_id } => {
            let session = ctx.session().await?;
            if delete_post(&ctx.client, &session, &post_id).await? {
                output.success(&format!("Deleted {post_id}"));
            } else {
                output.warning(&format!("{post_id} was not deleted"));
            }
        }
    }
    Ok(())
}

pub async fn handle_like<S: DocumentStore>(
    post_id: &str,
    undo: bool,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    match toggle_like(&ctx.client, &session, post_id, !undo).await? {
        LikeOutcome::Changed {
            likes,
            transition,
            notification,
        } => {
            let verb = match transition {
                LikeTransition::Liked => "Liked",
                LikeTransition::Unliked => "Unliked",
            };
            output.event(ICONS.heart, &format!("{verb} {post_id} ({likes} like(s))"));
            if let Some(outcome) = notification {
                output.verbose(&format!("author notification: {outcome:?}"));
            }
        }
        LikeOutcome::Unchanged => output.info("Nothing changed"),
        LikeOutcome::Rejected => output.warning("You cannot like your own post"),
        LikeOutcome::PostMissing => output.warning(&format!("Post {post_id} not found")),
    }
    Ok(())
}

pub async fn handle_bookmark_commands<S: DocumentStore>(
    command: BookmarkCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    match command {
        BookmarkCommands::Toggle { post_id } => {
            let current = is_post_bookmarked(&ctx.client, &session.user_id, &post_id).await?;
            let now = toggle_bookmark(&ctx.client, &session, &post_id, current).await?;
            if now == current {
                output.warning(&format!("Bookmark on {post_id} unchanged"));
            } else if now {
                output.event(ICONS.bookmark, &format!("Saved {post_id}"));
            } else {
                output.event(ICONS.bookmark, &format!("Removed {post_id} from bookmarks"));
            }
        }
        BookmarkCommands::List => {
            output.display(&PostList(get_bookmarked_posts(&ctx.client, &session.user_id).await?))?;
        }
    }
    Ok(())
}

pub async fn handle_comment<S: DocumentStore>(
    post_id: &str,
    text: &str,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    match create_comment(&ctx.client, &session, post_id, text)
        .await
        .context("Failed to comment")?
    {
        Some(posted) => {
            output.success(&format!("Commented on {post_id}"));
            output.verbose(&format!("author notification: {:?}", posted.notification));
        }
        None => output.warning(&format!("Post {post_id} not found")),
    }
    Ok(())
}

/// Uploaded images carry their uuid as the first path segment of the CDN URL.
fn photo_meta(cdn_url: &str) -> PhotoMeta {
    let uuid = Url::parse(cdn_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.find(|segment| !segment.is_empty()).map(str::to_string))
        })
        .unwrap_or_else(generate_document_id);
    PhotoMeta {
        cdn_url: cdn_url.to_string(),
        uuid,
    }
}
