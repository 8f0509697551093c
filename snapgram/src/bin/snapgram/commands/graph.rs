use anyhow::Result;
use clap::Subcommand;
use snapgram::{
    DocumentStore,
    rules::FollowAction,
    workflows::social_graph::{
        get_followers, get_following, is_following, pending_follow_requests, resolve_follow_request, toggle_follow,
        unfollow_user,
    },
};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::views::ProfileList;

pub const FOLLOW_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Follow",
    commands: &[
        "snapgram --as bob follow alice        # follows, or requests if alice is private",
        "snapgram --as bob unfollow alice",
    ],
}];

pub const REQUEST_EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Follow Requests",
    commands: &[
        "snapgram --as carol requests list",
        "snapgram --as carol requests accept dave",
        "snapgram --as carol requests reject erin",
        "snapgram requests followers carol",
    ],
}];

#[derive(Subcommand)]
pub enum RequestCommands {
    /// Show requests waiting for the acting user's approval
    List,

    /// Accept a pending request
    Accept { requester: String },

    /// Reject a pending request
    Reject { requester: String },

    /// List a user's followers (defaults to the acting user)
    Followers { user_id: Option<String> },

    /// List who a user follows (defaults to the acting user)
    Following { user_id: Option<String> },
}

pub async fn handle_follow<S: DocumentStore>(target: &str, ctx: &AppContext<S>, output: &OutputManager) -> Result<()> {
    let session = ctx.session().await?;
    if is_following(&ctx.client, &session.user_id, target).await? {
        output.info(&format!("{} already follows {target}", session.user_id));
        return Ok(());
    }

    match toggle_follow(&ctx.client, &session, target).await? {
        FollowAction::Follow => output.success(&format!("{} now follows {target}", session.user_id)),
        FollowAction::Request => output.success(&format!("Follow request sent to {target}")),
        FollowAction::Unfollow => output.info(&format!("{} unfollowed {target}", session.user_id)),
        FollowAction::Noop => output.warning(&format!("Nothing to do for {target}")),
    }
    Ok(())
}

pub async fn handle_unfollow<S: DocumentStore>(target: &str, ctx: &AppContext<S>, output: &OutputManager) -> Result<()> {
    let session = ctx.session().await?;
    if unfollow_user(&ctx.client, &session, target).await? {
        output.success(&format!("{} unfollowed {target}", session.user_id));
    } else {
        output.warning(&format!("Could not unfollow {target}"));
    }
    Ok(())
}

pub async fn handle_request_commands<S: DocumentStore>(
    command: RequestCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    match command {
        RequestCommands::List => {
            let session = ctx.session().await?;
            let pending = pending_follow_requests(&ctx.client, &session).await?;
            if pending.is_empty() && !output.is_json() {
                output.info("No pending follow requests");
            } else {
                output.display(&ProfileList(pending))?;
            }
        }
        RequestCommands::Accept { requester } => resolve(&requester, true, ctx, output).await?,
        RequestCommands::Reject { requester } => resolve(&requester, false, ctx, output).await?,
        RequestCommands::Followers { user_id } => {
            let user_id = ctx.user_or_self(user_id)?;
            output.display(&ProfileList(get_followers(&ctx.client, &user_id).await?))?;
        }
        RequestCommands::Following { user_id } => {
            let user_id = ctx.user_or_self(user_id)?;
            output.display(&ProfileList(get_following(&ctx.client, &user_id).await?))?;
        }
    }
    Ok(())
}

async fn resolve<S: DocumentStore>(
    requester: &str,
    accept: bool,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    let session = ctx.session().await?;
    if !resolve_follow_request(&ctx.client, &session, requester, accept).await? {
        output.warning(&format!("No pending request from {requester}"));
    } else if accept {
        output.success(&format!("{requester} now follows {}", session.user_id));
    } else {
        output.info(&format!("Rejected follow request from {requester}"));
    }
    Ok(())
}
