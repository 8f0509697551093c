use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use snapgram::{
    DocumentStore,
    workflows::{
        posts::update_author_info_on_posts,
        profiles::{
            NewProfile, ProfileUpdate, create_user_profile, find_user_by_email, get_user_profile,
            list_other_users, set_privacy, update_user_profile,
        },
    },
};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;
use crate::theme::ICONS;
use crate::views::{ProfileList, ProfileView};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Create & Inspect",
        commands: &[
            "snapgram profile create alice --name Alice --email alice@example.com",
            "snapgram profile show bob",
            "snapgram --as alice profile list      # everyone except alice",
        ],
    },
    ExampleGroup {
        title: "Edit",
        commands: &[
            "snapgram --as alice profile update --bio \"film photos only\"",
            "snapgram --as alice profile privacy private",
        ],
    },
];

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Create a public profile with empty relationship sets
    Create {
        user_id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        photo: String,
        #[arg(long, default_value = "")]
        bio: String,
        #[arg(long)]
        email: Option<String>,
    },

    /// Show a profile (defaults to the acting user)
    Show {
        user_id: Option<String>,
        /// Look the user up by email instead of id
        #[arg(long, conflicts_with = "user_id")]
        email: Option<String>,
    },

    /// List every other user
    List,

    /// Edit the acting user's display fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        photo: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },

    /// Make the acting user's account public or private
    Privacy {
        #[arg(value_enum)]
        visibility: Visibility,
    },
}

pub async fn handle_profile_commands<S: DocumentStore>(
    command: ProfileCommands,
    ctx: &AppContext<S>,
    output: &OutputManager,
) -> Result<()> {
    match command {
        ProfileCommands::Create {
            user_id,
            name,
            photo,
            bio,
            email,
        } => {
            let profile = create_user_profile(
                &ctx.client,
                NewProfile {
                    user_id,
                    display_name: name,
                    photo_url: photo,
                    bio,
                    email,
                },
            )
            .await
            .context("Failed to create profile")?;
            output.success(&format!("Created profile {}", profile.user_id));
            output.display(&ProfileView(profile))?;
        }
        ProfileCommands::Show { user_id, email } => {
            let profile = match email {
                Some(email) => find_user_by_email(&ctx.client, &email).await?,
                None => get_user_profile(&ctx.client, &ctx.user_or_self(user_id)?).await?,
            };
            match profile {
                Some(profile) => output.display(&ProfileView(profile))?,
                None => output.warning("No such profile"),
            }
        }
        ProfileCommands::List => {
            let session = ctx.session().await?;
            let users = list_other_users(&ctx.client, &session).await?;
            output.display(&ProfileList(users))?;
        }
        ProfileCommands::Update { name, photo, bio } => {
            let session = ctx.session().await?;
            let touches_author_fields = name.is_some() || photo.is_some();
            let update = ProfileUpdate {
                display_name: name,
                photo_url: photo,
                bio,
            };
            if !update_user_profile(&ctx.client, &session, update).await? {
                output.warning(&format!("{} has no profile to update", session.user_id));
                return Ok(());
            }
            output.success("Profile updated");
            if touches_author_fields {
                let refreshed = ctx.session().await?;
                let count = update_author_info_on_posts(&ctx.client, &refreshed).await?;
                output.verbose(&format!("Refreshed author info on {count} post(s)"));
            }
        }
        ProfileCommands::Privacy { visibility } => {
            let session = ctx.session().await?;
            let is_private = matches!(visibility, Visibility::Private);
            if set_privacy(&ctx.client, &session, is_private).await? {
                let icon = if is_private { ICONS.lock } else { ICONS.unlock };
                let state = if is_private { "private" } else { "public" };
                output.event(icon, &format!("{} is now {state}", session.user_id));
            } else {
                output.warning(&format!("{} has no profile", session.user_id));
            }
        }
    }
    Ok(())
}
