//! Profile creation, lookup and editing.

use crate::{
    client::Client,
    errors::{SocialError, StoreError, ValidationError, ValidationIssue},
    models::UserProfile,
    session::Session,
    store::{DocumentStore, FieldOp, Filter},
    validators::{is_valid_email, is_valid_url},
};

/// Fields a user may set when signing up.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub user_id: String,
    pub display_name: String,
    pub photo_url: String,
    pub bio: String,
    pub email: Option<String>,
}

/// Partial profile edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
}

/// Creates a public profile with empty relationship sets.
pub async fn create_user_profile<S: DocumentStore>(
    client: &Client<S>,
    new_profile: NewProfile,
) -> Result<UserProfile, SocialError> {
    validate_new_profile(&new_profile)?;

    let mut profile = UserProfile::empty(new_profile.user_id);
    profile.display_name = new_profile.display_name;
    profile.photo_url = new_profile.photo_url;
    profile.bio = new_profile.bio;
    profile.email = new_profile.email;

    client.collection::<UserProfile>().create(&profile).await?;
    log::debug!("created profile {}", profile.user_id);
    Ok(profile)
}

pub async fn get_user_profile<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<Option<UserProfile>, SocialError> {
    Ok(client.collection::<UserProfile>().get(user_id).await?)
}

/// The stored profile, or [`UserProfile::empty`] when there is none.
pub async fn profile_or_default<S: DocumentStore>(
    client: &Client<S>,
    user_id: &str,
) -> Result<UserProfile, SocialError> {
    Ok(match get_user_profile(client, user_id).await? {
        Some(profile) => profile,
        None => {
            log::warn!("user {user_id} has no profile; using an empty one");
            UserProfile::empty(user_id)
        }
    })
}

/// Every profile except the caller's.
pub async fn list_other_users<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
) -> Result<Vec<UserProfile>, SocialError> {
    let mut users: Vec<UserProfile> = client
        .collection::<UserProfile>()
        .find_many(&[])
        .await?
        .into_iter()
        .filter(|profile| !session.is(&profile.user_id))
        .collect();
    users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(users)
}

/// Applies `update` to the caller's profile. Returns `false` when there is no profile.
pub async fn update_user_profile<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    update: ProfileUpdate,
) -> Result<bool, SocialError> {
    if let Some(photo_url) = update.photo_url.as_deref()
        && !photo_url.is_empty()
        && !is_valid_url(photo_url)
    {
        return Err(ValidationError::single("photo_url", "url", "photo_url must be a valid URL").into());
    }

    let mut ops = Vec::new();
    if let Some(display_name) = update.display_name {
        ops.push(FieldOp::assign("display_name", display_name));
    }
    if let Some(photo_url) = update.photo_url {
        ops.push(FieldOp::assign("photo_url", photo_url));
    }
    if let Some(bio) = update.bio {
        ops.push(FieldOp::assign("bio", bio));
    }
    if ops.is_empty() {
        return Ok(true);
    }

    match client.collection::<UserProfile>().update(&session.user_id, &ops).await {
        Ok(()) => Ok(true),
        Err(err @ StoreError::NotFound { .. }) => {
            log::warn!("profile update skipped: {err}");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Switches the caller's account between public and private.
pub async fn set_privacy<S: DocumentStore>(
    client: &Client<S>,
    session: &Session,
    is_private: bool,
) -> Result<bool, SocialError> {
    match client
        .collection::<UserProfile>()
        .update(&session.user_id, &[FieldOp::assign("is_private", is_private)])
        .await
    {
        Ok(()) => Ok(true),
        Err(err @ StoreError::NotFound { .. }) => {
            log::warn!("privacy change skipped: {err}");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Looks up a profile by email address.
pub async fn find_user_by_email<S: DocumentStore>(
    client: &Client<S>,
    email: &str,
) -> Result<Option<UserProfile>, SocialError> {
    Ok(client
        .collection::<UserProfile>()
        .find_first(&[Filter::eq("email", email)])
        .await?)
}

fn validate_new_profile(profile: &NewProfile) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    if profile.user_id.trim().is_empty() {
        issues.push(ValidationIssue::new("user_id", "required", "user_id is required"));
    }
    if let Some(email) = profile.email.as_deref()
        && !is_valid_email(email)
    {
        issues.push(ValidationIssue::new("email", "email", "email must be a valid address"));
    }
    if !profile.photo_url.is_empty() && !is_valid_url(&profile.photo_url) {
        issues.push(ValidationIssue::new("photo_url", "url", "photo_url must be a valid URL"));
    }
    ValidationError::new(issues).into_result()
}
