use crate::models::UserProfile;

/// The authenticated caller, passed explicitly into every operation.
///
/// Sign-in and token handling belong to the identity provider; this only carries the
/// resolved identity plus the display fields denormalized into notifications, posts and
/// comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
    pub photo_url: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: String::new(),
            photo_url: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = photo_url.into();
        self
    }

    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
        }
    }

    pub fn is(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
