use std::path::Path;

use anyhow::{Context, Result};
use snapgram::{
    Client, DocumentStore, MemoryStore, RedisStore, Session, Settings,
    workflows::profiles::profile_or_default,
};

/// Everything a command needs: the connected client, settings, and who is acting.
pub struct AppContext<S> {
    pub client: Client<S>,
    pub settings: Settings,
    acting_user: Option<String>,
}

impl AppContext<RedisStore> {
    pub async fn connect(settings: Settings, acting_user: Option<String>) -> Result<Self> {
        let client = Client::connect(&settings)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self {
            client,
            settings,
            acting_user,
        })
    }
}

impl AppContext<MemoryStore> {
    /// An empty throwaway store; nothing outlives the process.
    pub fn in_memory(settings: Settings, acting_user: Option<String>) -> Self {
        let client = Client::in_memory().with_media(settings.media.clone());
        Self {
            client,
            settings,
            acting_user,
        }
    }
}

impl<S: DocumentStore> AppContext<S> {
    /// Resolves `--as` into a session, filling display fields from the stored profile.
    pub async fn session(&self) -> Result<Session> {
        let user_id = self
            .acting_user
            .as_deref()
            .context("This command needs an acting user; pass --as <user> or set SNAPGRAM_USER")?;
        let profile = profile_or_default(&self.client, user_id)
            .await
            .with_context(|| format!("Failed to load profile for {user_id}"))?;
        Ok(Session::from_profile(&profile))
    }

    /// The explicit user if given, otherwise the acting user.
    pub fn user_or_self(&self, user_id: Option<String>) -> Result<String> {
        user_id
            .or_else(|| self.acting_user.clone())
            .context("Pass a user id or --as <user>")
    }
}

/// Loads settings from `path`, falling back to defaults when it does not exist.
pub fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load(path).with_context(|| format!("Failed to load {}", path.display()))
}
