//! Typed access to the document store.
//!
//! This module provides:
//! - `Client` - entry point wrapping a [`DocumentStore`] backend
//! - `CollectionHandle<T>` - type-safe accessor for one collection
//! - `Subscription<T>` - lazily re-queried snapshots of a live collection
//!
//! # Example
//! ```ignore
//! let client = Client::new(MemoryStore::new());
//! let profile = client.collection::<UserProfile>().get("alice").await?;
//! ```

mod collection;
mod subscription;

pub use collection::CollectionHandle;
pub use subscription::Subscription;

use crate::{
    config::{MediaSettings, Settings},
    errors::StoreError,
    models::{Document, MessageKind},
    store::{DocumentStore, MemoryStore, RedisStore},
};

/// Main client for the social workflows.
#[derive(Clone)]
pub struct Client<S> {
    store: S,
    media: MediaSettings,
}

impl<S: DocumentStore> Client<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            media: MediaSettings::default(),
        }
    }

    pub fn with_media(mut self, media: MediaSettings) -> Self {
        self.media = media;
        self
    }

    /// Get a type-safe handle for the specified collection.
    pub fn collection<T: Document>(&self) -> CollectionHandle<'_, S, T> {
        CollectionHandle::new(&self.store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn message_kind(&self, content: &str) -> MessageKind {
        MessageKind::classify(content, &self.media.cdn_host)
    }
}

impl Client<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Client<RedisStore> {
    /// Create a client from configuration.
    ///
    /// # Example
    /// ```ignore
    /// let client = Client::connect(&Settings::load(path)?).await?;
    /// ```
    pub async fn connect(settings: &Settings) -> Result<Self, StoreError> {
        let url = settings.redis_url().map_err(|err| StoreError::InvalidRequest {
            message: err.to_string(),
        })?;
        let store = RedisStore::connect(&url, &settings.store.prefix, &settings.store.service).await?;
        Ok(Self::new(store).with_media(settings.media.clone()))
    }
}
