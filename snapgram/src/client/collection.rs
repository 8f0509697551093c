use std::marker::PhantomData;

use crate::{
    errors::StoreError,
    models::Document,
    store::{DocumentStore, FieldOp, Filter},
};

use super::Subscription;

/// Type-safe accessor for CRUD operations on one collection.
pub struct CollectionHandle<'a, S, T> {
    store: &'a S,
    _entity: PhantomData<T>,
}

impl<'a, S, T> CollectionHandle<'a, S, T>
where
    S: DocumentStore,
    T: Document,
{
    pub(crate) fn new(store: &'a S) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.store.get(T::COLLECTION, id).await?.is_some())
    }

    /// Writes the whole document under its own id.
    pub async fn create(&self, entity: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(entity)?;
        self.store.set(T::COLLECTION, entity.document_id(), value).await
    }

    pub async fn update(&self, id: &str, ops: &[FieldOp]) -> Result<(), StoreError> {
        self.store.patch(T::COLLECTION, id, ops).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn find_many(&self, filters: &[Filter]) -> Result<Vec<T>, StoreError> {
        self.store
            .query(T::COLLECTION, filters)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    pub async fn find_first(&self, filters: &[Filter]) -> Result<Option<T>, StoreError> {
        Ok(self.find_many(filters).await?.into_iter().next())
    }

    pub async fn count_where(&self, filters: &[Filter]) -> Result<usize, StoreError> {
        Ok(self.store.query(T::COLLECTION, filters).await?.len())
    }

    /// Live view over the documents matching `filters`. Nothing is read until the first poll.
    pub fn subscribe(&self, filters: Vec<Filter>) -> Subscription<'a, S, T> {
        Subscription::new(self.store, filters)
    }
}
