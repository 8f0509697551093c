use std::{cmp::Ordering, marker::PhantomData};

use futures::StreamExt;

use crate::{
    errors::StoreError,
    models::Document,
    store::{ChangeStream, DocumentStore, Filter},
};

/// A lazy, restartable sequence of snapshots of the documents matching a query.
///
/// The first call to [`next`](Self::next) opens the change feed and yields the current
/// snapshot; each later call waits for a change in the collection and yields a fresh one.
/// Dropping the subscription, or calling [`unsubscribe`](Self::unsubscribe), closes the feed.
pub struct Subscription<'a, S, T> {
    store: &'a S,
    filters: Vec<Filter>,
    order: Option<fn(&T, &T) -> Ordering>,
    changes: Option<ChangeStream>,
    closed: bool,
    _entity: PhantomData<T>,
}

impl<'a, S, T> Subscription<'a, S, T>
where
    S: DocumentStore,
    T: Document,
{
    pub(crate) fn new(store: &'a S, filters: Vec<Filter>) -> Self {
        Self {
            store,
            filters,
            order: None,
            changes: None,
            closed: false,
            _entity: PhantomData,
        }
    }

    /// Sorts every snapshot with `order`.
    pub fn ordered_by(mut self, order: fn(&T, &T) -> Ordering) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns the next snapshot, or `None` once the subscription is closed.
    pub async fn next(&mut self) -> Option<Result<Vec<T>, StoreError>> {
        if self.closed {
            return None;
        }

        match self.changes.as_mut() {
            None => {
                // Subscribe before reading so no change slips between the two.
                match self.store.watch(T::COLLECTION).await {
                    Ok(stream) => self.changes = Some(stream),
                    Err(err) => return Some(Err(err)),
                }
            }
            Some(stream) => {
                if stream.next().await.is_none() {
                    log::debug!("change feed for {} ended", T::COLLECTION);
                    self.closed = true;
                    return None;
                }
            }
        }

        Some(self.snapshot().await)
    }

    /// Drops the change feed; the next poll starts over with a fresh initial snapshot.
    pub fn restart(&mut self) {
        self.changes = None;
        self.closed = false;
    }

    pub fn unsubscribe(mut self) {
        self.changes = None;
        self.closed = true;
        log::debug!("unsubscribed from {}", T::COLLECTION);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    async fn snapshot(&self) -> Result<Vec<T>, StoreError> {
        let mut items = self
            .store
            .query(T::COLLECTION, &self.filters)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect::<Result<Vec<T>, _>>()?;
        if let Some(order) = self.order {
            items.sort_by(order);
        }
        Ok(items)
    }
}
