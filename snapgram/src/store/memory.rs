use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast, broadcast::error::RecvError};

use super::{ChangeEvent, ChangeKind, ChangeStream, DocumentStore, FieldOp, Filter, matches_all};
use crate::errors::StoreError;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// In-process document store with the same semantics as [`RedisStore`](super::RedisStore).
///
/// Clones share state. Writes to a collection can be made to fail on demand, which lets
/// callers exercise partially applied dual-writes.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    failing: RwLock<HashSet<String>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                failing: RwLock::new(HashSet::new()),
                changes,
            }),
        }
    }

    /// Makes every subsequent write to `collection` fail until [`heal`](Self::heal) is called.
    pub async fn fail_writes_to(&self, collection: &str) {
        self.inner.failing.write().await.insert(collection.to_string());
    }

    pub async fn heal(&self) {
        self.inner.failing.write().await.clear();
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.inner
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    async fn check_writable(&self, collection: &str) -> Result<(), StoreError> {
        if self.inner.failing.read().await.contains(collection) {
            return Err(StoreError::Other {
                message: format!("writes to {collection} are unavailable").into(),
            });
        }
        Ok(())
    }

    fn publish(&self, collection: &str, id: &str, kind: ChangeKind) {
        // No receivers is not an error.
        let _ = self.inner.changes.send(ChangeEvent::new(collection, id, kind));
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.inner.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.check_writable(collection).await?;
        if !document.is_object() {
            return Err(StoreError::InvalidRequest {
                message: format!("document {collection}/{id} must be a JSON object"),
            });
        }
        self.inner
            .collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        self.publish(collection, id, ChangeKind::Set);
        Ok(())
    }

    async fn patch(&self, collection: &str, id: &str, ops: &[FieldOp]) -> Result<(), StoreError> {
        self.check_writable(collection).await?;
        {
            let mut collections = self.inner.collections.write().await;
            let body = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            for op in ops {
                op.apply(body);
            }
        }
        self.publish(collection, id, ChangeKind::Patched);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        self.check_writable(collection).await?;
        let removed = self
            .inner
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            self.publish(collection, id, ChangeKind::Deleted);
        }
        Ok(removed)
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let collections = self.inner.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| matches_all(filters, doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn watch(&self, collection: &str) -> Result<ChangeStream, StoreError> {
        let receiver = self.inner.changes.subscribe();
        let collection = collection.to_string();
        let stream = futures::stream::unfold(receiver, move |mut receiver| {
            let collection = collection.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(event) if event.collection == collection => return Some((event, receiver)),
                        Ok(_) => continue,
                        Err(RecvError::Lagged(skipped)) => {
                            log::warn!("change stream for {collection} lagged by {skipped} events");
                            let event = ChangeEvent::new(&collection, "", ChangeKind::Resync);
                            return Some((event, receiver));
                        }
                        Err(RecvError::Closed) => return None,
                    }
                }
            }
        });
        Ok(stream.boxed_local())
    }
}
