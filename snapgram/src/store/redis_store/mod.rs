//! Redis backend: JSON documents under namespaced keys, one index set per collection,
//! single-document patches through a Lua script, and change events over pub/sub.

pub mod commands;
pub mod scripts;

use futures::StreamExt;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde_json::Value;

use super::{ChangeEvent, ChangeKind, ChangeStream, DocumentStore, FieldOp, Filter, matches_all};
use crate::{errors::StoreError, keys::KeyContext};
use commands::{PatchCommand, execute_patch};

#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
    conn: ConnectionManager,
    prefix: String,
    service: String,
}

impl RedisStore {
    /// Connects to `url` and namespaces every key under `prefix:service`.
    pub async fn connect(
        url: &str,
        prefix: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client.clone()).await?;
        Ok(Self {
            client,
            conn,
            prefix: prefix.into(),
            service: service.into(),
        })
    }

    pub fn keys(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix, &self.service)
    }

    async fn publish(&self, collection: &str, id: &str, kind: ChangeKind) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&ChangeEvent::new(collection, id, kind))?;
        let mut conn = self.conn.clone();
        let _receivers: i64 = conn.publish(self.keys().changes(collection), payload).await?;
        Ok(())
    }
}

impl DocumentStore for RedisStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.keys().document(collection, id)).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::InvalidRequest {
                message: format!("document {collection}/{id} must be a JSON object"),
            });
        }
        let keys = self.keys();
        let payload = serde_json::to_string(&document)?;
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(keys.document(collection, id), payload)
            .ignore()
            .sadd(keys.collection_index(collection), id)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;
        log::debug!("set {collection}/{id}");
        self.publish(collection, id, ChangeKind::Set).await
    }

    async fn patch(&self, collection: &str, id: &str, ops: &[FieldOp]) -> Result<(), StoreError> {
        let command = PatchCommand::new(self.keys().document(collection, id), ops);
        let mut conn = self.conn.clone();
        execute_patch(&mut conn, collection, id, &command).await?;
        log::debug!("patched {collection}/{id} with {} operation(s)", ops.len());
        self.publish(collection, id, ChangeKind::Patched).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let keys = self.keys();
        let mut conn = self.conn.clone();
        let (deleted, _): (u64, u64) = redis::pipe()
            .atomic()
            .del(keys.document(collection, id))
            .srem(keys.collection_index(collection), id)
            .query_async(&mut conn)
            .await?;
        if deleted > 0 {
            self.publish(collection, id, ChangeKind::Deleted).await?;
        }
        Ok(deleted > 0)
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let keys = self.keys();
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(keys.collection_index(collection)).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let document_keys: Vec<String> = ids.iter().map(|id| keys.document(collection, id)).collect();
        let raw: Vec<Option<String>> = redis::cmd("MGET").arg(&document_keys).query_async(&mut conn).await?;

        let mut documents = Vec::new();
        for json in raw.into_iter().flatten() {
            let document: Value = serde_json::from_str(&json)?;
            if matches_all(filters, &document) {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    async fn watch(&self, collection: &str) -> Result<ChangeStream, StoreError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(self.keys().changes(collection)).await?;
        let stream = pubsub.into_on_message().filter_map(|message| async move {
            let payload: String = message.get_payload().ok()?;
            match serde_json::from_str::<ChangeEvent>(&payload) {
                Ok(event) => Some(event),
                Err(err) => {
                    log::warn!("dropping malformed change event: {err}");
                    None
                }
            }
        });
        Ok(stream.boxed_local())
    }
}
