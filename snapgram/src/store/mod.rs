//! The document-store seam.
//!
//! Storage, query execution and change delivery are owned by the backend. The social layer
//! only issues whole-document writes, single-document field patches, equality/containment
//! queries, and per-collection change subscriptions.

mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::StoreError;

/// A single field mutation, applied atomically with the other operations of one patch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FieldOp {
    Assign { field: String, value: Value },
    /// Appends each value not already present.
    ArrayUnion { field: String, values: Vec<Value> },
    /// Removes every occurrence of each value.
    ArrayRemove { field: String, values: Vec<Value> },
    Increment { field: String, by: i64 },
    MapAssign { field: String, key: String, value: Value },
    MapIncrement { field: String, key: String, by: i64 },
}

impl FieldOp {
    pub fn assign(field: &str, value: impl Into<Value>) -> Self {
        FieldOp::Assign {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn array_union(field: &str, value: &str) -> Self {
        FieldOp::ArrayUnion {
            field: field.to_string(),
            values: vec![Value::String(value.to_string())],
        }
    }

    pub fn array_remove(field: &str, value: &str) -> Self {
        FieldOp::ArrayRemove {
            field: field.to_string(),
            values: vec![Value::String(value.to_string())],
        }
    }

    pub fn increment(field: &str, by: i64) -> Self {
        FieldOp::Increment {
            field: field.to_string(),
            by,
        }
    }

    pub fn map_assign(field: &str, key: &str, value: impl Into<Value>) -> Self {
        FieldOp::MapAssign {
            field: field.to_string(),
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn map_increment(field: &str, key: &str, by: i64) -> Self {
        FieldOp::MapIncrement {
            field: field.to_string(),
            key: key.to_string(),
            by,
        }
    }

    /// Applies the operation to a document body. Mirrors `lua/document_patch.lua`.
    pub fn apply(&self, document: &mut Map<String, Value>) {
        match self {
            FieldOp::Assign { field, value } => {
                document.insert(field.clone(), value.clone());
            }
            FieldOp::ArrayUnion { field, values } => {
                let list = array_entry(document, field);
                for value in values {
                    if !list.contains(value) {
                        list.push(value.clone());
                    }
                }
            }
            FieldOp::ArrayRemove { field, values } => {
                let list = array_entry(document, field);
                list.retain(|item| !values.contains(item));
            }
            FieldOp::Increment { field, by } => {
                let current = document.get(field).and_then(Value::as_i64).unwrap_or(0);
                document.insert(field.clone(), Value::from(current + by));
            }
            FieldOp::MapAssign { field, key, value } => {
                map_entry(document, field).insert(key.clone(), value.clone());
            }
            FieldOp::MapIncrement { field, key, by } => {
                let map = map_entry(document, field);
                let current = map.get(key).and_then(Value::as_i64).unwrap_or(0);
                map.insert(key.clone(), Value::from(current + by));
            }
        }
    }
}

fn array_entry<'a>(document: &'a mut Map<String, Value>, field: &str) -> &'a mut Vec<Value> {
    let slot = document.entry(field.to_string()).or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(list) => list,
        _ => unreachable!("slot was just replaced with an array"),
    }
}

fn map_entry<'a>(document: &'a mut Map<String, Value>, field: &str) -> &'a mut Map<String, Value> {
    let slot = document.entry(field.to_string()).or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

/// Query predicate over a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    /// The field is an array holding `value`.
    Contains { field: String, value: Value },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Filter::Contains {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::Eq { field, value } => document.get(field) == Some(value),
            Filter::Contains { field, value } => document
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

pub fn matches_all(filters: &[Filter], document: &Value) -> bool {
    filters.iter().all(|filter| filter.matches(document))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Set,
    Patched,
    Deleted,
    /// Events may have been dropped; consumers should reload.
    Resync,
}

/// Notification that a document in a watched collection changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(collection: &str, id: &str, kind: ChangeKind) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
        }
    }
}

pub type ChangeStream = LocalBoxStream<'static, ChangeEvent>;

/// Backend contract for the external document store.
///
/// Each call is independent: there are no transactions spanning documents. A single
/// `patch` is atomic with respect to its own document.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Creates or replaces a whole document.
    async fn set(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Applies field operations to an existing document; `NotFound` if it is absent.
    async fn patch(&self, collection: &str, id: &str, ops: &[FieldOp]) -> Result<(), StoreError>;

    /// Returns `true` when a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;

    /// Opens a stream of change events for one collection. Dropping it unsubscribes.
    async fn watch(&self, collection: &str) -> Result<ChangeStream, StoreError>;
}
