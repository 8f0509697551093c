use std::borrow::Cow;

use redis::aio::ConnectionLike;
use serde::Serialize;
use serde_json::Value;

use super::scripts::DOCUMENT_PATCH_SCRIPT;
use crate::{errors::StoreError, store::FieldOp};

/// Payload handed to `document_patch.lua`.
#[derive(Debug, Serialize)]
pub struct PatchCommand<'a> {
    #[serde(skip)]
    pub key: String,
    pub operations: &'a [FieldOp],
}

impl<'a> PatchCommand<'a> {
    pub fn new(key: String, operations: &'a [FieldOp]) -> Self {
        Self { key, operations }
    }
}

/// Runs a patch through the Lua script and returns the updated document.
pub async fn execute_patch<C>(
    conn: &mut C,
    collection: &str,
    id: &str,
    command: &PatchCommand<'_>,
) -> Result<Value, StoreError>
where
    C: ConnectionLike + Send,
{
    let payload = serde_json::to_string(command).map_err(|err| StoreError::Other {
        message: Cow::Owned(format!("failed to serialize command: {err}")),
    })?;

    let mut invocation = DOCUMENT_PATCH_SCRIPT.prepare_invoke();
    invocation.key(&command.key);
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await?;

    let value: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Other {
        message: Cow::Owned(format!("failed to parse lua response: {err}")),
    })?;

    if let Some(error) = value.get("error") {
        return match error.as_str() {
            Some("document_not_found") => Err(StoreError::not_found(collection, id)),
            Some("unknown_operation") => Err(StoreError::InvalidRequest {
                message: format!(
                    "unknown field operation {}",
                    value.get("op").and_then(Value::as_str).unwrap_or("?")
                ),
            }),
            Some(other) => Err(StoreError::Other {
                message: Cow::Owned(other.to_string()),
            }),
            None => Err(StoreError::Other {
                message: Cow::Borrowed("lua_error"),
            }),
        };
    }

    Ok(value)
}
