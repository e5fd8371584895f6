// Response body decoding.
//
// Endpoints answer either with action(s) tagged by `type`, or with the
// bare entity. Both shapes are normalized into an ordered action list.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::models::{ActionBatch, ApiAction};

/// Decode a response body into actions.
///
/// A `type`-tagged object, or a non-empty array of them, is decoded as
/// actions. Anything else is decoded as `T` and handed to `wrap`.
pub(crate) fn decode_actions<T, F>(body: &str, wrap: F) -> Result<Vec<ApiAction>, Error>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Vec<ApiAction>,
{
    let value: Value = serde_json::from_str(body).map_err(|e| deserialization(&e, body))?;

    if is_action_payload(&value) {
        let batch: ActionBatch =
            serde_json::from_value(value).map_err(|e| deserialization(&e, body))?;
        return Ok(batch.into_vec());
    }

    let entity: T = serde_json::from_value(value).map_err(|e| deserialization(&e, body))?;
    Ok(wrap(entity))
}

fn is_action_payload(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.get("type").is_some_and(Value::is_string),
        Value::Array(items) => !items.is_empty() && items.iter().all(is_action_payload),
        _ => false,
    }
}

fn deserialization(err: &serde_json::Error, body: &str) -> Error {
    Error::Deserialization {
        message: err.to_string(),
        body: body.to_owned(),
    }
}
