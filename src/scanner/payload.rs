use serde_json::{Deserializer, Value};

use super::ScanError;
use crate::models::draft_data::CardId;

/// Parses the first JSON value in `text`, ignoring anything after it.
pub fn parse_first(text: &str) -> Result<Value, ScanError> {
    match Deserializer::from_str(text).into_iter::<Value>().next() {
        Some(value) => Ok(value?),
        None => Err(ScanError::MissingPayload("empty payload".to_string())),
    }
}

/// Like [`parse_first`], then unwraps every string leaf that is itself a JSON object or array.
pub fn parse_nested(text: &str) -> Result<Value, ScanError> {
    parse_first(text).map(decode_nested)
}

pub fn decode_nested(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, decode_nested(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(decode_nested).collect()),
        Value::String(s) => {
            let trimmed = s.trim_start();
            if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
                return Value::String(s);
            }
            match serde_json::from_str::<Value>(&s) {
                Ok(inner) => decode_nested(inner),
                Err(_) => Value::String(s),
            }
        }
        other => other,
    }
}

/// Depth-first search through nested objects for the first value stored under `key`.
pub fn json_find<'a>(key: &str, value: &'a Value) -> Option<&'a Value> {
    let map = value.as_object()?;
    if let Some(found) = map.get(key) {
        return Some(found);
    }
    map.values().find_map(|child| json_find(key, child))
}

/// Integer that may be logged as a number or as a numeric string.
pub fn as_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Card identifiers from a sequence, a single scalar, or a comma-delimited string.
pub fn as_card_ids(value: &Value) -> Option<Vec<CardId>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_id).collect(),
        Value::String(s) => Some(
            s.split(',')
                .map(|id| id.trim())
                .filter(|id| !id.is_empty())
                .map(|id| id.to_string())
                .collect(),
        ),
        Value::Number(n) => Some(vec![n.to_string()]),
        _ => None,
    }
}

fn scalar_id(value: &Value) -> Option<CardId> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}
