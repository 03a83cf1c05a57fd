//! Query-string serialization for filter structs.

use serde::Serialize;
use serde_json::Value;

/// Flattens a serializable struct into query pairs.
///
/// `null` values are skipped, arrays repeat the key once per element, strings
/// are passed through unquoted and everything else uses its JSON text.
///
/// # Errors
///
/// Returns the `serde_json` error if `params` cannot be serialized.
pub fn to_query_pairs<T: Serialize + ?Sized>(
    params: &T,
) -> Result<Vec<(String, String)>, serde_json::Error> {
    let Value::Object(map) = serde_json::to_value(params)? else {
        return Ok(Vec::new());
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .into_iter()
                    .filter(|v| !v.is_null())
                    .map(|v| (key.clone(), scalar(v))),
            ),
            other => pairs.push((key, scalar(other))),
        }
    }
    Ok(pairs)
}

fn scalar(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
