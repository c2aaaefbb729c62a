// Merge-style update semantics, shared by both backends so their
// observable results agree byte-for-byte.

use serde_json::Value;

use rota_types::Entity;

use crate::types::{StoreError, StoreResult};

pub(crate) fn encode<E: Entity>(entity: &E) -> StoreResult<Value> {
    serde_json::to_value(entity).map_err(|err| StoreError::Encoding(err.to_string()))
}

pub(crate) fn decode<E: Entity>(document: Value) -> StoreResult<E> {
    serde_json::from_value(document).map_err(|err| StoreError::Decoding(err.to_string()))
}

/// Overlay the incoming document's keys onto the stored one. Keys absent
/// from the incoming document keep their stored value; present keys
/// overwrite wholesale (arrays and nested objects are replaced, not
/// deep-merged). Optional entity fields serialize only when set, which is
/// what makes this a merge rather than a blind replace.
pub(crate) fn merge_documents(stored: &Value, incoming: &Value) -> Value {
    match (stored, incoming) {
        (Value::Object(stored), Value::Object(incoming)) => {
            let mut merged = stored.clone();
            for (key, value) in incoming {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => incoming.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn present_keys_overwrite_absent_keys_survive() {
        let stored = json!({
            "id": "s1",
            "status": "scheduled",
            "lastUpdatedBy": "u9",
            "tasks": [{"id": "t1"}]
        });
        let incoming = json!({
            "id": "s1",
            "status": "completed",
            "tasks": []
        });

        let merged = merge_documents(&stored, &incoming);
        assert_eq!(merged["status"], "completed");
        assert_eq!(merged["lastUpdatedBy"], "u9");
        assert_eq!(merged["tasks"], json!([]));
    }

    #[test]
    fn non_object_incoming_replaces() {
        let merged = merge_documents(&json!({"a": 1}), &json!(42));
        assert_eq!(merged, json!(42));
    }
}
