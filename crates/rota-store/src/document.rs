// Backing store boundary.
//
// Repositories talk to a document database through this trait: JSON
// documents keyed by collection name + id, with equality and
// array-membership queries, descending sort with id tie-break,
// resume-after cursors, and an atomic write batch.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::types::StoreResult;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the given value.
    Eq(String, Value),
    /// Field is an array containing the given value.
    ArrayContains(String, Value),
}

/// A query the store boundary can execute natively. Anything beyond this
/// surface (variant logic, date arithmetic) is the repository's job.
#[derive(Debug, Clone, Default)]
pub struct StoreQuery {
    pub conditions: Vec<Condition>,
    /// Order descending by this field, ties broken by document id
    /// ascending. `None` orders by document id alone.
    pub order_desc_by: Option<String>,
    /// Resume strictly after this (sort value, document id) position.
    pub start_after: Option<(Value, String)>,
    pub limit: Option<usize>,
}

impl StoreQuery {
    pub fn eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value));
        self
    }

    pub fn array_contains(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions
            .push(Condition::ArrayContains(field.into(), value));
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order_desc_by = Some(field.into());
        self
    }

    pub fn start_after(mut self, sort_value: Value, id: impl Into<String>) -> Self {
        self.start_after = Some((sort_value, id.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One staged write inside an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Set {
        collection: String,
        id: String,
        document: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    async fn set(&self, collection: &str, id: &str, document: Value) -> StoreResult<()>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Run a query; results come back in the query's order.
    async fn query(&self, collection: &str, query: StoreQuery) -> StoreResult<Vec<Value>>;

    /// Commit a set of writes atomically: either all land or none do.
    async fn commit(&self, ops: Vec<WriteOp>) -> StoreResult<()>;
}

/// In-process document store. Used as the test transport and wherever no
/// real backend is wired; transport failures do not occur here, so the
/// `Network` error kind never originates from this implementation.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.lock().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: StoreQuery) -> StoreResult<Vec<Value>> {
        let collections = self.collections.lock().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(String, Value)> = docs
            .iter()
            .filter(|(_, doc)| matches_conditions(doc, &query.conditions))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();

        if let Some(field) = &query.order_desc_by {
            rows.sort_by(|(a_id, a), (b_id, b)| {
                compare_sort_values(b.get(field), a.get(field)).then_with(|| a_id.cmp(b_id))
            });
        }
        // With no order field the BTreeMap iteration already yields id order.

        if let Some((sort_value, id)) = &query.start_after {
            if let Some(field) = &query.order_desc_by {
                rows.retain(|(row_id, doc)| {
                    is_strictly_after(doc.get(field), row_id, sort_value, id)
                });
            } else {
                rows.retain(|(row_id, _)| row_id.as_str() > id.as_str());
            }
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn commit(&self, ops: Vec<WriteOp>) -> StoreResult<()> {
        // One lock acquisition makes the whole batch atomic.
        let mut collections = self.collections.lock().await;
        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    document,
                } => {
                    collections.entry(collection).or_default().insert(id, document);
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }
}

fn matches_conditions(doc: &Value, conditions: &[Condition]) -> bool {
    conditions.iter().all(|condition| match condition {
        Condition::Eq(field, expected) => doc.get(field) == Some(expected),
        Condition::ArrayContains(field, expected) => doc
            .get(field)
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(expected)),
    })
}

/// Descending-order ranking in document order: a row is in the result
/// strictly after the cursor when its sort value is older, or equal with a
/// larger id.
fn is_strictly_after(
    row_value: Option<&Value>,
    row_id: &str,
    cursor_value: &Value,
    cursor_id: &str,
) -> bool {
    match compare_sort_values(row_value, Some(cursor_value)) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => row_id > cursor_id,
        std::cmp::Ordering::Greater => false,
    }
}

/// Total order over the value types the boundary sorts on. Timestamp
/// strings compare as instants so mixed sub-second precision cannot
/// reorder them; everything else falls back to its JSON representation.
fn compare_sort_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => {
            match (parse_instant(a), parse_instant(b)) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a.cmp(b),
            }
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn eq_and_array_contains_compose_with_and() {
        let store = MemoryDocumentStore::new();
        store
            .set("shifts", "s1", json!({"companyId": "c1", "assignedUserIds": ["u1"]}))
            .await
            .unwrap();
        store
            .set("shifts", "s2", json!({"companyId": "c1", "assignedUserIds": ["u2"]}))
            .await
            .unwrap();
        store
            .set("shifts", "s3", json!({"companyId": "c2", "assignedUserIds": ["u1"]}))
            .await
            .unwrap();

        let query = StoreQuery::default()
            .eq("companyId", json!("c1"))
            .array_contains("assignedUserIds", json!("u1"));
        let rows = store.query("shifts", query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["assignedUserIds"], json!(["u1"]));
    }

    #[tokio::test]
    async fn descending_order_breaks_ties_by_id() {
        let store = MemoryDocumentStore::new();
        store
            .set("shifts", "b", json!({"startTime": "2026-08-01T09:00:00Z"}))
            .await
            .unwrap();
        store
            .set("shifts", "a", json!({"startTime": "2026-08-01T09:00:00Z"}))
            .await
            .unwrap();
        store
            .set("shifts", "c", json!({"startTime": "2026-08-02T09:00:00Z"}))
            .await
            .unwrap();

        let rows = store
            .query("shifts", StoreQuery::default().order_desc("startTime"))
            .await
            .unwrap();
        let times: Vec<&str> = rows
            .iter()
            .map(|row| row["startTime"].as_str().unwrap())
            .collect();
        assert_eq!(
            times,
            vec![
                "2026-08-02T09:00:00Z",
                "2026-08-01T09:00:00Z",
                "2026-08-01T09:00:00Z"
            ]
        );
    }

    #[tokio::test]
    async fn start_after_resumes_past_missing_cursor_row() {
        let store = MemoryDocumentStore::new();
        store
            .set("shifts", "s1", json!({"startTime": "2026-08-03T09:00:00Z"}))
            .await
            .unwrap();
        store
            .set("shifts", "s3", json!({"startTime": "2026-08-01T09:00:00Z"}))
            .await
            .unwrap();

        // Cursor names a row (s2) that no longer exists; resume lands on
        // the first strictly older sort key.
        let query = StoreQuery::default()
            .order_desc("startTime")
            .start_after(json!("2026-08-02T09:00:00Z"), "s2");
        let rows = store.query("shifts", query).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["startTime"], "2026-08-01T09:00:00Z");
    }

    #[tokio::test]
    async fn commit_applies_all_ops() {
        let store = MemoryDocumentStore::new();
        store.set("shifts", "s1", json!({"status": "scheduled"})).await.unwrap();

        store
            .commit(vec![
                WriteOp::Set {
                    collection: "shifts".to_string(),
                    id: "s1".to_string(),
                    document: json!({"status": "completed"}),
                },
                WriteOp::Delete {
                    collection: "shifts".to_string(),
                    id: "missing".to_string(),
                },
                WriteOp::Set {
                    collection: "shifts".to_string(),
                    id: "s2".to_string(),
                    document: json!({"status": "scheduled"}),
                },
            ])
            .await
            .unwrap();

        assert_eq!(
            store.get("shifts", "s1").await.unwrap().unwrap()["status"],
            "completed"
        );
        assert!(store.get("shifts", "s2").await.unwrap().is_some());
    }
}
