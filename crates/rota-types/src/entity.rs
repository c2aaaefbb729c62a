use serde::de::DeserializeOwned;
use serde::Serialize;

/// Seam between the generic repository machinery and concrete records.
///
/// Every persisted record type names its collection and exposes its id so
/// one repository implementation can serve all of them.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection name the record is stored under.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}
