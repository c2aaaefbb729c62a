use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// An account in a company, keyed by the externally-issued auth uid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub uid: String,
    pub email: String,
    pub name: String,
    pub company_id: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub role_title: String,
    #[serde(default)]
    pub is_manager: bool,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.uid
    }

    fn set_id(&mut self, id: String) {
        self.uid = id;
    }
}
