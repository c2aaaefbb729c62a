use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Reserved id prefix marking roles from the built-in catalog.
pub const STANDARD_ROLE_PREFIX: &str = "standard-";

/// Titles of the fixed, code-defined standard roles.
pub const STANDARD_ROLE_TITLES: &[&str] = &[
    "Manager",
    "Shift Lead",
    "Server",
    "Bartender",
    "Cook",
    "Host",
    "Cleaner",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub is_standard: bool,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Role {
    const COLLECTION: &'static str = "roles";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Derive the reserved id for a standard role title.
pub fn standard_role_id(title: &str) -> String {
    let normalized = title.trim().to_lowercase().replace(' ', "-");
    format!("{STANDARD_ROLE_PREFIX}{normalized}")
}

pub fn is_standard_role_id(id: &str) -> bool {
    id.starts_with(STANDARD_ROLE_PREFIX)
}

static STANDARD_ROLES: Lazy<Vec<Role>> = Lazy::new(|| {
    STANDARD_ROLE_TITLES
        .iter()
        .map(|title| Role {
            id: standard_role_id(title),
            title: (*title).to_string(),
            company_id: String::new(),
            is_standard: true,
            created_by: "system".to_string(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        })
        .collect()
});

/// The full standard catalog. Never persisted; shared by every company.
pub fn standard_roles() -> &'static [Role] {
    &STANDARD_ROLES
}

/// Look up a standard role by its reserved id.
pub fn standard_role(id: &str) -> Option<Role> {
    STANDARD_ROLES.iter().find(|role| role.id == id).cloned()
}
