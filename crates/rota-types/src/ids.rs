use uuid::Uuid;

/// Generate a fresh record or task id.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
