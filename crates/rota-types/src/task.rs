use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// A single item on a shift's or checklist's task list.
///
/// Completion is all-or-nothing: either `is_completed` is false and all
/// completion fields are empty, or `is_completed` is true and both
/// `completed_by` and `completed_at` are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requires_photo_proof: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role_ids: Option<Vec<String>>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Stamp the full completion triple plus the optional photo in one step.
    pub fn mark_completed(
        &mut self,
        completed_by: impl Into<String>,
        completed_at: DateTime<Utc>,
        photo_url: Option<String>,
    ) {
        self.is_completed = true;
        self.completed_by = Some(completed_by.into());
        self.completed_at = Some(completed_at);
        self.photo_url = photo_url;
    }

    /// Clear every completion field, returning the task to fully incomplete.
    pub fn clear_completion(&mut self) {
        self.is_completed = false;
        self.completed_by = None;
        self.completed_at = None;
        self.photo_url = None;
    }

    /// True when the completion fields satisfy the all-or-nothing invariant.
    pub fn is_completion_consistent(&self) -> bool {
        if self.is_completed {
            self.completed_by.is_some() && self.completed_at.is_some()
        } else {
            self.completed_by.is_none() && self.completed_at.is_none() && self.photo_url.is_none()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_round_trip_is_consistent() {
        let mut task = Task::new("Open till");
        assert!(task.is_completion_consistent());

        task.mark_completed("u1", Utc::now(), None);
        assert!(task.is_completed);
        assert!(task.is_completion_consistent());

        task.clear_completion();
        assert!(!task.is_completed);
        assert!(task.completed_by.is_none());
        assert!(task.completed_at.is_none());
        assert!(task.photo_url.is_none());
        assert!(task.is_completion_consistent());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let task = Task::new("Stock bar");
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("isCompleted").is_some());
        assert!(value.get("requiresPhotoProof").is_some());
        // Empty completion fields stay off the document entirely.
        assert!(value.get("completedBy").is_none());
    }
}
