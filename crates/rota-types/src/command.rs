use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shift::ShiftStatus;
use crate::task::Task;

/// One mutation in a shift batch. Commands apply in list order; the
/// whole-field variants are last-write-wins within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ShiftCommand {
    AddTask {
        task: Task,
    },
    UpdateTask {
        task: Task,
    },
    RemoveTask {
        task_id: String,
    },
    MarkTaskCompleted {
        task_id: String,
        completed_by: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photo_url: Option<String>,
    },
    UpdateAssignees {
        user_ids: Vec<String>,
    },
    UpdateStatus {
        status: ShiftStatus,
    },
    UpdateTimeRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// One target of a multi-record batch: the shift to load and the commands
/// to apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBatchEntry {
    pub shift_id: String,
    pub commands: Vec<ShiftCommand>,
}
