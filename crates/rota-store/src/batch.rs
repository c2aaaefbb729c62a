// Command application for shift batches.
//
// Commands mutate an in-memory copy of the shift in list order; the
// caller persists the final copy with a single write, so partial
// application is never observable.

use chrono::{DateTime, Utc};

use rota_types::{generate_id, Shift, ShiftCommand};

use crate::types::{StoreError, StoreResult};

pub(crate) fn apply_commands(
    shift: &mut Shift,
    commands: &[ShiftCommand],
    now: DateTime<Utc>,
) -> StoreResult<()> {
    for command in commands {
        apply_command(shift, command, now)?;
    }
    shift.last_updated_at = Some(now);
    Ok(())
}

fn apply_command(shift: &mut Shift, command: &ShiftCommand, now: DateTime<Utc>) -> StoreResult<()> {
    match command {
        ShiftCommand::AddTask { task } => {
            let mut task = task.clone();
            if task.id.is_empty() {
                task.id = generate_id();
                while shift.task(&task.id).is_some() {
                    task.id = generate_id();
                }
            } else if shift.task(&task.id).is_some() {
                return Err(StoreError::OperationFailed(format!(
                    "task {} already exists on shift {}",
                    task.id, shift.id
                )));
            }
            shift.tasks.push(task);
        }
        ShiftCommand::UpdateTask { task } => match shift.task_mut(&task.id) {
            Some(existing) => *existing = task.clone(),
            None => {
                tracing::debug!(shift = %shift.id, task = %task.id, "dropping update for unknown task");
            }
        },
        ShiftCommand::RemoveTask { task_id } => {
            let before = shift.tasks.len();
            shift.tasks.retain(|t| t.id != *task_id);
            if shift.tasks.len() == before {
                tracing::debug!(shift = %shift.id, task = %task_id, "remove matched no task");
            }
        }
        ShiftCommand::MarkTaskCompleted {
            task_id,
            completed_by,
            photo_url,
        } => match shift.task_mut(task_id) {
            Some(task) => task.mark_completed(completed_by.clone(), now, photo_url.clone()),
            None => {
                tracing::debug!(shift = %shift.id, task = %task_id, "completion matched no task");
            }
        },
        ShiftCommand::UpdateAssignees { user_ids } => {
            shift.assigned_user_ids = user_ids.clone();
        }
        ShiftCommand::UpdateStatus { status } => {
            shift.status = *status;
        }
        ShiftCommand::UpdateTimeRange { start, end } => {
            shift.start_time = *start;
            shift.end_time = *end;
        }
    }
    Ok(())
}
