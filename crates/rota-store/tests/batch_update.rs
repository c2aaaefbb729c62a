// Batch engine behavior through the public repository surface, on both
// backend families.

mod common;

use common::{providers, shift, task};
use rota_types::{ShiftBatchEntry, ShiftCommand, ShiftStatus};

use rota_store::{Repository, ShiftRepository, StoreError};

#[tokio::test]
async fn worked_example_assignees_then_completion() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        let mut s1 = shift("s1", "c1", 1, 9);
        s1.tasks = vec![task("t1", "Open till")];
        shifts.create(s1).await.unwrap();

        let updated = shifts
            .batch_update(
                "s1",
                vec![
                    ShiftCommand::UpdateAssignees {
                        user_ids: vec!["u1".to_string(), "u2".to_string()],
                    },
                    ShiftCommand::MarkTaskCompleted {
                        task_id: "t1".to_string(),
                        completed_by: "u1".to_string(),
                        photo_url: None,
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            updated.assigned_user_ids,
            vec!["u1".to_string(), "u2".to_string()],
            "{name}"
        );
        assert!(updated.tasks[0].is_completed, "{name}");
        assert_eq!(updated.tasks[0].completed_by.as_deref(), Some("u1"), "{name}");
        assert!(updated.tasks[0].completed_at.is_some(), "{name}");

        // The returned record is the persisted record.
        let fetched = shifts.get("s1").await.unwrap();
        assert_eq!(fetched, updated, "{name}");
    }
}

#[tokio::test]
async fn add_then_remove_round_trips_through_persistence() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        let mut s1 = shift("s1", "c1", 1, 9);
        s1.tasks = vec![task("t1", "Open till")];
        shifts.create(s1.clone()).await.unwrap();

        let updated = shifts
            .batch_update(
                "s1",
                vec![
                    ShiftCommand::AddTask {
                        task: task("t2", "Sweep"),
                    },
                    ShiftCommand::RemoveTask {
                        task_id: "t2".to_string(),
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(updated.tasks, s1.tasks, "{name}: task list must round-trip");
    }
}

#[tokio::test]
async fn batch_against_missing_shift_is_not_found() {
    for (name, provider) in providers() {
        let result = provider
            .shifts()
            .batch_update(
                "ghost",
                vec![ShiftCommand::UpdateStatus {
                    status: ShiftStatus::Cancelled,
                }],
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))), "{name}");
    }
}

#[tokio::test]
async fn failed_command_leaves_the_record_untouched() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        let mut s1 = shift("s1", "c1", 1, 9);
        s1.tasks = vec![task("t1", "Open till")];
        shifts.create(s1.clone()).await.unwrap();

        // The status change applies first in list order, but the
        // duplicate add fails the batch, so nothing may persist.
        let result = shifts
            .batch_update(
                "s1",
                vec![
                    ShiftCommand::UpdateStatus {
                        status: ShiftStatus::Cancelled,
                    },
                    ShiftCommand::AddTask {
                        task: task("t1", "Duplicate"),
                    },
                ],
            )
            .await;
        assert!(matches!(result, Err(StoreError::OperationFailed(_))), "{name}");

        let fetched = shifts.get("s1").await.unwrap();
        assert_eq!(fetched.status, ShiftStatus::Scheduled, "{name}");
        assert_eq!(fetched.tasks, s1.tasks, "{name}");
        assert!(fetched.last_updated_at.is_none(), "{name}");
    }
}

#[tokio::test]
async fn multi_record_batch_is_all_or_nothing() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        shifts.create(shift("s1", "c1", 1, 9)).await.unwrap();
        shifts.create(shift("s3", "c1", 3, 9)).await.unwrap();

        let entries = vec![
            ShiftBatchEntry {
                shift_id: "s1".to_string(),
                commands: vec![ShiftCommand::UpdateStatus {
                    status: ShiftStatus::Completed,
                }],
            },
            ShiftBatchEntry {
                shift_id: "s2-missing".to_string(),
                commands: vec![ShiftCommand::UpdateStatus {
                    status: ShiftStatus::Completed,
                }],
            },
            ShiftBatchEntry {
                shift_id: "s3".to_string(),
                commands: vec![ShiftCommand::UpdateStatus {
                    status: ShiftStatus::Completed,
                }],
            },
        ];
        let result = shifts.batch_update_many(entries).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))), "{name}");

        // Entries 1 and 3 must be verifiably untouched.
        for id in ["s1", "s3"] {
            let fetched = shifts.get(id).await.unwrap();
            assert_eq!(fetched.status, ShiftStatus::Scheduled, "{name}/{id}");
            assert!(fetched.last_updated_at.is_none(), "{name}/{id}");
        }
    }
}

#[tokio::test]
async fn multi_record_batch_commits_every_entry() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        let mut s1 = shift("s1", "c1", 1, 9);
        s1.tasks = vec![task("t1", "Open till")];
        shifts.create(s1).await.unwrap();
        shifts.create(shift("s2", "c1", 2, 9)).await.unwrap();

        let updated = shifts
            .batch_update_many(vec![
                ShiftBatchEntry {
                    shift_id: "s1".to_string(),
                    commands: vec![ShiftCommand::MarkTaskCompleted {
                        task_id: "t1".to_string(),
                        completed_by: "u1".to_string(),
                        photo_url: Some("till.jpg".to_string()),
                    }],
                },
                ShiftBatchEntry {
                    shift_id: "s2".to_string(),
                    commands: vec![ShiftCommand::UpdateAssignees {
                        user_ids: vec!["u3".to_string()],
                    }],
                },
            ])
            .await
            .unwrap();
        assert_eq!(updated.len(), 2, "{name}");

        let s1 = shifts.get("s1").await.unwrap();
        assert!(s1.tasks[0].is_completed, "{name}");
        assert_eq!(s1.tasks[0].photo_url.as_deref(), Some("till.jpg"), "{name}");
        assert!(s1.last_updated_at.is_some(), "{name}");

        let s2 = shifts.get("s2").await.unwrap();
        assert_eq!(s2.assigned_user_ids, vec!["u3".to_string()], "{name}");
    }
}

#[tokio::test]
async fn unmarking_a_task_clears_every_completion_field() {
    for (name, provider) in providers() {
        let shifts = provider.shifts();
        let mut s1 = shift("s1", "c1", 1, 9);
        s1.tasks = vec![task("t1", "Open till")];
        shifts.create(s1).await.unwrap();

        shifts
            .batch_update(
                "s1",
                vec![ShiftCommand::MarkTaskCompleted {
                    task_id: "t1".to_string(),
                    completed_by: "u1".to_string(),
                    photo_url: Some("p.jpg".to_string()),
                }],
            )
            .await
            .unwrap();

        // Un-mark by replacing the task with a cleared copy.
        let mut cleared = shifts.get("s1").await.unwrap().tasks[0].clone();
        cleared.clear_completion();
        let updated = shifts
            .batch_update("s1", vec![ShiftCommand::UpdateTask { task: cleared }])
            .await
            .unwrap();

        let task = &updated.tasks[0];
        assert!(!task.is_completed, "{name}");
        assert!(task.completed_by.is_none(), "{name}");
        assert!(task.completed_at.is_none(), "{name}");
        assert!(task.photo_url.is_none(), "{name}");
        assert!(task.is_completion_consistent(), "{name}");
    }
}
