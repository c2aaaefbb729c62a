#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use rota_store::{MemoryDocumentStore, RepositoryProvider};
use rota_types::{
    CheckList, DayOfWeek, Frequency, Shift, ShiftSection, ShiftStatus, Task, User,
};

/// Both backend families behind the same contract; every suite runs its
/// assertions against each.
pub fn providers() -> Vec<(&'static str, RepositoryProvider)> {
    vec![
        ("memory", RepositoryProvider::in_memory()),
        (
            "document",
            RepositoryProvider::with_store(Arc::new(MemoryDocumentStore::new())),
        ),
    ]
}

pub fn shift(id: &str, company: &str, day: u32, hour: u32) -> Shift {
    Shift {
        id: id.to_string(),
        company_id: company.to_string(),
        day_of_week: DayOfWeek::Monday,
        start_time: Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2026, 8, day, hour + 8, 0, 0).unwrap(),
        assigned_user_ids: Vec::new(),
        tasks: Vec::new(),
        status: ShiftStatus::Scheduled,
        last_updated_by: None,
        last_updated_at: None,
    }
}

pub fn task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        ..Task::default()
    }
}

pub fn checklist(id: &str, company: &str, section: ShiftSection) -> CheckList {
    CheckList {
        id: id.to_string(),
        title: format!("{id} checklist"),
        frequency: Frequency::EveryShift,
        shift_section: section,
        tasks: Vec::new(),
        company_id: company.to_string(),
        created_by_uid: "u1".to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 8, 1, 8, 0, 0).unwrap(),
        assigned_role_ids: None,
    }
}

pub fn user(uid: &str, company: &str) -> User {
    User {
        uid: uid.to_string(),
        email: format!("{uid}@example.com"),
        name: uid.to_uppercase(),
        company_id: company.to_string(),
        company_name: "Example Co".to_string(),
        role_id: String::new(),
        role_title: String::new(),
        is_manager: false,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}
