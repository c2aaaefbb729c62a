// Filter evaluation.
//
// Each declarative filter exists in two forms that must agree: a Rust
// predicate (run by the in-memory repositories, and as a post-filter for
// anything the store boundary cannot express) and a `StoreQuery`
// translation (run by the document-store repositories). Keeping both in
// this module is what keeps the two backends observably identical.

use chrono::NaiveDate;

use rota_types::{CheckList, CheckListFilter, Shift, ShiftFilter};

use crate::document::StoreQuery;
use crate::types::{StoreError, StoreResult};

pub(crate) fn shift_matches(shift: &Shift, filter: &ShiftFilter) -> bool {
    if let Some(company_id) = &filter.company_id {
        if shift.company_id != *company_id {
            return false;
        }
    }
    if let Some(day) = filter.day_of_week {
        if shift.day_of_week != day {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if shift.status != status {
            return false;
        }
    }
    if let Some(user_id) = &filter.assigned_user_id {
        if !shift.assigned_user_ids.iter().any(|u| u == user_id) {
            return false;
        }
    }
    true
}

/// Membership against `assigned_role_ids` is strict containment: a
/// checklist without the field matches no role filter, exactly as the
/// store's array-membership condition behaves on a missing field.
pub(crate) fn checklist_matches(
    checklist: &CheckList,
    filter: &CheckListFilter,
    today: NaiveDate,
) -> bool {
    if let Some(company_id) = &filter.company_id {
        if checklist.company_id != *company_id {
            return false;
        }
    }
    if let Some(section) = filter.shift_section {
        if checklist.shift_section != section {
            return false;
        }
    }
    if let Some(role_id) = &filter.assigned_role_id {
        let roles = checklist.assigned_role_ids.as_deref().unwrap_or(&[]);
        if !roles.iter().any(|r| r == role_id) {
            return false;
        }
    }
    if filter.active_today && !checklist.frequency.matches_on(today) {
        return false;
    }
    true
}

pub(crate) fn shift_store_query(filter: &ShiftFilter) -> StoreResult<StoreQuery> {
    let mut query = StoreQuery::default();
    if let Some(company_id) = &filter.company_id {
        query = query.eq("companyId", encode_value(company_id)?);
    }
    if let Some(day) = filter.day_of_week {
        query = query.eq("dayOfWeek", encode_value(&day)?);
    }
    if let Some(status) = filter.status {
        query = query.eq("status", encode_value(&status)?);
    }
    if let Some(user_id) = &filter.assigned_user_id {
        query = query.array_contains("assignedUserIds", encode_value(user_id)?);
    }
    Ok(query)
}

/// `active_today` has no store-side form (it branches on the frequency
/// variant), so the translation covers the other fields and callers run
/// the predicate over the fetched rows.
pub(crate) fn checklist_store_query(filter: &CheckListFilter) -> StoreResult<StoreQuery> {
    let mut query = StoreQuery::default();
    if let Some(company_id) = &filter.company_id {
        query = query.eq("companyId", encode_value(company_id)?);
    }
    if let Some(section) = filter.shift_section {
        query = query.eq("shiftSection", encode_value(&section)?);
    }
    if let Some(role_id) = &filter.assigned_role_id {
        query = query.array_contains("assignedRoleIds", encode_value(role_id)?);
    }
    Ok(query)
}

fn encode_value<T: serde::Serialize>(value: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|err| StoreError::Encoding(err.to_string()))
}
