use serde::{Deserialize, Serialize};

use crate::checklist::ShiftSection;
use crate::shift::{DayOfWeek, ShiftStatus};

/// Declarative shift query. Fields compose with AND; `None` imposes no
/// constraint. `assigned_user_id` is a membership test against the
/// shift's assignee list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ShiftStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<String>,
}

impl ShiftFilter {
    pub fn for_company(company_id: impl Into<String>) -> Self {
        Self {
            company_id: Some(company_id.into()),
            ..Self::default()
        }
    }
}

/// Declarative checklist query. `active_today` additionally evaluates the
/// checklist's frequency against the current date; false imposes no
/// constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckListFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_section: Option<ShiftSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role_id: Option<String>,
    #[serde(default)]
    pub active_today: bool,
}

impl CheckListFilter {
    pub fn for_company(company_id: impl Into<String>) -> Self {
        Self {
            company_id: Some(company_id.into()),
            ..Self::default()
        }
    }
}
