use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::shift::DayOfWeek;
use crate::task::Task;

/// How often a checklist applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frequency {
    EveryShift,
    SpecificDay { day: DayOfWeek },
    SpecificDate { date: NaiveDate },
}

impl Frequency {
    /// Whether the checklist is active on the given calendar date.
    pub fn matches_on(&self, today: NaiveDate) -> bool {
        match self {
            Frequency::EveryShift => true,
            Frequency::SpecificDay { day } => *day == DayOfWeek::from(today.weekday()),
            Frequency::SpecificDate { date } => *date == today,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftSection {
    Opening,
    During,
    Closing,
}

/// A recurring or one-off checklist of tasks for part of a shift.
///
/// Task ids are unique within the checklist; the id space is independent
/// from shift task ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckList {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub frequency: Frequency,
    pub shift_section: ShiftSection,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub company_id: String,
    pub created_by_uid: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_role_ids: Option<Vec<String>>,
}

impl Entity for CheckList {
    const COLLECTION: &'static str = "checklists";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_matches_on_evaluates_each_variant() {
        // 2026-08-03 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();

        assert!(Frequency::EveryShift.matches_on(monday));

        let mondays = Frequency::SpecificDay {
            day: DayOfWeek::Monday,
        };
        assert!(mondays.matches_on(monday));
        assert!(!mondays.matches_on(tuesday));

        let dated = Frequency::SpecificDate { date: monday };
        assert!(dated.matches_on(monday));
        assert!(!dated.matches_on(tuesday));
    }

    #[test]
    fn frequency_round_trips_through_tagged_json() {
        let dated = Frequency::SpecificDate {
            date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        };
        let value = serde_json::to_value(dated).unwrap();
        assert_eq!(value["kind"], "specificDate");
        let back: Frequency = serde_json::from_value(value).unwrap();
        assert_eq!(back, dated);
    }
}
