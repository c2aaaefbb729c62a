// Cursor pagination over shifts.
//
// Total order: `start_time` descending, ties broken by id ascending. A
// cursor records the last returned position; resumption takes everything
// strictly after it, so a deleted cursor row degrades to "first strictly
// older sort key" without a special case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rota_types::Shift;

/// Opaque resume token. Callers only ever receive one from a page and
/// hand it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCursor {
    start_time: DateTime<Utc>,
    id: String,
}

impl ShiftCursor {
    pub(crate) fn after(shift: &Shift) -> Self {
        Self {
            start_time: shift.start_time,
            id: shift.id.clone(),
        }
    }

    pub(crate) fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftPage {
    pub items: Vec<Shift>,
    /// `None` signals no further pages.
    pub next_cursor: Option<ShiftCursor>,
}

pub(crate) fn sort_newest_first(shifts: &mut [Shift]) {
    shifts.sort_by(|a, b| {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Whether a shift sits strictly after the cursor in the page order.
pub(crate) fn is_after_cursor(shift: &Shift, cursor: &ShiftCursor) -> bool {
    match shift.start_time.cmp(&cursor.start_time()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => shift.id.as_str() > cursor.id(),
        std::cmp::Ordering::Greater => false,
    }
}

/// Page an already-filtered set of shifts. Used by the in-memory
/// repositories; the store-backed ones push the same order and cursor
/// into the query instead.
pub(crate) fn paginate(
    mut shifts: Vec<Shift>,
    page_size: usize,
    cursor: Option<&ShiftCursor>,
) -> ShiftPage {
    sort_newest_first(&mut shifts);
    if let Some(cursor) = cursor {
        shifts.retain(|shift| is_after_cursor(shift, cursor));
    }
    shifts.truncate(page_size);
    let next_cursor = if shifts.len() == page_size {
        shifts.last().map(ShiftCursor::after)
    } else {
        None
    };
    ShiftPage {
        items: shifts,
        next_cursor,
    }
}
