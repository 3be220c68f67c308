//! Free time within working hours for a single day.

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{format_minutes, parse_minutes, Event, Preferences, TimeSlot};

/// Candidate starts advance by this many minutes.
pub const SLOT_STEP_MINUTES: u32 = 30;

fn overlaps(start1: u32, end1: u32, start2: u32, end2: u32) -> bool {
    start1 < end2 && end1 > start2
}

/// Returns every `duration`-minute slot on `date` that fits inside working
/// hours without overlapping an event on that day. Events whose date or
/// times do not parse are ignored.
pub fn find_free_slots(
    date: NaiveDate,
    events: &[Event],
    preferences: &Preferences,
    duration: u32,
) -> Result<Vec<TimeSlot>> {
    let work_start = parse_minutes(&preferences.work_start)?;
    let work_end = parse_minutes(&preferences.work_end)?;
    let duration = duration.max(1);

    let busy: Vec<(u32, u32)> = events
        .iter()
        .filter(|event| matches!(event.parsed_date(), Ok(day) if day == date))
        .filter_map(|event| event.minute_range().ok())
        .collect();

    let mut slots = Vec::new();
    let mut current = work_start;
    while current < work_end {
        let next = match current.checked_add(duration) {
            Some(next) if next <= work_end => next,
            _ => break,
        };
        let conflict = busy
            .iter()
            .any(|&(start, end)| overlaps(current, next, start, end));
        if !conflict {
            slots.push(TimeSlot::new(format_minutes(current), format_minutes(next)));
        }
        current += SLOT_STEP_MINUTES;
    }

    Ok(slots)
}
