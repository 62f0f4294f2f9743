use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use tracing::debug;

use shared_models::{discretize, TimeSlot, WeeklySchedule};

/// Compute the ordered bookable candidate slots for one calendar date,
/// ignoring existing bookings.
///
/// A date override replaces the recurring rule entirely for its date; breaks
/// scoped to the weekday are carved out of either window. A slot that
/// overlaps a break is dropped whole rather than truncated, since bookings
/// are taken in consultation-length units.
pub fn resolve_day_availability(schedule: &WeeklySchedule, date: NaiveDate) -> Vec<TimeSlot> {
    let window = match working_window(schedule, date) {
        Some(window) => window,
        None => return Vec::new(),
    };

    let duration = Duration::minutes(schedule.slot_duration_minutes as i64);
    let stride = duration + Duration::minutes(schedule.buffer_minutes as i64);
    let candidates = discretize(&window, duration, stride);

    let breaks: Vec<TimeSlot> = schedule
        .breaks_for(date.weekday())
        .filter_map(|b| slot_on_date(date, b.start_time, b.end_time))
        .collect();

    let slots: Vec<TimeSlot> = candidates
        .into_iter()
        .filter(|slot| !breaks.iter().any(|b| slot.overlaps(b)))
        .collect();

    debug!(
        "Resolved {} candidate slots for doctor {} on {}",
        slots.len(),
        schedule.doctor_id,
        date
    );

    slots
}

/// The working window for `date`, or `None` when the doctor is off.
fn working_window(schedule: &WeeklySchedule, date: NaiveDate) -> Option<TimeSlot> {
    if let Some(entry) = schedule.override_for(date) {
        if !entry.is_available {
            debug!(
                "Doctor {} has an unavailable override on {}",
                schedule.doctor_id, date
            );
            return None;
        }
        // Window times are guaranteed present by write-time validation; a
        // malformed stored record resolves to no availability.
        return match (entry.start_time, entry.end_time) {
            (Some(start), Some(end)) => slot_on_date(date, start, end),
            _ => None,
        };
    }

    let day = schedule.day(date.weekday());
    if !day.is_working_day {
        return None;
    }
    slot_on_date(date, day.start_time, day.end_time)
}

fn slot_on_date(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Option<TimeSlot> {
    if end <= start {
        return None;
    }
    Some(TimeSlot::new(
        date.and_time(start).and_utc(),
        date.and_time(end).and_utc(),
    ))
}
