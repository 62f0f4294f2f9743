use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SLOT_DURATION_MINUTES: i32 = 30;
pub const MIN_SLOT_DURATION_MINUTES: i32 = 15;
pub const MAX_SLOT_DURATION_MINUTES: i32 = 120;
pub const MAX_BUFFER_MINUTES: i32 = 60;
pub const DEFAULT_MAX_ADVANCE_DAYS: i64 = 30;

/// Recurring availability for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub is_working_day: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl DayAvailability {
    pub fn off() -> Self {
        Self {
            is_working_day: false,
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
        }
    }

    pub fn working(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            is_working_day: true,
            start_time,
            end_time,
        }
    }
}

/// Recurring break window scoped to one weekday. Must fall entirely within
/// that day's working window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRule {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Date-specific exception. When present for a date it replaces the recurring
/// rule entirely: either unavailable (holiday, sick day) or available with a
/// custom window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
}

/// One recurring weekly schedule per doctor.
///
/// All wall-clock times are interpreted as UTC; `timezone` records the
/// doctor's zone for presentation layers and takes no part in slot
/// arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub doctor_id: Uuid,
    /// Indexed 0 = Sunday .. 6 = Saturday.
    pub week: [DayAvailability; 7],
    pub break_times: Vec<BreakRule>,
    pub date_overrides: Vec<DateOverride>,
    pub slot_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub max_advance_days: i64,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Map a weekday to its index in `WeeklySchedule::week` (0 = Sunday).
pub fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

impl WeeklySchedule {
    /// Default schedule used at lazy creation: Mon-Fri 09:00-17:00, weekends
    /// off, 30-minute slots, no buffer.
    pub fn default_for(doctor_id: Uuid, now: DateTime<Utc>) -> Self {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let five = NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN);

        let weekday = DayAvailability::working(nine, five);
        let week = [
            DayAvailability::off(), // Sunday
            weekday,
            weekday,
            weekday,
            weekday,
            weekday,
            DayAvailability::off(), // Saturday
        ];

        Self {
            doctor_id,
            week,
            break_times: Vec::new(),
            date_overrides: Vec::new(),
            slot_duration_minutes: DEFAULT_SLOT_DURATION_MINUTES,
            buffer_minutes: 0,
            max_advance_days: DEFAULT_MAX_ADVANCE_DAYS,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DayAvailability {
        &self.week[day_index(weekday)]
    }

    /// Exact calendar-date lookup.
    pub fn override_for(&self, date: NaiveDate) -> Option<&DateOverride> {
        self.date_overrides.iter().find(|o| o.date == date)
    }

    pub fn breaks_for(&self, weekday: Weekday) -> impl Iterator<Item = &BreakRule> {
        let index = day_index(weekday) as u8;
        self.break_times
            .iter()
            .filter(move |b| b.day_of_week == index)
    }
}
