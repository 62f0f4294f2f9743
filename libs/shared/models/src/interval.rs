use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time interval `[start, end)` in UTC.
///
/// Two slots that merely touch at an endpoint do not overlap, which is what
/// allows back-to-back bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Two slots overlap if: start1 < end2 AND start2 < end1
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Remove `other` from this slot, returning the 0, 1 or 2 remaining pieces
    /// in ascending order.
    pub fn subtract(&self, other: &TimeSlot) -> Vec<TimeSlot> {
        if !self.overlaps(other) {
            return vec![*self];
        }

        let mut pieces = Vec::new();
        if self.start < other.start {
            pieces.push(TimeSlot::new(self.start, other.start));
        }
        if other.end < self.end {
            pieces.push(TimeSlot::new(other.end, self.end));
        }
        pieces
    }
}

/// Walk `window.start` forward in `stride` steps, emitting one `duration`-long
/// slot per step and discarding any trailing slot whose end would pass
/// `window.end`.
///
/// A stride equal to the duration yields contiguous slots; a larger stride
/// leaves a gap (buffer) between consecutive slots. Non-positive durations or
/// strides yield nothing.
pub fn discretize(window: &TimeSlot, duration: Duration, stride: Duration) -> Vec<TimeSlot> {
    if duration <= Duration::zero() || stride <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut current = window.start;

    while current + duration <= window.end {
        slots.push(TimeSlot::new(current, current + duration));
        current += stride;
    }

    slots
}
