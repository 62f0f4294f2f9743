use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_models::{AppointmentStatus, TimeSlot};
use shared_store::{AppointmentStore, ScheduleStore};

use crate::models::SchedulingError;
use crate::services::availability::resolve_day_availability;

/// Detects overlaps between a candidate interval and a doctor's confirmed
/// appointments.
///
/// Only `scheduled` appointments block a candidate. Pending requests do not
/// reserve their slot: the doctor's approval is the commit point, and
/// whichever overlapping request is approved first wins.
pub struct ConflictDetectionService {
    appointments: Arc<dyn AppointmentStore>,
    schedules: Arc<dyn ScheduleStore>,
    search_horizon_days: i64,
}

impl ConflictDetectionService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        schedules: Arc<dyn ScheduleStore>,
        search_horizon_days: i64,
    ) -> Self {
        Self {
            appointments,
            schedules,
            search_horizon_days,
        }
    }

    /// Check whether `slot` overlaps any scheduled appointment of the doctor.
    pub async fn has_conflict(
        &self,
        doctor_id: Uuid,
        slot: &TimeSlot,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, SchedulingError> {
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, slot.start, slot.end
        );

        let existing = self
            .appointments
            .list_for_doctor_between(doctor_id, slot.start, slot.end)
            .await?;

        let conflict = existing
            .iter()
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .filter(|apt| apt.status == AppointmentStatus::Scheduled)
            .any(|apt| apt.slot().overlaps(slot));

        if conflict {
            warn!(
                "Conflict detected for doctor {} at {} - {}",
                doctor_id, slot.start, slot.end
            );
        }

        Ok(conflict)
    }

    /// Candidate slots for one date with booked slots filtered out.
    pub async fn get_available_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        let schedule = match self.schedules.get(doctor_id).await? {
            Some(schedule) => schedule,
            None => {
                debug!("Doctor {} has no schedule record yet", doctor_id);
                return Ok(Vec::new());
            }
        };

        let candidates = resolve_day_availability(&schedule, date);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        // One range query for the whole day, then filter in memory.
        let day_start = candidates[0].start;
        let day_end = candidates[candidates.len() - 1].end;
        let booked: Vec<TimeSlot> = self
            .appointments
            .list_for_doctor_between(doctor_id, day_start, day_end)
            .await?
            .into_iter()
            .filter(|apt| apt.status == AppointmentStatus::Scheduled)
            .map(|apt| apt.slot())
            .collect();

        let free: Vec<TimeSlot> = candidates
            .into_iter()
            .filter(|slot| !booked.iter().any(|b| slot.overlaps(b)))
            .collect();

        debug!(
            "Found {} free slots for doctor {} on {}",
            free.len(),
            doctor_id,
            date
        );
        Ok(free)
    }

    /// First free slot starting strictly after `from`, scanning day by day
    /// up to the configured horizon.
    pub async fn next_available_slot(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Option<TimeSlot>, SchedulingError> {
        debug!(
            "Searching next available slot for doctor {} after {}",
            doctor_id, from
        );

        let mut date = from.date_naive();
        let last_date = date + Duration::days(self.search_horizon_days);

        while date <= last_date {
            let slots = self.get_available_slots(doctor_id, date).await?;
            if let Some(slot) = slots.into_iter().find(|slot| slot.start > from) {
                return Ok(Some(slot));
            }
            date += Duration::days(1);
        }

        Ok(None)
    }
}
