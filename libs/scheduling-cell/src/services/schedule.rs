use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::{
    Actor, ActorRole, DayAvailability, WeeklySchedule, MAX_BUFFER_MINUTES,
    MAX_SLOT_DURATION_MINUTES, MIN_SLOT_DURATION_MINUTES,
};
use shared_store::ScheduleStore;

use crate::models::{SchedulingError, UpdateScheduleRequest};

/// Manages recurring weekly schedules: lazy creation with defaults and
/// owner-gated, validate-on-write updates. Schedules are never deleted.
pub struct ScheduleService {
    schedules: Arc<dyn ScheduleStore>,
}

impl ScheduleService {
    pub fn new(schedules: Arc<dyn ScheduleStore>) -> Self {
        Self { schedules }
    }

    pub async fn get_schedule(&self, doctor_id: Uuid) -> Result<WeeklySchedule, SchedulingError> {
        self.schedules
            .get(doctor_id)
            .await?
            .ok_or(SchedulingError::NotFound)
    }

    /// Fetch the doctor's schedule, creating the Mon-Fri 9-5 default on
    /// first access.
    pub async fn get_or_create_default(
        &self,
        doctor_id: Uuid,
    ) -> Result<WeeklySchedule, SchedulingError> {
        if let Some(schedule) = self.schedules.get(doctor_id).await? {
            return Ok(schedule);
        }

        debug!("Creating default schedule for doctor {}", doctor_id);
        let schedule = WeeklySchedule::default_for(doctor_id, Utc::now());
        Ok(self.schedules.upsert(schedule).await?)
    }

    /// Replace a doctor's schedule settings. Only the owning doctor may
    /// write; all configuration errors are rejected here so reads never
    /// re-validate.
    pub async fn update_schedule(
        &self,
        doctor_id: Uuid,
        actor: &Actor,
        request: UpdateScheduleRequest,
    ) -> Result<WeeklySchedule, SchedulingError> {
        if actor.role != ActorRole::Doctor || actor.id != doctor_id {
            return Err(SchedulingError::Unauthorized);
        }

        let existing = self.get_or_create_default(doctor_id).await?;
        let now = Utc::now();
        let schedule = WeeklySchedule {
            doctor_id,
            week: request.week,
            break_times: request.break_times,
            date_overrides: request.date_overrides,
            slot_duration_minutes: request.slot_duration_minutes,
            buffer_minutes: request.buffer_minutes,
            max_advance_days: request.max_advance_days,
            timezone: request.timezone,
            created_at: existing.created_at,
            updated_at: now,
        };

        validate_schedule(&schedule)?;

        let saved = self.schedules.upsert(schedule).await?;
        info!("Schedule updated for doctor {}", doctor_id);
        Ok(saved)
    }
}

/// Write-time validation of a full schedule record.
pub fn validate_schedule(schedule: &WeeklySchedule) -> Result<(), SchedulingError> {
    if schedule.slot_duration_minutes < MIN_SLOT_DURATION_MINUTES
        || schedule.slot_duration_minutes > MAX_SLOT_DURATION_MINUTES
    {
        return Err(SchedulingError::Validation(format!(
            "slot duration must be between {} and {} minutes",
            MIN_SLOT_DURATION_MINUTES, MAX_SLOT_DURATION_MINUTES
        )));
    }

    if schedule.buffer_minutes < 0 || schedule.buffer_minutes > MAX_BUFFER_MINUTES {
        return Err(SchedulingError::Validation(format!(
            "buffer must be between 0 and {} minutes",
            MAX_BUFFER_MINUTES
        )));
    }

    if schedule.max_advance_days < 1 {
        return Err(SchedulingError::Validation(
            "max advance booking must be at least 1 day".to_string(),
        ));
    }

    for (index, day) in schedule.week.iter().enumerate() {
        if day.is_working_day && day.end_time <= day.start_time {
            return Err(SchedulingError::Validation(format!(
                "working window on day {} must end after it starts",
                index
            )));
        }
    }

    for break_rule in &schedule.break_times {
        if break_rule.day_of_week > 6 {
            return Err(SchedulingError::Validation(
                "break day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
            ));
        }
        if break_rule.end_time <= break_rule.start_time {
            return Err(SchedulingError::Validation(
                "break window must end after it starts".to_string(),
            ));
        }

        let day: &DayAvailability = &schedule.week[break_rule.day_of_week as usize];
        if !day.is_working_day
            || break_rule.start_time < day.start_time
            || break_rule.end_time > day.end_time
        {
            return Err(SchedulingError::Validation(
                "break must fall within the day's working window".to_string(),
            ));
        }
    }

    let mut seen_dates = HashSet::new();
    for entry in &schedule.date_overrides {
        if !seen_dates.insert(entry.date) {
            return Err(SchedulingError::Validation(format!(
                "duplicate override for {}",
                entry.date
            )));
        }
        if entry.is_available {
            match (entry.start_time, entry.end_time) {
                (Some(start), Some(end)) if end > start => {}
                _ => {
                    return Err(SchedulingError::Validation(format!(
                        "available override for {} requires an ordered time window",
                        entry.date
                    )));
                }
            }
        }
    }

    Ok(())
}
