use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared_models::{Appointment, WeeklySchedule};

use crate::{AppointmentStore, ScheduleStore, StoreError};

/// In-memory reference store backing both persistence ports.
///
/// Range scans sort by start time, matching the ordering the production
/// `(doctor_id, start_time)` index provides.
#[derive(Default)]
pub struct MemoryStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
    schedules: RwLock<HashMap<Uuid, WeeklySchedule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Appointment, StoreError> {
        let mut appointments = self.appointments.write().await;
        match appointments.get_mut(&appointment.id) {
            Some(existing) => {
                *existing = appointment.clone();
                Ok(appointment)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let appointments = self.appointments.read().await;
        appointments.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_for_doctor_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self.appointments.read().await;
        let mut matching: Vec<Appointment> = appointments
            .values()
            .filter(|apt| apt.doctor_id == doctor_id)
            .filter(|apt| apt.start_time < to && apt.end_time > from)
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(matching)
    }

    async fn list_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self.appointments.read().await;
        let mut expired: Vec<Appointment> = appointments
            .values()
            .filter(|apt| !apt.status.is_terminal() && apt.end_time < now)
            .cloned()
            .collect();

        expired.sort_by(|a, b| a.end_time.cmp(&b.end_time));
        Ok(expired)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<WeeklySchedule>, StoreError> {
        let schedules = self.schedules.read().await;
        Ok(schedules.get(&doctor_id).cloned())
    }

    async fn upsert(&self, schedule: WeeklySchedule) -> Result<WeeklySchedule, StoreError> {
        let mut schedules = self.schedules.write().await;
        schedules.insert(schedule.doctor_id, schedule.clone());
        Ok(schedule)
    }
}
