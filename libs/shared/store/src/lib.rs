pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_models::{Appointment, WeeklySchedule};

pub use memory::MemoryStore;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for appointments.
///
/// The production table is keyed by id with a secondary index on
/// `(doctor_id, start_time)`; `list_for_doctor_between` is the range scan
/// that index serves.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    /// Whole-record replacement. `NotFound` if the id has never been inserted.
    async fn update(&self, appointment: Appointment) -> Result<Appointment, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError>;

    /// All appointments for `doctor_id` whose `[start_time, end_time)`
    /// overlaps `[from, to)`, ordered by start time.
    async fn list_for_doctor_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments still pending or scheduled whose end time has passed.
    async fn list_expired_active(&self, now: DateTime<Utc>)
        -> Result<Vec<Appointment>, StoreError>;
}

/// Persistence port for recurring weekly schedules, keyed by doctor.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn get(&self, doctor_id: Uuid) -> Result<Option<WeeklySchedule>, StoreError>;

    async fn upsert(&self, schedule: WeeklySchedule) -> Result<WeeklySchedule, StoreError>;
}
