// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::{
    AppointmentStatus, AppointmentType, BreakRule, DateOverride, DayAvailability,
};
use shared_store::StoreError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_end_time: DateTime<Utc>,
}

/// Full replacement of a doctor's weekly schedule settings. Identity and
/// timestamps are managed by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    pub week: [DayAvailability; 7],
    pub break_times: Vec<BreakRule>,
    pub date_overrides: Vec<DateOverride>,
    pub slot_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub max_advance_days: i64,
    pub timezone: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulingError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("appointment slot not available")]
    SlotUnavailable,

    #[error("appointment not found")]
    NotFound,

    #[error("status transition {from} -> {to} is not permitted")]
    ForbiddenTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("appointment is in terminal status {0}")]
    TerminalState(AppointmentStatus),

    #[error("unauthorized access")]
    Unauthorized,

    #[error("storage unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for SchedulingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => SchedulingError::NotFound,
            StoreError::Unavailable(msg) => SchedulingError::StoreUnavailable(msg),
        }
    }
}
