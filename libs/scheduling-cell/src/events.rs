use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use shared_models::AppointmentStatus;

/// Structured domain events emitted after each successful state change.
///
/// Delivery (email, push, audit log) is owned by whichever sink the caller
/// injects; a sink failure is logged and swallowed so it can never mask or
/// roll back a committed booking.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulingEvent {
    AppointmentCreated {
        appointment_id: Uuid,
        patient_id: Uuid,
        doctor_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        status: AppointmentStatus,
        occurred_at: DateTime<Utc>,
    },
    AppointmentRescheduled {
        appointment_id: Uuid,
        patient_id: Uuid,
        doctor_id: Uuid,
        old_start_time: DateTime<Utc>,
        old_end_time: DateTime<Utc>,
        new_start_time: DateTime<Utc>,
        new_end_time: DateTime<Utc>,
        occurred_at: DateTime<Utc>,
    },
    StatusChanged {
        appointment_id: Uuid,
        patient_id: Uuid,
        doctor_id: Uuid,
        old_status: AppointmentStatus,
        new_status: AppointmentStatus,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    },
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: SchedulingEvent) -> anyhow::Result<()>;
}

/// Default sink: emits each event as a JSON log line.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: SchedulingEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!(target: "scheduling_events", "{}", payload);
        Ok(())
    }
}
