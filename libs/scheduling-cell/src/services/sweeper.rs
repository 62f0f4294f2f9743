use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::AppointmentStatus;
use shared_store::AppointmentStore;

use crate::events::{EventSink, SchedulingEvent};
use crate::models::SchedulingError;

/// Cancellation reason written by the sweeper.
pub const EXPIRED_REASON: &str = "expired";

/// Background pass that force-cancels appointments whose end time has passed
/// while they were still pending or scheduled.
///
/// Re-running is harmless: cancelled appointments are terminal and are not
/// selected again. A single-flight guard keeps two sweeps from running
/// concurrently.
pub struct ExpirySweeper {
    appointments: Arc<dyn AppointmentStore>,
    events: Arc<dyn EventSink>,
    in_flight: Mutex<()>,
    is_shutdown: RwLock<bool>,
}

impl ExpirySweeper {
    pub fn new(appointments: Arc<dyn AppointmentStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            appointments,
            events,
            in_flight: Mutex::new(()),
            is_shutdown: RwLock::new(false),
        }
    }

    /// Cancel every expired pending/scheduled appointment, returning the ids
    /// that were transitioned. One appointment failing to update does not
    /// block the rest of the batch.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>, SchedulingError> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("Expiry sweep already in flight, skipping this run");
                return Ok(Vec::new());
            }
        };

        let expired = self.appointments.list_expired_active(now).await?;
        if expired.is_empty() {
            debug!("Expiry sweep found nothing to do at {}", now);
            return Ok(Vec::new());
        }

        let mut swept = Vec::with_capacity(expired.len());
        for appointment in expired {
            let old_status = appointment.status;
            let mut cancelled = appointment;
            cancelled.status = AppointmentStatus::Cancelled;
            cancelled.cancellation_reason = Some(EXPIRED_REASON.to_string());
            cancelled.updated_at = now;

            match self.appointments.update(cancelled.clone()).await {
                Ok(_) => {
                    swept.push(cancelled.id);
                    if let Err(err) = self
                        .events
                        .publish(SchedulingEvent::StatusChanged {
                            appointment_id: cancelled.id,
                            patient_id: cancelled.patient_id,
                            doctor_id: cancelled.doctor_id,
                            old_status,
                            new_status: AppointmentStatus::Cancelled,
                            reason: Some(EXPIRED_REASON.to_string()),
                            occurred_at: now,
                        })
                        .await
                    {
                        warn!(
                            "Failed to publish expiry event for appointment {}: {}",
                            cancelled.id, err
                        );
                    }
                }
                Err(err) => {
                    warn!(
                        "Failed to expire appointment {}, continuing sweep: {}",
                        cancelled.id, err
                    );
                }
            }
        }

        info!("Expiry sweep cancelled {} appointments", swept.len());
        Ok(swept)
    }

    /// Periodic sweep loop. Runs until `shutdown` is called.
    pub async fn run(self: Arc<Self>, period: std::time::Duration) {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            if *self.is_shutdown.read().await {
                info!("Expiry sweeper shutting down");
                break;
            }

            if let Err(err) = self.sweep_expired(Utc::now()).await {
                warn!("Expiry sweep failed, will retry next tick: {}", err);
            }
        }
    }

    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        *is_shutdown = true;
    }
}
