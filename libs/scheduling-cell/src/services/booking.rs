// libs/scheduling-cell/src/services/booking.rs
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::SchedulingConfig;
use shared_models::{
    Actor, ActorRole, Appointment, AppointmentStatus, TimeSlot, DEFAULT_MAX_ADVANCE_DAYS,
};
use shared_store::{AppointmentStore, ScheduleStore};

use crate::events::{EventSink, SchedulingEvent};
use crate::models::{CreateAppointmentRequest, RescheduleAppointmentRequest, SchedulingError};
use crate::services::conflict::ConflictDetectionService;
use crate::services::consistency::DoctorScheduleLocks;
use crate::services::lifecycle::LifecycleService;

/// Booking operations and the appointment status state machine.
///
/// Every conflict-check-then-write sequence runs under the doctor's schedule
/// lock, and every storage call is bounded by the configured timeout. An
/// operation that times out leaves no partial state: nothing is written until
/// the single insert/update that commits it, so callers may retry from
/// scratch.
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    schedules: Arc<dyn ScheduleStore>,
    conflict_service: ConflictDetectionService,
    lifecycle_service: LifecycleService,
    locks: DoctorScheduleLocks,
    events: Arc<dyn EventSink>,
    store_timeout: Duration,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        schedules: Arc<dyn ScheduleStore>,
        events: Arc<dyn EventSink>,
        config: &SchedulingConfig,
    ) -> Self {
        let conflict_service = ConflictDetectionService::new(
            Arc::clone(&appointments),
            Arc::clone(&schedules),
            config.slot_search_horizon_days,
        );

        Self {
            appointments,
            schedules,
            conflict_service,
            lifecycle_service: LifecycleService::new(),
            locks: DoctorScheduleLocks::new(),
            events,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    /// File a booking request. The appointment is created `pending` and does
    /// not block other candidates until the doctor approves it.
    pub async fn request_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.create_with_status(request, AppointmentStatus::Pending)
            .await
    }

    /// Direct booking: the appointment is confirmed at creation and
    /// immediately blocks its slot.
    pub async fn book_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        self.create_with_status(request, AppointmentStatus::Scheduled)
            .await
    }

    async fn create_with_status(
        &self,
        request: CreateAppointmentRequest,
        status: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        info!(
            "Creating {} appointment for patient {} with doctor {}",
            status, request.patient_id, request.doctor_id
        );

        let now = Utc::now();
        let slot = TimeSlot::new(request.start_time, request.end_time);
        validate_interval(&slot)?;

        if slot.start <= now {
            return Err(SchedulingError::Validation(
                "appointment must be scheduled for a future time".to_string(),
            ));
        }

        if !request.fee.is_finite() || request.fee < 0.0 {
            return Err(SchedulingError::Validation(
                "fee must be a non-negative amount".to_string(),
            ));
        }

        let max_advance_days = self
            .bounded(self.schedules.get(request.doctor_id))
            .await?
            .map(|schedule| schedule.max_advance_days)
            .unwrap_or(DEFAULT_MAX_ADVANCE_DAYS);

        if slot.start > now + ChronoDuration::days(max_advance_days) {
            return Err(SchedulingError::Validation(format!(
                "appointment exceeds the {}-day advance booking limit",
                max_advance_days
            )));
        }

        let _guard = self.locks.acquire(request.doctor_id).await;

        let conflict = self
            .bounded(
                self.conflict_service
                    .has_conflict(request.doctor_id, &slot, None),
            )
            .await?;
        if conflict {
            return Err(SchedulingError::SlotUnavailable);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            start_time: slot.start,
            end_time: slot.end,
            status,
            appointment_type: request.appointment_type,
            cancellation_reason: None,
            fee: request.fee,
            created_at: now,
            updated_at: now,
        };

        let appointment = self.bounded(self.appointments.insert(appointment)).await?;
        drop(_guard);

        self.emit(SchedulingEvent::AppointmentCreated {
            appointment_id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            status: appointment.status,
            occurred_at: Utc::now(),
        })
        .await;

        info!(
            "Appointment {} created ({}) for doctor {}",
            appointment.id, appointment.status, appointment.doctor_id
        );
        Ok(appointment)
    }

    /// Move an appointment through the status state machine.
    ///
    /// `pending -> scheduled` re-runs the conflict check under the doctor's
    /// lock: overlapping pending requests are allowed to coexist, and the
    /// first approval wins the slot. Transitions to `cancelled` require a
    /// non-empty reason.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<Appointment, SchedulingError> {
        let appointment = self.bounded(self.appointments.get(appointment_id)).await?;

        self.lifecycle_service
            .authorize_transition(&appointment, &new_status, actor)?;

        let reason = reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if new_status == AppointmentStatus::Cancelled && reason.is_none() {
            return Err(SchedulingError::Validation(
                "cancellation requires a reason".to_string(),
            ));
        }

        let old_status = appointment.status;
        let mut updated = appointment;
        updated.status = new_status;
        if new_status == AppointmentStatus::Cancelled {
            updated.cancellation_reason = reason.clone();
        }
        updated.updated_at = Utc::now();

        let updated = if new_status == AppointmentStatus::Scheduled {
            // Approval commit point: the slot must still be free.
            let _guard = self.locks.acquire(updated.doctor_id).await;
            let conflict = self
                .bounded(self.conflict_service.has_conflict(
                    updated.doctor_id,
                    &updated.slot(),
                    Some(updated.id),
                ))
                .await?;
            if conflict {
                debug!(
                    "Approval of appointment {} lost the slot to an earlier approval",
                    updated.id
                );
                return Err(SchedulingError::SlotUnavailable);
            }
            self.bounded(self.appointments.update(updated)).await?
        } else {
            self.bounded(self.appointments.update(updated)).await?
        };

        self.emit(SchedulingEvent::StatusChanged {
            appointment_id: updated.id,
            patient_id: updated.patient_id,
            doctor_id: updated.doctor_id,
            old_status,
            new_status,
            reason,
            occurred_at: Utc::now(),
        })
        .await;

        info!(
            "Appointment {} moved {} -> {}",
            updated.id, old_status, new_status
        );
        Ok(updated)
    }

    /// Cancel an appointment with a mandatory reason. Terminal.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        actor: &Actor,
        reason: String,
    ) -> Result<Appointment, SchedulingError> {
        self.update_status(
            appointment_id,
            AppointmentStatus::Cancelled,
            actor,
            Some(reason),
        )
        .await
    }

    /// Move an appointment to a new time. Status is unchanged; the
    /// appointment's own slot is excluded from the conflict check so a
    /// reschedule-in-place always passes.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        actor: &Actor,
    ) -> Result<Appointment, SchedulingError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let appointment = self.bounded(self.appointments.get(appointment_id)).await?;

        if appointment.status.is_terminal() {
            return Err(SchedulingError::TerminalState(appointment.status));
        }

        let participant = match actor.role {
            ActorRole::Doctor => actor.id == appointment.doctor_id,
            ActorRole::Patient => actor.id == appointment.patient_id,
            ActorRole::Admin => false,
        };
        if !participant {
            return Err(SchedulingError::Unauthorized);
        }

        let slot = TimeSlot::new(request.new_start_time, request.new_end_time);
        validate_interval(&slot)?;
        if slot.start <= Utc::now() {
            return Err(SchedulingError::Validation(
                "appointment must be rescheduled to a future time".to_string(),
            ));
        }

        let _guard = self.locks.acquire(appointment.doctor_id).await;

        let conflict = self
            .bounded(self.conflict_service.has_conflict(
                appointment.doctor_id,
                &slot,
                Some(appointment.id),
            ))
            .await?;
        if conflict {
            return Err(SchedulingError::SlotUnavailable);
        }

        let old_slot = appointment.slot();
        let mut updated = appointment;
        updated.start_time = slot.start;
        updated.end_time = slot.end;
        updated.updated_at = Utc::now();

        let updated = self.bounded(self.appointments.update(updated)).await?;
        drop(_guard);

        self.emit(SchedulingEvent::AppointmentRescheduled {
            appointment_id: updated.id,
            patient_id: updated.patient_id,
            doctor_id: updated.doctor_id,
            old_start_time: old_slot.start,
            old_end_time: old_slot.end,
            new_start_time: updated.start_time,
            new_end_time: updated.end_time,
            occurred_at: Utc::now(),
        })
        .await;

        info!(
            "Appointment {} rescheduled to {} - {}",
            updated.id, updated.start_time, updated.end_time
        );
        Ok(updated)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.bounded(self.appointments.get(appointment_id)).await
    }

    pub fn conflicts(&self) -> &ConflictDetectionService {
        &self.conflict_service
    }

    async fn bounded<T, E, F>(&self, operation: F) -> Result<T, SchedulingError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<SchedulingError>,
    {
        match timeout(self.store_timeout, operation).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(SchedulingError::StoreUnavailable(
                "storage call timed out".to_string(),
            )),
        }
    }

    async fn emit(&self, event: SchedulingEvent) {
        if let Err(err) = self.events.publish(event).await {
            warn!("Failed to publish scheduling event: {}", err);
        }
    }
}

fn validate_interval(slot: &TimeSlot) -> Result<(), SchedulingError> {
    if slot.end <= slot.start {
        return Err(SchedulingError::Validation(
            "appointment must end after it starts".to_string(),
        ));
    }
    Ok(())
}
