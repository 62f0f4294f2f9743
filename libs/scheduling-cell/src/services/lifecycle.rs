use tracing::{debug, warn};

use shared_models::{Actor, ActorRole, Appointment, AppointmentStatus};

use crate::models::SchedulingError;

/// Appointment lifecycle rules: which status transitions exist, and which
/// actor may perform each one.
pub struct LifecycleService;

impl LifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// All statuses reachable from `current` regardless of actor.
    pub fn valid_transitions(&self, current: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }

    /// Validate that `actor` may move `appointment` to `new_status`.
    pub fn authorize_transition(
        &self,
        appointment: &Appointment,
        new_status: &AppointmentStatus,
        actor: &Actor,
    ) -> Result<(), SchedulingError> {
        debug!(
            "Validating transition {} -> {} for appointment {} by {} {}",
            appointment.status, new_status, appointment.id, actor.role, actor.id
        );

        if appointment.status.is_terminal() {
            warn!(
                "Mutation attempted on terminal appointment {} ({})",
                appointment.id, appointment.status
            );
            return Err(SchedulingError::TerminalState(appointment.status));
        }

        if !self.valid_transitions(&appointment.status).contains(new_status) {
            return Err(SchedulingError::ForbiddenTransition {
                from: appointment.status,
                to: *new_status,
            });
        }

        let allowed = match (&appointment.status, new_status) {
            // Approval is the doctor's call alone.
            (AppointmentStatus::Pending, AppointmentStatus::Scheduled) => {
                self.is_appointment_doctor(appointment, actor)
            }
            (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            | (AppointmentStatus::Scheduled, AppointmentStatus::Completed)
            | (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled) => {
                self.is_participant(appointment, actor)
            }
            (AppointmentStatus::Scheduled, AppointmentStatus::NoShow) => {
                self.is_appointment_doctor(appointment, actor)
            }
            _ => false,
        };

        if !allowed {
            warn!(
                "Actor {} ({}) not permitted to move appointment {} from {} to {}",
                actor.id, actor.role, appointment.id, appointment.status, new_status
            );
            return Err(SchedulingError::ForbiddenTransition {
                from: appointment.status,
                to: *new_status,
            });
        }

        Ok(())
    }

    fn is_appointment_doctor(&self, appointment: &Appointment, actor: &Actor) -> bool {
        actor.role == ActorRole::Doctor && actor.id == appointment.doctor_id
    }

    fn is_participant(&self, appointment: &Appointment, actor: &Actor) -> bool {
        match actor.role {
            ActorRole::Doctor => actor.id == appointment.doctor_id,
            ActorRole::Patient => actor.id == appointment.patient_id,
            ActorRole::Admin => false,
        }
    }
}

impl Default for LifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
