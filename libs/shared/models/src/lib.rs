pub mod actor;
pub mod appointment;
pub mod interval;
pub mod schedule;

pub use actor::{Actor, ActorRole};
pub use appointment::{Appointment, AppointmentStatus, AppointmentType};
pub use interval::{discretize, TimeSlot};
pub use schedule::{
    BreakRule, DateOverride, DayAvailability, WeeklySchedule, DEFAULT_MAX_ADVANCE_DAYS,
    DEFAULT_SLOT_DURATION_MINUTES, MAX_BUFFER_MINUTES, MAX_SLOT_DURATION_MINUTES,
    MIN_SLOT_DURATION_MINUTES,
};
