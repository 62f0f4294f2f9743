use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use scheduling_cell::{ScheduleService, SchedulingError, UpdateScheduleRequest};
use shared_models::{Actor, BreakRule, DateOverride, DayAvailability, WeeklySchedule};
use shared_store::MemoryStore;

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn service() -> (ScheduleService, Uuid) {
    let store = Arc::new(MemoryStore::new());
    (ScheduleService::new(store), Uuid::new_v4())
}

fn valid_request() -> UpdateScheduleRequest {
    let weekday = DayAvailability::working(hm(8, 0), hm(16, 0));
    UpdateScheduleRequest {
        week: [
            DayAvailability::off(),
            weekday,
            weekday,
            weekday,
            weekday,
            weekday,
            DayAvailability::off(),
        ],
        break_times: vec![BreakRule {
            day_of_week: 1,
            start_time: hm(12, 0),
            end_time: hm(12, 30),
        }],
        date_overrides: vec![],
        slot_duration_minutes: 20,
        buffer_minutes: 10,
        max_advance_days: 60,
        timezone: "UTC".to_string(),
    }
}

#[tokio::test]
async fn first_access_creates_the_default_schedule() {
    let (service, doctor_id) = service();

    let schedule = service.get_or_create_default(doctor_id).await.unwrap();

    assert_eq!(schedule.slot_duration_minutes, 30);
    assert_eq!(schedule.buffer_minutes, 0);
    assert_eq!(schedule.max_advance_days, 30);
    assert!(!schedule.week[0].is_working_day); // Sunday
    assert!(schedule.week[1].is_working_day); // Monday
    assert_eq!(schedule.week[1].start_time, hm(9, 0));
    assert_eq!(schedule.week[1].end_time, hm(17, 0));
    assert!(!schedule.week[6].is_working_day); // Saturday
}

#[tokio::test]
async fn second_access_returns_the_stored_schedule() {
    let (service, doctor_id) = service();

    let first = service.get_or_create_default(doctor_id).await.unwrap();
    let second = service.get_or_create_default(doctor_id).await.unwrap();

    assert_eq!(first.created_at, second.created_at);
}

#[tokio::test]
async fn missing_schedule_is_not_found() {
    let (service, doctor_id) = service();
    let result = service.get_schedule(doctor_id).await;
    assert_matches!(result, Err(SchedulingError::NotFound));
}

#[tokio::test]
async fn only_the_owning_doctor_may_update() {
    let (service, doctor_id) = service();

    let as_patient = service
        .update_schedule(doctor_id, &Actor::patient(doctor_id), valid_request())
        .await;
    assert_matches!(as_patient, Err(SchedulingError::Unauthorized));

    let as_other_doctor = service
        .update_schedule(doctor_id, &Actor::doctor(Uuid::new_v4()), valid_request())
        .await;
    assert_matches!(as_other_doctor, Err(SchedulingError::Unauthorized));

    let as_owner = service
        .update_schedule(doctor_id, &Actor::doctor(doctor_id), valid_request())
        .await;
    assert!(as_owner.is_ok());
}

#[tokio::test]
async fn update_persists_and_keeps_creation_time() {
    let (service, doctor_id) = service();
    let created = service.get_or_create_default(doctor_id).await.unwrap();

    let updated = service
        .update_schedule(doctor_id, &Actor::doctor(doctor_id), valid_request())
        .await
        .unwrap();

    assert_eq!(updated.slot_duration_minutes, 20);
    assert_eq!(updated.created_at, created.created_at);

    let fetched = service.get_schedule(doctor_id).await.unwrap();
    assert_eq!(fetched.buffer_minutes, 10);
}

#[tokio::test]
async fn slot_duration_bounds_are_enforced() {
    let (service, doctor_id) = service();

    let mut too_short = valid_request();
    too_short.slot_duration_minutes = 10;
    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), too_short)
            .await,
        Err(SchedulingError::Validation(_))
    );

    let mut too_long = valid_request();
    too_long.slot_duration_minutes = 180;
    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), too_long)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn buffer_bounds_are_enforced() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.buffer_minutes = 90;

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn misordered_working_window_is_rejected() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.week[1] = DayAvailability::working(hm(16, 0), hm(8, 0));

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn break_outside_working_window_is_rejected() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.break_times = vec![BreakRule {
        day_of_week: 1,
        start_time: hm(17, 0),
        end_time: hm(18, 0),
    }];

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn break_on_a_day_off_is_rejected() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.break_times = vec![BreakRule {
        day_of_week: 0, // Sunday is off
        start_time: hm(10, 0),
        end_time: hm(10, 30),
    }];

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn zero_length_break_is_rejected() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.break_times = vec![BreakRule {
        day_of_week: 1,
        start_time: hm(12, 0),
        end_time: hm(12, 0),
    }];

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn available_override_requires_an_ordered_window() {
    let (service, doctor_id) = service();

    let mut missing_window = valid_request();
    missing_window.date_overrides = vec![DateOverride {
        date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        is_available: true,
        start_time: Some(hm(10, 0)),
        end_time: None,
        reason: None,
    }];
    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), missing_window)
            .await,
        Err(SchedulingError::Validation(_))
    );

    let mut misordered = valid_request();
    misordered.date_overrides = vec![DateOverride {
        date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        is_available: true,
        start_time: Some(hm(14, 0)),
        end_time: Some(hm(10, 0)),
        reason: None,
    }];
    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), misordered)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn duplicate_overrides_for_one_date_are_rejected() {
    let (service, doctor_id) = service();

    let date = NaiveDate::from_ymd_opt(2026, 12, 24).unwrap();
    let mut request = valid_request();
    request.date_overrides = vec![
        DateOverride {
            date,
            is_available: false,
            start_time: None,
            end_time: None,
            reason: Some("holiday".to_string()),
        },
        DateOverride {
            date,
            is_available: true,
            start_time: Some(hm(9, 0)),
            end_time: Some(hm(12, 0)),
            reason: None,
        },
    ];

    assert_matches!(
        service
            .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
            .await,
        Err(SchedulingError::Validation(_))
    );
}

#[tokio::test]
async fn unavailable_override_needs_no_window() {
    let (service, doctor_id) = service();

    let mut request = valid_request();
    request.date_overrides = vec![DateOverride {
        date: NaiveDate::from_ymd_opt(2026, 12, 24).unwrap(),
        is_available: false,
        start_time: None,
        end_time: None,
        reason: Some("holiday".to_string()),
    }];

    let result = service
        .update_schedule(doctor_id, &Actor::doctor(doctor_id), request)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn validate_schedule_is_exposed_for_write_paths() {
    let doctor_id = Uuid::new_v4();
    let mut schedule = WeeklySchedule::default_for(doctor_id, chrono::Utc::now());
    assert!(scheduling_cell::validate_schedule(&schedule).is_ok());

    schedule.max_advance_days = 0;
    assert_matches!(
        scheduling_cell::validate_schedule(&schedule),
        Err(SchedulingError::Validation(_))
    );
}
