use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentError, AppointmentSearchQuery, AppointmentStatus, CreateAppointmentRequest,
    RescheduleAppointmentRequest, TransitionPayload, UpdateAppointmentRequest,
};
use appointment_cell::services::booking::AppointmentBookingService;
use appointment_cell::store::{
    AppointmentStore, InMemoryAppointmentStore, InMemoryTreatmentCategoryStore,
};
use shared_config::AppConfig;
use shared_utils::FixedClock;

// Monday 2025-06-02, 08:00 UTC.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
}

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
}

fn service() -> (Arc<AppointmentBookingService>, Arc<InMemoryAppointmentStore>) {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let service = Arc::new(AppointmentBookingService::new(
        &AppConfig::default(),
        store.clone(),
        Arc::new(InMemoryTreatmentCategoryStore::with_defaults()),
        Arc::new(FixedClock(now())),
    ));
    (service, store)
}

fn booking(doctor_id: Uuid, start: DateTime<Utc>, duration: Option<i32>) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id: Uuid::new_v4(),
        doctor_id,
        appointment_date: start,
        duration_minutes: duration,
        reason: None,
        notes: None,
    }
}

#[tokio::test]
async fn creates_pending_appointment_with_default_duration() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let appointment = service
        .create_appointment(booking(doctor, at(10, 0), None))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.duration_minutes, 30);
    assert_eq!(appointment.registered_at, now());
    assert_eq!(appointment.amount, None);
}

#[tokio::test]
async fn category_reason_supplies_the_default_duration() {
    let (service, _) = service();
    let mut request = booking(Uuid::new_v4(), at(10, 0), None);
    request.reason = Some("Cleaning".to_string());

    let appointment = service.create_appointment(request).await.unwrap();
    assert_eq!(appointment.duration_minutes, 45);
}

#[tokio::test]
async fn rejects_bookings_that_are_not_in_the_future() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let exactly_now = service.create_appointment(booking(doctor, now(), None)).await;
    assert_matches!(exactly_now, Err(AppointmentError::PastSlot));

    let earlier = service
        .create_appointment(booking(doctor, now() - Duration::hours(1), None))
        .await;
    assert_matches!(earlier, Err(AppointmentError::PastSlot));
}

#[tokio::test]
async fn overlapping_booking_for_same_doctor_conflicts() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    let overlap = service
        .create_appointment(booking(doctor, at(10, 15), Some(30)))
        .await;
    assert_matches!(overlap, Err(AppointmentError::SlotConflict));
}

#[tokio::test]
async fn touching_intervals_do_not_conflict() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    let adjacent = service
        .create_appointment(booking(doctor, at(10, 30), Some(30)))
        .await;
    assert!(adjacent.is_ok());
}

#[tokio::test]
async fn same_slot_with_another_doctor_is_fine() {
    let (service, _) = service();

    service
        .create_appointment(booking(Uuid::new_v4(), at(10, 0), Some(30)))
        .await
        .unwrap();
    let other = service
        .create_appointment(booking(Uuid::new_v4(), at(10, 0), Some(30)))
        .await;
    assert!(other.is_ok());
}

#[tokio::test]
async fn cancelled_appointment_frees_its_slot() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let first = service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    service
        .transition_status(
            first.id,
            AppointmentStatus::Cancelled,
            &TransitionPayload {
                cancellation_reason: Some("Patient request".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rebooked = service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await;
    assert!(rebooked.is_ok());
}

#[tokio::test]
async fn concurrent_bookings_for_one_slot_admit_exactly_one() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let a = tokio::spawn({
        let service = service.clone();
        async move { service.create_appointment(booking(doctor, at(10, 0), Some(30))).await }
    });
    let b = tokio::spawn({
        let service = service.clone();
        async move { service.create_appointment(booking(doctor, at(10, 0), Some(30))).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppointmentError::SlotConflict))));
}

#[tokio::test]
async fn reschedule_excludes_the_appointment_itself() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let appointment = service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    // Shifting within its own interval must not self-conflict.
    let moved = service
        .reschedule_appointment(
            appointment.id,
            RescheduleAppointmentRequest {
                new_start_time: at(10, 15),
                new_duration_minutes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.appointment_date, at(10, 15));
}

#[tokio::test]
async fn reschedule_onto_another_booking_conflicts() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    service
        .create_appointment(booking(doctor, at(11, 0), Some(30)))
        .await
        .unwrap();
    let appointment = service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    let result = service
        .reschedule_appointment(
            appointment.id,
            RescheduleAppointmentRequest {
                new_start_time: at(11, 15),
                new_duration_minutes: None,
            },
        )
        .await;
    assert_matches!(result, Err(AppointmentError::SlotConflict));
}

#[tokio::test]
async fn amount_edits_are_restricted_to_completed() {
    let (service, _) = service();
    let appointment = service
        .create_appointment(booking(Uuid::new_v4(), at(10, 0), Some(30)))
        .await
        .unwrap();

    let while_pending = service.update_amount(appointment.id, "120").await;
    assert_matches!(
        while_pending,
        Err(AppointmentError::FieldLocked { field: "amount", .. })
    );

    service
        .transition_status(
            appointment.id,
            AppointmentStatus::Completed,
            &TransitionPayload::default(),
        )
        .await
        .unwrap();

    let updated = service.update_amount(appointment.id, "1 500,50").await.unwrap();
    assert_eq!(updated.amount, Some(1500.50));

    let bad = service.update_amount(appointment.id, "-5").await;
    assert_matches!(bad, Err(AppointmentError::InvalidAmount(_)));
}

#[tokio::test]
async fn completed_appointment_rejects_doctor_change() {
    let (service, _) = service();
    let appointment = service
        .create_appointment(booking(Uuid::new_v4(), at(10, 0), Some(30)))
        .await
        .unwrap();

    service
        .transition_status(
            appointment.id,
            AppointmentStatus::Completed,
            &TransitionPayload::default(),
        )
        .await
        .unwrap();

    let result = service
        .update_appointment(
            appointment.id,
            UpdateAppointmentRequest {
                doctor_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(
        result,
        Err(AppointmentError::FieldLocked { field: "doctor_id", .. })
    );
}

#[tokio::test]
async fn stale_status_loses_the_race() {
    let (service, store) = service();
    let appointment = service
        .create_appointment(booking(Uuid::new_v4(), at(10, 0), Some(30)))
        .await
        .unwrap();

    // Both writers computed their update from the pending snapshot.
    let mut confirmed = appointment.clone();
    confirmed.status = AppointmentStatus::Confirmed;
    let mut cancelled = appointment.clone();
    cancelled.status = AppointmentStatus::Cancelled;
    cancelled.cancellation_reason = Some("Double booked".to_string());

    store
        .apply(AppointmentStatus::Pending, confirmed)
        .await
        .unwrap();
    let second = store.apply(AppointmentStatus::Pending, cancelled).await;
    assert_matches!(
        second,
        Err(AppointmentError::StaleStatus {
            expected: AppointmentStatus::Pending,
            actual: AppointmentStatus::Confirmed,
        })
    );
}

#[tokio::test]
async fn search_filters_by_doctor_and_status() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let first = service
        .create_appointment(booking(doctor, at(9, 0), Some(30)))
        .await
        .unwrap();
    service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();
    service
        .create_appointment(booking(Uuid::new_v4(), at(9, 0), Some(30)))
        .await
        .unwrap();

    service
        .transition_status(first.id, AppointmentStatus::Confirmed, &TransitionPayload::default())
        .await
        .unwrap();

    let confirmed = service
        .search_appointments(&AppointmentSearchQuery {
            doctor_id: Some(doctor),
            status: Some(AppointmentStatus::Confirmed),
            ..Default::default()
        })
        .await;
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, first.id);

    let for_doctor = service
        .search_appointments(&AppointmentSearchQuery {
            doctor_id: Some(doctor),
            ..Default::default()
        })
        .await;
    assert_eq!(for_doctor.len(), 2);
}

#[tokio::test]
async fn conflict_check_reports_the_offending_appointment() {
    let (service, _) = service();
    let doctor = Uuid::new_v4();

    let existing = service
        .create_appointment(booking(doctor, at(10, 0), Some(30)))
        .await
        .unwrap();

    let hit = service
        .check_conflict(doctor, at(10, 15), 30, None)
        .await
        .unwrap();
    assert_eq!(hit, Some(existing.id));

    let excluded = service
        .check_conflict(doctor, at(10, 15), 30, Some(existing.id))
        .await
        .unwrap();
    assert_eq!(excluded, None);

    let clear = service.check_conflict(doctor, at(10, 30), 30, None).await.unwrap();
    assert_eq!(clear, None);
}
