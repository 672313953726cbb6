// libs/appointment-cell/src/services/conflict.rs
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError};
use crate::store::AppointmentStore;

/// Strict interval overlap: two intervals conflict only when they intersect
/// over a non-zero duration. Touching endpoints do not count.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Scan a doctor's appointments for one that occupies an interval overlapping
/// `[start, end)`. Cancelled appointments never conflict, and the appointment
/// being edited can be excluded for reschedule-in-place.
pub fn find_conflict<'a, I>(
    appointments: I,
    doctor_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude_appointment_id: Option<Uuid>,
) -> Option<Uuid>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments.into_iter().find_map(|apt| {
        if apt.doctor_id != doctor_id || !apt.occupies_slot() {
            return None;
        }
        if exclude_appointment_id == Some(apt.id) {
            return None;
        }
        if intervals_overlap(start, end, apt.appointment_date, apt.end_time()) {
            Some(apt.id)
        } else {
            None
        }
    })
}

/// Booking-time conflict check over the appointment store.
///
/// This is advisory when called on its own: the availability grid a caller
/// saw may be stale relative to a concurrent booking, so the store re-runs
/// the same scan inside its write lock when committing.
pub struct ConflictDetector {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetector {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Returns the id of a conflicting appointment, if any.
    pub async fn check_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppointmentError> {
        if duration_minutes <= 0 {
            return Err(AppointmentError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }

        let end = start + Duration::minutes(duration_minutes as i64);
        debug!(
            "Checking conflicts for doctor {} from {} to {}",
            doctor_id, start, end
        );

        let existing = self
            .store
            .list_for_doctor_on(doctor_id, start.date_naive())
            .await;

        let conflict = find_conflict(existing.iter(), doctor_id, start, end, exclude_appointment_id);
        if let Some(id) = conflict {
            warn!(
                "Conflict detected for doctor {} at {}: appointment {}",
                doctor_id, start, id
            );
        }

        Ok(conflict)
    }
}
