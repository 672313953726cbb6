// libs/schedule-cell/src/services/availability.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use appointment_cell::services::conflict::intervals_overlap;
use appointment_cell::store::AppointmentStore;
use appointment_cell::Appointment;
use shared_config::AppConfig;
use shared_utils::Clock;

use crate::models::{
    BusyInterval, ScheduleError, SlotClassification, UpdateScheduleRequest, WeeklySchedule,
};
use crate::services::slots::generate_slots;
use crate::store::ScheduleStore;

/// Busy intervals of a doctor's day, one per non-cancelled appointment whose
/// start falls on the date, ordered by start.
pub fn build_busy_intervals(appointments: &[Appointment], date: NaiveDate) -> Vec<BusyInterval> {
    let mut intervals: Vec<BusyInterval> = appointments
        .iter()
        .filter(|apt| apt.occupies_slot())
        .filter(|apt| apt.appointment_date.date_naive() == date)
        .map(|apt| BusyInterval {
            start: apt.appointment_date,
            end: apt.end_time(),
            appointment_id: apt.id,
        })
        .collect();
    intervals.sort_by_key(|interval| interval.start);
    intervals
}

/// Classify one candidate slot against the busy intervals and the clock.
///
/// `busy` and `past` are computed independently: a stale slot earlier today
/// that also holds an appointment reports both flags, and the caller decides
/// which one to surface.
pub fn classify_slot(
    start: DateTime<Utc>,
    duration_minutes: i64,
    busy_intervals: &[BusyInterval],
    now: DateTime<Utc>,
) -> SlotClassification {
    let end = start + Duration::minutes(duration_minutes);

    let busy = busy_intervals
        .iter()
        .any(|b| intervals_overlap(start, end, b.start, b.end));

    // Only today's elapsed slots are "past"; future dates never are.
    let past = start.date_naive() == now.date_naive() && start <= now;

    SlotClassification {
        start_time: start,
        end_time: end,
        busy,
        past,
        available: !busy && !past,
    }
}

/// Read side of the scheduling engine: resolves a doctor's recurring weekly
/// schedule into a classified slot grid for a concrete date, and owns the
/// schedule's read/replace lifecycle.
pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleStore>,
    appointments: Arc<dyn AppointmentStore>,
    clock: Arc<dyn Clock>,
    default_slot_interval_minutes: i64,
}

impl AvailabilityService {
    pub fn new(
        config: &AppConfig,
        schedules: Arc<dyn ScheduleStore>,
        appointments: Arc<dyn AppointmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules,
            appointments,
            clock,
            default_slot_interval_minutes: config.default_slot_interval_minutes,
        }
    }

    /// Stored schedule, or the clinic default when the doctor has none yet.
    pub async fn get_schedule(&self, doctor_id: Uuid) -> WeeklySchedule {
        match self.schedules.get(doctor_id).await {
            Some(schedule) => schedule,
            None => WeeklySchedule::default_for(doctor_id),
        }
    }

    /// Replace the whole 7-entry week atomically. Partial updates are not a
    /// thing; the request carries every day.
    pub async fn update_schedule(
        &self,
        doctor_id: Uuid,
        request: UpdateScheduleRequest,
    ) -> Result<WeeklySchedule, ScheduleError> {
        let schedule = WeeklySchedule {
            doctor_id,
            days: request.days,
            updated_at: self.clock.now(),
        };
        schedule.validate()?;

        self.schedules.put(schedule.clone()).await;
        debug!("Replaced weekly schedule for doctor {}", doctor_id);
        Ok(schedule)
    }

    /// The classified slot grid for one doctor and date. The grid is stepped
    /// by the requested duration (default: the configured slot interval);
    /// each slot carries independent busy/past flags.
    pub async fn get_availability(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        duration_minutes: Option<i64>,
    ) -> Result<Vec<SlotClassification>, ScheduleError> {
        let duration = duration_minutes.unwrap_or(self.default_slot_interval_minutes);
        if duration <= 0 {
            return Err(ScheduleError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }

        debug!(
            "Calculating availability for doctor {} on {} ({} minute slots)",
            doctor_id, date, duration
        );

        let schedule = self.get_schedule(doctor_id).await;
        let day_of_week = date.weekday().num_days_from_sunday() as i32;
        let Some(day) = schedule.day(day_of_week) else {
            return Ok(Vec::new());
        };

        let slot_times = generate_slots(day, duration);
        if slot_times.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.appointments.list_for_doctor_on(doctor_id, date).await;
        let busy_intervals = build_busy_intervals(&existing, date);
        let now = self.clock.now();

        Ok(slot_times
            .into_iter()
            .map(|time| classify_slot(date.and_time(time).and_utc(), duration, &busy_intervals, now))
            .collect())
    }
}
