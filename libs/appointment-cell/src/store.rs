// libs/appointment-cell/src/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus, TreatmentCategory,
};
use crate::services::conflict::find_conflict;

/// Persistence seam for appointments. The store owns the transactional
/// boundary: `create` is an atomic check-then-insert, and `apply` is an
/// optimistic conditional update keyed by the status the caller read.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError>;

    async fn search(&self, query: &AppointmentSearchQuery) -> Vec<Appointment>;

    /// All appointments of a doctor whose start falls on the given date,
    /// cancelled ones included; callers filter by occupancy.
    async fn list_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment>;

    /// Insert the appointment unless its interval overlaps a non-cancelled
    /// appointment of the same doctor. Check and insert happen under one
    /// write lock, so concurrent creates for the same slot cannot both win.
    async fn create(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    /// Replace the stored record, provided its status still equals
    /// `expected_status`. When the booked interval or doctor changed, the
    /// overlap scan is re-run inside the same lock, excluding the
    /// appointment itself.
    async fn apply(
        &self,
        expected_status: AppointmentStatus,
        updated: Appointment,
    ) -> Result<Appointment, AppointmentError>;
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppointmentError::NotFound)
    }

    async fn search(&self, query: &AppointmentSearchQuery) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut matches: Vec<Appointment> = appointments
            .values()
            .filter(|apt| query.patient_id.is_none_or(|p| apt.patient_id == p))
            .filter(|apt| query.doctor_id.is_none_or(|d| apt.doctor_id == d))
            .filter(|apt| query.status.is_none_or(|s| apt.status == s))
            .filter(|apt| query.from_date.is_none_or(|from| apt.appointment_date >= from))
            .filter(|apt| query.to_date.is_none_or(|to| apt.appointment_date <= to))
            .cloned()
            .collect();
        matches.sort_by_key(|apt| apt.appointment_date);
        matches
    }

    async fn list_for_doctor_on(&self, doctor_id: Uuid, date: NaiveDate) -> Vec<Appointment> {
        let appointments = self.appointments.read().await;
        let mut matches: Vec<Appointment> = appointments
            .values()
            .filter(|apt| apt.doctor_id == doctor_id)
            .filter(|apt| apt.appointment_date.date_naive() == date)
            .cloned()
            .collect();
        matches.sort_by_key(|apt| apt.appointment_date);
        matches
    }

    async fn create(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.write().await;

        if find_conflict(
            appointments.values(),
            appointment.doctor_id,
            appointment.appointment_date,
            appointment.end_time(),
            None,
        )
        .is_some()
        {
            return Err(AppointmentError::SlotConflict);
        }

        debug!("Storing appointment {}", appointment.id);
        appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn apply(
        &self,
        expected_status: AppointmentStatus,
        updated: Appointment,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointments = self.appointments.write().await;

        let current = appointments
            .get(&updated.id)
            .ok_or(AppointmentError::NotFound)?;

        if current.status != expected_status {
            return Err(AppointmentError::StaleStatus {
                expected: expected_status,
                actual: current.status,
            });
        }

        let interval_moved = current.appointment_date != updated.appointment_date
            || current.duration_minutes != updated.duration_minutes
            || current.doctor_id != updated.doctor_id;

        if interval_moved && updated.occupies_slot() {
            if find_conflict(
                appointments.values(),
                updated.doctor_id,
                updated.appointment_date,
                updated.end_time(),
                Some(updated.id),
            )
            .is_some()
            {
                return Err(AppointmentError::SlotConflict);
            }
        }

        appointments.insert(updated.id, updated.clone());
        Ok(updated)
    }
}

// ==============================================================================
// TREATMENT CATEGORY LOOKUP
// ==============================================================================

#[async_trait]
pub trait TreatmentCategoryStore: Send + Sync {
    async fn list(&self) -> Vec<TreatmentCategory>;

    /// Case-insensitive name lookup, used to resolve a free-text appointment
    /// reason to a default duration.
    async fn find_by_name(&self, name: &str) -> Option<TreatmentCategory>;

    async fn create(
        &self,
        category: TreatmentCategory,
    ) -> Result<TreatmentCategory, AppointmentError>;
}

pub struct InMemoryTreatmentCategoryStore {
    categories: RwLock<Vec<TreatmentCategory>>,
}

impl InMemoryTreatmentCategoryStore {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(Vec::new()),
        }
    }

    /// Seeded with the clinic's standard consultation types.
    pub fn with_defaults() -> Self {
        let defaults = [
            ("Consultation", 30, "#4f86f7"),
            ("Follow-up", 20, "#7bc67e"),
            ("Cleaning", 45, "#f2c14e"),
            ("Procedure", 60, "#e4572e"),
        ];

        Self {
            categories: RwLock::new(
                defaults
                    .into_iter()
                    .map(|(name, duration, color)| TreatmentCategory {
                        id: Uuid::new_v4(),
                        name: name.to_string(),
                        default_duration_minutes: duration,
                        color: color.to_string(),
                    })
                    .collect(),
            ),
        }
    }
}

impl Default for InMemoryTreatmentCategoryStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl TreatmentCategoryStore for InMemoryTreatmentCategoryStore {
    async fn list(&self) -> Vec<TreatmentCategory> {
        self.categories.read().await.clone()
    }

    async fn find_by_name(&self, name: &str) -> Option<TreatmentCategory> {
        self.categories
            .read()
            .await
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    async fn create(
        &self,
        category: TreatmentCategory,
    ) -> Result<TreatmentCategory, AppointmentError> {
        let mut categories = self.categories.write().await;

        if categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&category.name))
        {
            return Err(AppointmentError::ValidationError(format!(
                "Category '{}' already exists",
                category.name
            )));
        }

        categories.push(category.clone());
        Ok(category)
    }
}
