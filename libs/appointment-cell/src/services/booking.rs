// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, CreateCategoryRequest, RescheduleAppointmentRequest,
    TransitionPayload, TreatmentCategory, UpdateAppointmentRequest,
};
use crate::services::amount;
use crate::services::conflict::ConflictDetector;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::store::{AppointmentStore, TreatmentCategoryStore};

/// Orchestrates appointment commands: creation, field edits, reschedules,
/// status transitions and amount updates. Validation runs up front; the
/// final commit always goes through the store's atomic operations.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
    categories: Arc<dyn TreatmentCategoryStore>,
    conflict_detector: ConflictDetector,
    lifecycle: AppointmentLifecycleService,
    clock: Arc<dyn Clock>,
    default_duration_minutes: i32,
}

impl AppointmentBookingService {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn AppointmentStore>,
        categories: Arc<dyn TreatmentCategoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            conflict_detector: ConflictDetector::new(Arc::clone(&store)),
            lifecycle: AppointmentLifecycleService::new(),
            store,
            categories,
            clock,
            default_duration_minutes: config.default_appointment_duration_minutes as i32,
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {}",
            request.patient_id, request.doctor_id
        );

        let duration_minutes = self
            .resolve_duration(request.duration_minutes, request.reason.as_deref())
            .await?;

        let now = self.clock.now();
        if request.appointment_date <= now {
            return Err(AppointmentError::PastSlot);
        }

        // Advisory pre-check; the store repeats it inside its write lock.
        if self
            .conflict_detector
            .check_conflict(request.doctor_id, request.appointment_date, duration_minutes, None)
            .await?
            .is_some()
        {
            return Err(AppointmentError::SlotConflict);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date,
            duration_minutes,
            status: AppointmentStatus::Pending,
            amount: None,
            reason: request.reason,
            notes: request.notes,
            cancellation_reason: None,
            suggested_new_date: None,
            registered_at: now,
        };

        let created = self.store.create(appointment).await?;
        info!("Appointment {} booked with doctor {}", created.id, created.doctor_id);
        Ok(created)
    }

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store.get(id).await
    }

    pub async fn search_appointments(&self, query: &AppointmentSearchQuery) -> Vec<Appointment> {
        self.store.search(query).await
    }

    /// Field edits while the status stays unchanged, governed by the
    /// per-status edit rules. Moving the interval or doctor re-runs the
    /// conflict check excluding the appointment itself.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        update: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", id);

        let current = self.store.get(id).await?;
        self.lifecycle.validate_field_edits(&current, &update)?;

        let mut updated = current.clone();
        if let Some(date) = update.appointment_date {
            if date <= self.clock.now() {
                return Err(AppointmentError::PastSlot);
            }
            updated.appointment_date = date;
        }
        if let Some(duration) = update.duration_minutes {
            if duration <= 0 {
                return Err(AppointmentError::ValidationError(
                    "Duration must be positive".to_string(),
                ));
            }
            updated.duration_minutes = duration;
        }
        if let Some(doctor_id) = update.doctor_id {
            updated.doctor_id = doctor_id;
        }
        if let Some(patient_id) = update.patient_id {
            updated.patient_id = patient_id;
        }
        if let Some(reason) = update.reason.clone() {
            updated.reason = Some(reason);
        }
        if let Some(notes) = update.notes.clone() {
            updated.notes = Some(notes);
        }
        if let Some(raw) = update.amount.as_deref() {
            updated.amount = Some(amount::parse_amount(raw)?);
        }

        if AppointmentLifecycleService::changes_scheduling(&update) {
            if self
                .conflict_detector
                .check_conflict(
                    updated.doctor_id,
                    updated.appointment_date,
                    updated.duration_minutes,
                    Some(updated.id),
                )
                .await?
                .is_some()
            {
                warn!("Reschedule conflict for appointment {}", id);
                return Err(AppointmentError::SlotConflict);
            }
        }

        self.store.apply(current.status, updated).await
    }

    pub async fn reschedule_appointment(
        &self,
        id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        self.update_appointment(
            id,
            UpdateAppointmentRequest {
                appointment_date: Some(request.new_start_time),
                duration_minutes: request.new_duration_minutes,
                ..Default::default()
            },
        )
        .await
    }

    pub async fn transition_status(
        &self,
        id: Uuid,
        target: AppointmentStatus,
        payload: &TransitionPayload,
    ) -> Result<Appointment, AppointmentError> {
        info!("Transitioning appointment {} to {}", id, target);

        let current = self.store.get(id).await?;
        let updated = self.lifecycle.apply_transition(&current, target, payload)?;

        // Conditional on the status we read; a concurrent transition
        // surfaces as StaleStatus rather than a silent overwrite.
        self.store.apply(current.status, updated).await
    }

    /// Direct amount edit, restricted to completed appointments.
    pub async fn update_amount(
        &self,
        id: Uuid,
        raw_amount: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.store.get(id).await?;

        if current.status != AppointmentStatus::Completed {
            return Err(AppointmentError::FieldLocked {
                field: "amount",
                status: current.status,
            });
        }

        let mut updated = current.clone();
        updated.amount = Some(amount::parse_amount(raw_amount)?);
        self.store.apply(current.status, updated).await
    }

    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        self.lifecycle.valid_transitions(current)
    }

    pub async fn check_conflict(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, AppointmentError> {
        self.conflict_detector
            .check_conflict(doctor_id, start, duration_minutes, exclude_appointment_id)
            .await
    }

    pub async fn list_categories(&self) -> Vec<TreatmentCategory> {
        self.categories.list().await
    }

    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<TreatmentCategory, AppointmentError> {
        if request.name.trim().is_empty() {
            return Err(AppointmentError::ValidationError(
                "Category name must not be empty".to_string(),
            ));
        }
        if request.default_duration_minutes <= 0 {
            return Err(AppointmentError::ValidationError(
                "Default duration must be positive".to_string(),
            ));
        }

        self.categories
            .create(TreatmentCategory {
                id: Uuid::new_v4(),
                name: request.name,
                default_duration_minutes: request.default_duration_minutes,
                color: request.color,
            })
            .await
    }

    /// Explicit duration wins; otherwise a category matching the free-text
    /// reason supplies its default; otherwise the configured default.
    async fn resolve_duration(
        &self,
        requested: Option<i32>,
        reason: Option<&str>,
    ) -> Result<i32, AppointmentError> {
        let duration = match requested {
            Some(minutes) => minutes,
            None => match reason {
                Some(reason) => self
                    .categories
                    .find_by_name(reason.trim())
                    .await
                    .map(|c| c.default_duration_minutes)
                    .unwrap_or(self.default_duration_minutes),
                None => self.default_duration_minutes,
            },
        };

        if duration <= 0 {
            return Err(AppointmentError::ValidationError(
                "Duration must be positive".to_string(),
            ));
        }

        Ok(duration)
    }
}
