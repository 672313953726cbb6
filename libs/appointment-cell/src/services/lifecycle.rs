// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, TransitionPayload, UpdateAppointmentRequest,
};
use crate::services::amount;

/// Guarded appointment status state machine.
///
/// pending -> confirmed -> completed, with pending/confirmed -> cancelled.
/// Completed and cancelled are terminal. The same service owns the
/// per-status field-edit rules that apply while the status is unchanged.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// All statuses reachable from the current one.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current {
            AppointmentStatus::Pending => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
        }
    }

    pub fn validate_status_transition(
        &self,
        current: AppointmentStatus,
        target: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {}", current, target);

        if !self.valid_transitions(current).contains(&target) {
            warn!("Invalid status transition attempted: {} -> {}", current, target);
            return Err(AppointmentError::ForbiddenTransition {
                from: current,
                to: target,
            });
        }

        Ok(())
    }

    /// Apply a validated transition to a copy of the appointment, consuming
    /// the side data the target status requires. The caller commits the
    /// result through the store's conditional update.
    pub fn apply_transition(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
        payload: &TransitionPayload,
    ) -> Result<Appointment, AppointmentError> {
        self.validate_status_transition(appointment.status, target)?;

        let mut updated = appointment.clone();
        match target {
            AppointmentStatus::Confirmed => {
                updated.status = AppointmentStatus::Confirmed;
            }
            AppointmentStatus::Completed => {
                if let Some(raw) = payload.amount.as_deref() {
                    updated.amount = Some(amount::parse_amount(raw)?);
                }
                updated.status = AppointmentStatus::Completed;
            }
            AppointmentStatus::Cancelled => {
                let reason = payload
                    .cancellation_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(AppointmentError::MissingCancellationReason)?;

                updated.cancellation_reason = Some(reason.to_string());
                updated.suggested_new_date = payload.suggested_new_date;
                updated.status = AppointmentStatus::Cancelled;
            }
            // Nothing transitions back to pending; validate rejects this.
            AppointmentStatus::Pending => unreachable!("validated above"),
        }

        Ok(updated)
    }

    /// Enforce the per-status field-edit rules for an update that does not
    /// change the status. Pending/confirmed appointments are fully editable
    /// except for the amount; completed ones accept only the amount;
    /// cancelled ones are read-only.
    pub fn validate_field_edits(
        &self,
        appointment: &Appointment,
        update: &UpdateAppointmentRequest,
    ) -> Result<(), AppointmentError> {
        let status = appointment.status;
        let locked = |field: &'static str| AppointmentError::FieldLocked { field, status };

        match status {
            AppointmentStatus::Pending | AppointmentStatus::Confirmed => {
                if update.amount.is_some() {
                    return Err(locked("amount"));
                }
            }
            AppointmentStatus::Completed => {
                if update.appointment_date.is_some() {
                    return Err(locked("appointment_date"));
                }
                if update.duration_minutes.is_some() {
                    return Err(locked("duration_minutes"));
                }
                if update.doctor_id.is_some() {
                    return Err(locked("doctor_id"));
                }
                if update.patient_id.is_some() {
                    return Err(locked("patient_id"));
                }
                if update.reason.is_some() {
                    return Err(locked("reason"));
                }
                if update.notes.is_some() {
                    return Err(locked("notes"));
                }
            }
            AppointmentStatus::Cancelled => {
                if update.appointment_date.is_some() {
                    return Err(locked("appointment_date"));
                }
                if update.duration_minutes.is_some() {
                    return Err(locked("duration_minutes"));
                }
                if update.doctor_id.is_some() {
                    return Err(locked("doctor_id"));
                }
                if update.patient_id.is_some() {
                    return Err(locked("patient_id"));
                }
                if update.reason.is_some() {
                    return Err(locked("reason"));
                }
                if update.notes.is_some() {
                    return Err(locked("notes"));
                }
                if update.amount.is_some() {
                    return Err(locked("amount"));
                }
            }
        }

        Ok(())
    }

    /// Whether editing these fields moves the booked interval or its owner,
    /// which requires a fresh conflict check excluding the appointment itself.
    pub fn changes_scheduling(update: &UpdateAppointmentRequest) -> bool {
        update.appointment_date.is_some()
            || update.duration_minutes.is_some()
            || update.doctor_id.is_some()
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
