// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub amount: Option<f64>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub suggested_new_date: Option<DateTime<Utc>>,
    pub registered_at: DateTime<Utc>,
}

impl Appointment {
    /// Scheduled end of the booked interval, exclusive.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.appointment_date + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    /// Whether this appointment still occupies its interval.
    pub fn occupies_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Lookup entry for treatment categories. Appointments reference a category
/// only through their free-text `reason`; the category supplies a default
/// duration and a display color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentCategory {
    pub id: Uuid,
    pub name: String,
    pub default_duration_minutes: i32,
    pub color: String,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub appointment_date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    /// Raw amount text ("1 500,50"); only accepted while completed.
    pub amount: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionStatusRequest {
    pub target_status: AppointmentStatus,
    #[serde(flatten)]
    pub payload: TransitionPayload,
}

/// Side data carried by a status transition: an optional amount for
/// completion, a reason plus an optional reschedule suggestion for
/// cancellation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionPayload {
    pub amount: Option<String>,
    pub cancellation_reason: Option<String>,
    pub suggested_new_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAmountRequest {
    pub amount: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub default_duration_minutes: i32,
    pub color: String,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Requested slot conflicts with an existing appointment")]
    SlotConflict,

    #[error("Appointment must be scheduled for a future time")]
    PastSlot,

    #[error("Status transition from {from} to {to} is not allowed")]
    ForbiddenTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Field '{field}' cannot be changed while the appointment is {status}")]
    FieldLocked {
        field: &'static str,
        status: AppointmentStatus,
    },

    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),

    #[error("Cancellation requires a non-empty reason")]
    MissingCancellationReason,

    #[error("Appointment status changed concurrently (expected {expected}, found {actual})")]
    StaleStatus {
        expected: AppointmentStatus,
        actual: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}
